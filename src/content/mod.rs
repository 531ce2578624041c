//! Content resolution module
//!
//! Where static files come from, what type they are served as, and what
//! happens to the response once a file has been picked.

pub mod content_type;
pub mod decorator;
pub mod fallback;
pub mod options;
pub mod provider;

// Re-export commonly used types
pub use content_type::{
    ContentTypeProvider, ContentTypeTable, DelegatingContentTypeProvider, OCTET_STREAM,
};
pub use decorator::{set_cache_headers, ResponseContext, ResponseDecorators};
pub use fallback::{entry_document_directory, FallbackRoute};
pub use options::StaticFileOptions;
pub use provider::{FileInfo, FileProvider, PhysicalDirectory, ProviderChain};
