//! HTTP protocol layer module
//!
//! Protocol helpers shared by the static file handler, decoupled from where
//! files come from.

pub mod cache;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_500_response, build_file_response,
    build_options_response, HostResponse,
};
