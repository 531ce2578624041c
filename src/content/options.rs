//! Static file serving options

use super::content_type::{ContentTypeProvider, ContentTypeTable};
use super::decorator::ResponseDecorators;
use super::provider::FileProvider;
use std::sync::Arc;

/// Everything the static file handler needs to answer a request
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticFileOptions {
    /// Where files come from; `None` serves nothing
    pub file_provider: Option<Arc<dyn FileProvider>>,
    /// `None` falls back to the standard table
    pub content_type_provider: Option<Arc<dyn ContentTypeProvider>>,
    pub on_prepare_response: ResponseDecorators,
    /// Serve files whose type is unknown instead of answering 404
    pub serve_unknown_file_types: bool,
    /// Type used for unknown files when they are served
    pub default_content_type: Option<String>,
}

impl StaticFileOptions {
    /// Options serving a single provider with the standard type table
    pub fn with_provider(provider: Arc<dyn FileProvider>) -> Self {
        Self {
            file_provider: Some(provider),
            ..Self::default()
        }
    }

    /// Resolve the Content-Type to send for `subpath`
    ///
    /// `None` means the file must not be served.
    pub fn resolve_content_type(&self, subpath: &str) -> Option<String> {
        let known = match &self.content_type_provider {
            Some(provider) => provider.content_type(subpath).map(str::to_string),
            None => ContentTypeTable::standard()
                .content_type(subpath)
                .map(str::to_string),
        };

        match known {
            Some(content_type) => Some(content_type),
            None if self.serve_unknown_file_types => Some(
                self.default_content_type
                    .clone()
                    .unwrap_or_else(|| super::content_type::OCTET_STREAM.to_string()),
            ),
            None => None,
        }
    }
}
