//! Entry document fallback
//!
//! When no static file matches, client-side routes (`/counter`, `/users/42`)
//! are answered with the bundle's entry document.

use super::decorator::{set_cache_headers, ResponseDecorators};
use super::options::StaticFileOptions;
use super::provider::PhysicalDirectory;
use crate::config::{BundleConfig, ENTRY_DOCUMENT};
use crate::error::Result;
use crate::logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory that should serve the entry document for `config`
///
/// Checks dist, the web root, then `ambient_root`, in that order.
pub fn entry_document_directory(config: &BundleConfig, ambient_root: &Path) -> Option<PathBuf> {
    config.find_entry_document(ambient_root)
}

/// The single catch-all route of a hosted bundle
#[derive(Debug, Clone)]
pub struct FallbackRoute {
    directory: PathBuf,
    options: StaticFileOptions,
}

impl FallbackRoute {
    /// Build the route for the bundle whose primary artifact is `artifact_path`
    pub fn for_bundle(artifact_path: impl AsRef<Path>, ambient_root: &Path) -> Result<Self> {
        let config = BundleConfig::read(artifact_path)?;
        Ok(Self::from_config(&config, ambient_root))
    }

    pub fn from_config(config: &BundleConfig, ambient_root: &Path) -> Self {
        let directory = entry_document_directory(config, ambient_root).unwrap_or_else(|| {
            logger::log_warning(&format!(
                "No {ENTRY_DOCUMENT} found for bundle {}, fallback route will answer 404",
                config.artifact_path.display()
            ));
            ambient_root.to_path_buf()
        });

        let mut on_prepare_response = ResponseDecorators::new();
        on_prepare_response.push(set_cache_headers);

        let options = StaticFileOptions {
            on_prepare_response,
            ..StaticFileOptions::with_provider(Arc::new(PhysicalDirectory::new(&directory)))
        };

        Self { directory, options }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn options(&self) -> &StaticFileOptions {
        &self.options
    }

    /// Steps pushed here run after the cache step
    pub fn options_mut(&mut self) -> &mut StaticFileOptions {
        &mut self.options
    }

    /// Subpath served for every matched request
    pub const fn document(&self) -> &'static str {
        ENTRY_DOCUMENT
    }

    /// Only paths that do not look like files fall back
    ///
    /// A missing `app.js` should be a 404, not an HTML page.
    pub fn matches(&self, path: &str) -> bool {
        let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        !last.contains('.')
    }
}
