//! Bundle manifest reader
//!
//! Every client bundle ships a small TOML manifest next to its primary
//! artifact (`app.wasm` -> `app.bundle.toml`):
//!
//! ```toml
//! dist = "dist"
//! web_root = "wwwroot"
//! debug = true
//! ```
//!
//! Relative paths resolve against the manifest's own directory.

use crate::error::{HostError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the document that bootstraps a client application
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Extension that replaces the artifact's own to locate its manifest
pub const MANIFEST_EXTENSION: &str = "bundle.toml";

/// On-disk manifest layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    dist: String,
    #[serde(default)]
    web_root: Option<String>,
    #[serde(default)]
    debug: bool,
}

/// Resolved configuration of one client bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    /// Primary artifact the manifest was read for; identifies the bundle
    pub artifact_path: PathBuf,
    /// Published output directory
    pub dist_path: PathBuf,
    /// Development-time static asset directory, absent once published
    pub web_root_path: Option<PathBuf>,
    pub enable_debugging: bool,
}

impl BundleConfig {
    /// Read the manifest that belongs to `artifact_path`
    pub fn read(artifact_path: impl AsRef<Path>) -> Result<Self> {
        let artifact_path = artifact_path.as_ref();
        let manifest_path = manifest_path_for(artifact_path);

        let text = match std::fs::read_to_string(&manifest_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HostError::ConfigNotFound {
                    path: manifest_path,
                });
            }
            Err(e) => {
                return Err(HostError::ConfigInvalid {
                    path: manifest_path,
                    reason: e.to_string(),
                });
            }
        };

        let manifest: Manifest = toml::from_str(&text).map_err(|e| HostError::ConfigInvalid {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;

        if manifest.dist.trim().is_empty() {
            return Err(HostError::ConfigInvalid {
                path: manifest_path,
                reason: "`dist` must not be empty".to_string(),
            });
        }

        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));

        // The publish step copies web root assets into dist and clears the
        // field, so an empty or vanished directory means "published".
        let web_root_path = manifest
            .web_root
            .filter(|p| !p.trim().is_empty())
            .map(|p| base.join(p))
            .filter(|p| p.is_dir());

        Ok(Self {
            artifact_path: artifact_path.to_path_buf(),
            dist_path: base.join(manifest.dist),
            web_root_path,
            enable_debugging: manifest.debug,
        })
    }

    /// Directories holding this bundle's assets, in serving priority order
    pub fn content_roots(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.dist_path.as_path()).chain(self.web_root_path.as_deref())
    }

    /// Find the directory that should serve the entry document
    ///
    /// Looks in dist, then the web root, then `ambient_root`. Returns `None`
    /// when none of them holds an `index.html` file.
    pub fn find_entry_document(&self, ambient_root: &Path) -> Option<PathBuf> {
        self.content_roots()
            .chain(std::iter::once(ambient_root))
            .find(|dir| dir.join(ENTRY_DOCUMENT).is_file())
            .map(Path::to_path_buf)
    }
}

/// Location of the manifest for a given artifact
pub fn manifest_path_for(artifact_path: &Path) -> PathBuf {
    artifact_path.with_extension(MANIFEST_EXTENSION)
}
