//! Client bundle hosting
//!
//! Registers client bundles with the static file layer:
//! - every bundle's dist and web root directories join the provider chain
//! - `.dll` (and `.pdb` when debugging) become servable
//! - responses get cache headers after any existing decorator

mod host;

pub use host::BundleHost;

use crate::config::BundleConfig;
use crate::content::{
    set_cache_headers, ContentTypeProvider, ContentTypeTable, DelegatingContentTypeProvider,
    FileProvider, PhysicalDirectory, ProviderChain, StaticFileOptions, OCTET_STREAM,
};
use crate::error::Result;
use crate::logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extension of the client's compiled assemblies
pub const ASSEMBLY_EXTENSION: &str = ".dll";
/// Extension of the client's debug symbol files
pub const DEBUG_SYMBOLS_EXTENSION: &str = ".pdb";

/// Which client bundles to host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostingOptions {
    client_artifact_paths: Vec<PathBuf>,
}

impl HostingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle by its primary artifact; duplicates are ignored
    #[must_use]
    pub fn with_bundle(mut self, artifact_path: impl Into<PathBuf>) -> Self {
        self.add_bundle(artifact_path);
        self
    }

    pub fn add_bundle(&mut self, artifact_path: impl Into<PathBuf>) -> bool {
        let path = artifact_path.into();
        if self.client_artifact_paths.contains(&path) {
            return false;
        }
        self.client_artifact_paths.push(path);
        true
    }

    /// Apply a configuration callback
    #[must_use]
    pub fn configure(mut self, configure: impl FnOnce(&mut Self)) -> Self {
        configure(&mut self);
        self
    }

    pub fn client_artifact_paths(&self) -> &[PathBuf] {
        &self.client_artifact_paths
    }
}

/// Manifests of every hosted bundle, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredBundles {
    bundles: Vec<BundleConfig>,
}

impl RegisteredBundles {
    /// Read the manifest of every bundle in `options`
    ///
    /// Any missing or malformed manifest fails the whole set.
    pub fn read(options: &HostingOptions) -> Result<Self> {
        let bundles = options
            .client_artifact_paths()
            .iter()
            .map(BundleConfig::read)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bundles })
    }

    /// Build from already-read manifests, keeping the first of any duplicate
    pub fn from_configs(configs: impl IntoIterator<Item = BundleConfig>) -> Self {
        let mut bundles: Vec<BundleConfig> = Vec::new();
        for config in configs {
            if !bundles.iter().any(|b| b.artifact_path == config.artifact_path) {
                bundles.push(config);
            }
        }
        Self { bundles }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BundleConfig> {
        self.bundles.iter()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn any_debugging(&self) -> bool {
        self.bundles.iter().any(|b| b.enable_debugging)
    }

    /// Provider chain: each bundle's dist then web root, then `fallback`
    ///
    /// `fallback` is the provider that was configured before bundles were
    /// added, or the server's own root when there was none.
    pub fn provider_chain(&self, fallback: Arc<dyn FileProvider>) -> ProviderChain {
        let mut chain = ProviderChain::new();
        for root in self.bundles.iter().flat_map(BundleConfig::content_roots) {
            chain.push(Arc::new(PhysicalDirectory::new(root)));
        }
        chain.push(fallback);
        chain
    }

    /// Content types the bundles need on top of the standard table
    pub fn content_type_table(&self) -> ContentTypeTable {
        let mut table = ContentTypeTable::default();
        if !self.is_empty() {
            table.try_add(ASSEMBLY_EXTENSION, OCTET_STREAM);
        }
        if self.any_debugging() {
            table.try_add(DEBUG_SYMBOLS_EXTENSION, OCTET_STREAM);
        }
        table
    }

    /// Point `options` at the bundles
    ///
    /// Does nothing when no bundle is registered.
    pub fn configure_static_files(&self, options: &mut StaticFileOptions, ambient_root: &Path) {
        if self.is_empty() {
            return;
        }

        let fallback: Arc<dyn FileProvider> = match options.file_provider.take() {
            Some(existing) => existing,
            None => Arc::new(PhysicalDirectory::new(ambient_root)),
        };
        let chain = self.provider_chain(fallback);
        logger::log_info(&format!(
            "[Hosting] {} bundle(s), {} content root(s)",
            self.len(),
            chain.len()
        ));
        options.file_provider = Some(Arc::new(chain));

        // Caller-configured types answer first, ours only fill the gaps
        let table: Arc<dyn ContentTypeProvider> = Arc::new(self.content_type_table());
        let types: Arc<dyn ContentTypeProvider> = match options.content_type_provider.take() {
            Some(existing) => Arc::new(DelegatingContentTypeProvider::new(vec![existing, table])),
            None => table,
        };
        options.content_type_provider = Some(types);

        options.on_prepare_response.push(set_cache_headers);
    }
}
