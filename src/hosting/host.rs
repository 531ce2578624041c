//! Assembled host state
//!
//! Everything a request needs, built once before the listener starts.

use super::{HostingOptions, RegisteredBundles};
use crate::config::Config;
use crate::content::{FallbackRoute, PhysicalDirectory, StaticFileOptions};
use crate::error::Result;
use crate::logger::{self, AccessLogFormat};
use std::path::Path;
use std::sync::Arc;

/// Read-only state shared by every connection
#[derive(Debug, Clone)]
pub struct BundleHost {
    pub static_files: StaticFileOptions,
    /// Entry document route, the first registered bundle's unless chosen
    pub fallback: Option<FallbackRoute>,
    pub access_log: Option<AccessLogFormat>,
}

impl BundleHost {
    /// Build from host settings, reading every bundle manifest
    pub fn from_config(config: &Config) -> Result<Self> {
        let options = config
            .bundles
            .iter()
            .fold(HostingOptions::new(), |opts, path| opts.with_bundle(path));
        let bundles = RegisteredBundles::read(&options)?;

        let mut host = Self::new(
            &bundles,
            StaticFileOptions::default(),
            &config.server.ambient_root,
        );
        if let Some(artifact_path) = &config.server.fallback_bundle {
            host.set_fallback_bundle(&bundles, artifact_path, &config.server.ambient_root)?;
        }
        host.access_log = config
            .logging
            .access_log
            .then_some(config.logging.access_log_format);
        Ok(host)
    }

    /// Apply `bundles` on top of `static_files`
    pub fn new(
        bundles: &RegisteredBundles,
        mut static_files: StaticFileOptions,
        ambient_root: &Path,
    ) -> Self {
        if bundles.is_empty() {
            logger::log_warning("No client bundles registered, serving the ambient root only");
            if static_files.file_provider.is_none() {
                static_files.file_provider =
                    Some(Arc::new(PhysicalDirectory::new(ambient_root)));
            }
        } else {
            bundles.configure_static_files(&mut static_files, ambient_root);
        }

        let fallback = bundles.iter().next().map(|bundle| {
            let route = FallbackRoute::from_config(bundle, ambient_root);
            log_fallback(&route);
            route
        });

        Self {
            static_files,
            fallback,
            access_log: None,
        }
    }

    /// Serve client-side routes from the bundle built as `artifact_path`
    ///
    /// A registered bundle reuses its manifest; any other artifact has its
    /// manifest read now and fails like a registration would.
    pub fn set_fallback_bundle(
        &mut self,
        bundles: &RegisteredBundles,
        artifact_path: &Path,
        ambient_root: &Path,
    ) -> Result<()> {
        let route = match bundles.iter().find(|b| b.artifact_path == artifact_path) {
            Some(bundle) => FallbackRoute::from_config(bundle, ambient_root),
            None => FallbackRoute::for_bundle(artifact_path, ambient_root)?,
        };
        log_fallback(&route);
        self.fallback = Some(route);
        Ok(())
    }
}

fn log_fallback(route: &FallbackRoute) {
    logger::log_info(&format!(
        "[Hosting] Entry document served from {}",
        route.directory().display()
    ));
}
