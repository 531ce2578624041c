//! Error types
//!
//! Startup-time failures only. A request that matches nothing is not an error,
//! resolvers return `None` for it.

use std::path::PathBuf;

/// Errors raised while configuring the host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The bundle manifest does not exist next to its artifact
    #[error("bundle manifest not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The bundle manifest exists but cannot be read or parsed
    #[error("invalid bundle manifest {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// Host settings could not be loaded
    #[error("failed to load host settings: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;
