//! Static hosting for client-side application bundles
//!
//! Serves a client bundle's compiled payload, support files and entry document
//! over HTTP. Content is merged from each bundle's dist and web root
//! directories and the server's own root, in a fixed priority order.

pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod hosting;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{HostError, Result};
