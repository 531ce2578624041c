// Configuration module entry point
// Host settings plus the per-bundle manifest reader

mod manifest;
mod types;

use std::net::SocketAddr;

pub use manifest::{manifest_path_for, BundleConfig, ENTRY_DOCUMENT, MANIFEST_EXTENSION};
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig};

use crate::error::Result;

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is optional; `BUNDLE_HOST_*` environment variables override it,
    /// with `__` separating nested keys (`BUNDLE_HOST_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("BUNDLE_HOST")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bundles")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.ambient_root", "wwwroot")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> std::result::Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.ambient_root, PathBuf::from("wwwroot"));
        assert!(cfg.bundles.is_empty());
        assert!(cfg.logging.access_log);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("host.toml");
        std::fs::write(
            &path,
            r#"
bundles = ["client/bin/client.wasm", "admin/bin/admin.wasm"]

[server]
port = 9090
ambient_root = "public"

[logging]
access_log = false
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.ambient_root, PathBuf::from("public"));
        assert_eq!(
            cfg.bundles,
            vec![
                PathBuf::from("client/bin/client.wasm"),
                PathBuf::from("admin/bin/admin.wasm")
            ]
        );
        assert!(!cfg.logging.access_log);
    }
}
