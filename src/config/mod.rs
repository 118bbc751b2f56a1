// Configuration module entry point
// Loads the startup configuration and wraps it into the shared, read-only state

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};

pub use state::AppState;
pub use types::{AssetsConfig, Config, HttpConfig, LoggingConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "server";

impl Config {
    /// Load configuration from `server.toml` (optional) and `ASSETS_*` env vars
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error: the defaults serve `./zig-out/web`
    /// on `0.0.0.0:8080`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("assets.root_dir", defaults.assets.root_dir)?
            .set_default("assets.index_files", defaults.assets.index_files)?
            .set_default("http.allow_origin", defaults.http.allow_origin)?
            .set_default(
                "http.fallback_content_type",
                defaults.http.fallback_content_type,
            )?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default(
                "logging.access_log_format",
                defaults.logging.access_log_format,
            )?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("ASSETS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Resolve `server.host:server.port` into a bindable address
    ///
    /// Host names such as `localhost` are resolved. An IPv4 address is
    /// preferred when the name has one, so `localhost` binds `127.0.0.1`.
    pub fn socket_addr(&self) -> Result<SocketAddr, config::ConfigError> {
        let invalid = |detail: String| {
            config::ConfigError::Message(format!(
                "Invalid address '{}:{}': {detail}",
                self.server.host, self.server.port
            ))
        };

        let addrs: Vec<SocketAddr> = (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .collect();

        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| invalid("no address resolved".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does/not/exist/server").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.assets.root_dir, "./zig-out/web");
        assert_eq!(cfg.assets.index_files, vec!["index.html".to_string()]);
        assert_eq!(cfg.http.allow_origin, "*");
        assert_eq!(cfg.http.fallback_content_type, "text/plain; charset=utf-8");
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "localhost"
port = 9090
workers = 2

[assets]
root_dir = "dist"
index_files = ["zigtris.html", "index.html"]
"#
        )
        .unwrap();

        let base = dir.path().join("custom");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.host, "localhost");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.assets.root_dir, "dist");
        assert_eq!(cfg.assets.index_files, vec!["zigtris.html", "index.html"]);
        // Untouched sections keep their defaults
        assert_eq!(cfg.http.allow_origin, "*");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        assert_eq!(cfg.socket_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());

        cfg.server.host = "localhost".to_string();
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());

        // Literal IPv6 hosts stay IPv6
        cfg.server.host = "::1".to_string();
        assert_eq!(cfg.socket_addr().unwrap(), "[::1]:8080".parse().unwrap());

        cfg.server.host = "not a host!".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
