// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU cores when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Root Directory every request path is joined onto
    pub root_dir: String,
    /// Files tried, in order, when a directory is requested
    pub index_files: Vec<String>,
}

/// HTTP response configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of `Access-Control-Allow-Origin` on every response
    pub allow_origin: String,
    /// Content-Type for extensions outside the fixed table
    pub fallback_content_type: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
            },
            assets: AssetsConfig {
                root_dir: "./zig-out/web".to_string(),
                index_files: vec!["index.html".to_string()],
            },
            http: HttpConfig {
                allow_origin: "*".to_string(),
                fallback_content_type: "text/plain; charset=utf-8".to_string(),
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: default_access_log_format(),
                access_log_file: None,
                error_log_file: None,
            },
        }
    }
}
