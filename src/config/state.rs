// Application state module
// Read-only state shared by every connection

use hyper::header::HeaderValue;

use super::types::Config;
use crate::handler::static_files::AssetRoot;

/// Application state
///
/// Built once at startup and shared behind an `Arc`; nothing in here is
/// mutated afterwards, so request handling takes no locks.
pub struct AppState {
    pub config: Config,
    pub root: AssetRoot,
    /// Pre-validated `Access-Control-Allow-Origin` value
    pub allow_origin: HeaderValue,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, config::ConfigError> {
        let allow_origin = HeaderValue::from_str(&config.http.allow_origin).map_err(|e| {
            config::ConfigError::Message(format!(
                "Invalid http.allow_origin '{}': {e}",
                config.http.allow_origin
            ))
        })?;
        let root = AssetRoot::new(&config.assets.root_dir);

        Ok(Self {
            config,
            root,
            allow_origin,
        })
    }
}
