// Configuration module entry point
// Loads layered configuration and exposes the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, CorsConfig, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig, ServerConfig,
    StorageConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (optional), then `SERVER_*` environment variables where `__` separates
    /// nested keys (e.g. `SERVER_STORAGE__DIR=tiff`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("storage.dir", "uploads")?
            .set_default("storage.download_prefixes", vec!["/files", "/tiff"])?
            .set_default("routes.upload_path", "/upload/")?
            .set_default("routes.list_path", "/files")?
            .set_default("http.server_name", "rust-fileserver/0.1")?
            .set_default("http.max_body_size", 104_857_600)? // 100MB
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("cors.allow_credentials", true)?
            .set_default("cors.allow_methods", vec!["*"])?
            .set_default("cors.allow_headers", vec!["*"])?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_period", 10)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
