// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub routes: RoutesConfig,
    pub http: HttpConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Upload directory, created at startup if missing
    pub dir: String,
    /// Path prefixes stored files are served under. The first one is used
    /// to build the `url` returned by uploads.
    pub download_prefixes: Vec<String>,
}

impl StorageConfig {
    /// Prefix used for public file URLs
    pub fn public_prefix(&self) -> &str {
        self.download_prefixes
            .first()
            .map_or("/files", |p| p.trim_end_matches('/'))
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    pub upload_path: String,
    pub list_path: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Cross-origin resource sharing policy
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Allowed origins, `*` allows any
    pub allow_origins: Vec<String>,
    pub allow_credentials: bool,
    /// Allowed methods, `*` allows any
    pub allow_methods: Vec<String>,
    /// Allowed request headers, `*` mirrors whatever the preflight asks for
    pub allow_headers: Vec<String>,
    /// Preflight cache lifetime in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_cors_max_age() -> u64 {
    600
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|o| o == "*")
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allows_any_origin() || self.allow_origins.iter().any(|o| o == origin)
    }

    pub fn allows_any_method(&self) -> bool {
        self.allow_methods.iter().any(|m| m == "*")
    }

    pub fn allows_any_header(&self) -> bool {
        self.allow_headers.iter().any(|h| h == "*")
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level: error, warn, info or debug
    pub level: String,
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

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_grace_period: u64,
}
