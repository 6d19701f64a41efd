// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub cors: CorsConfig,
    /// File server section; absent when this instance does not serve files
    #[serde(default)]
    pub file_server: Option<FileServerConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Platform modules this instance runs, e.g. `["FileServer"]`
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_modules() -> Vec<String> {
    vec!["FileServer".to_string()]
}

/// File server section
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FileServerConfig {
    /// Root directory holding one subdirectory per project
    #[serde(default)]
    pub staticfiles_dir: Option<String>,
    /// URL prefix the files are served under
    #[serde(default)]
    pub staticfiles_uri: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
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
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// Cross-origin policy applied to every gateway response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    /// Origins allowed to fetch files; `*` allows any origin
    pub allow_origins: Vec<String>,
    pub allow_methods: String,
    pub allow_headers: String,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: "GET, HEAD, OPTIONS".to_string(),
            allow_headers:
                "Origin, Accept, Content-Type, X-Requested-With, X-CSRF-Token, Range".to_string(),
            allow_credentials: false,
            max_age: 86400,
        }
    }
}
