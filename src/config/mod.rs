// Configuration module entry point
// Loads the application configuration and exposes the typed file server view

mod state;
mod types;

use std::net::SocketAddr;

use config::builder::DefaultState;
use config::ConfigBuilder;

use crate::gateway::FileServerProperties;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, CorsConfig, FileServerConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Module name an instance must list in `server.modules` to serve files
pub const FILE_SERVER_MODULE: &str = "FileServer";

const ENV_PREFIX: &str = "FILESERVER";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(Self::environment())
            .build()?;

        settings.try_deserialize()
    }

    /// `FILESERVER__SECTION__KEY` overrides; list keys take comma separated values
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.modules")
            .with_list_parse_key("cors.allow_origins")
    }

    /// Load configuration from an in-memory TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::with_defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let cors = CorsConfig::default();
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.modules", vec![FILE_SERVER_MODULE])?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "project-fileserver")?
            .set_default("cors.allow_origins", cors.allow_origins)?
            .set_default("cors.allow_methods", cors.allow_methods)?
            .set_default("cors.allow_headers", cors.allow_headers)?
            .set_default("cors.allow_credentials", cors.allow_credentials)?
            .set_default("cors.max_age", cors.max_age)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

impl FileServerProperties for Config {
    fn is_file_server(&self) -> bool {
        self.file_server.is_some()
            && self
                .server
                .modules
                .iter()
                .any(|m| m.trim().eq_ignore_ascii_case(FILE_SERVER_MODULE))
    }

    fn staticfiles_dir(&self) -> Option<&str> {
        self.file_server
            .as_ref()
            .and_then(|fs| fs.staticfiles_dir.as_deref())
    }

    fn staticfiles_uri(&self) -> &str {
        self.file_server
            .as_ref()
            .and_then(|fs| fs.staticfiles_uri.as_deref())
            .unwrap_or("")
    }
}
