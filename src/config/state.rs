// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::cors::Cors;
use crate::gateway::{GatewayError, StaticSettings};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Resolved file server settings
    pub settings: StaticSettings,
    pub cors: Cors,
}

impl AppState {
    /// Build state from configuration, failing if it is not a file server config
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        let settings = StaticSettings::from_properties(&config)?;
        let cors = Cors::new(config.cors.clone());

        Ok(Self {
            config,
            settings,
            cors,
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(access_log: bool) -> Config {
        let dir = std::env::temp_dir();
        let mut cfg = Config::from_toml_str(&format!(
            "[file_server]\nstaticfiles_dir = {:?}\n",
            dir.display().to_string()
        ))
        .unwrap();
        cfg.logging.access_log = access_log;
        cfg
    }

    #[test]
    fn test_access_log_follows_config() {
        assert!(AppState::new(config(true)).unwrap().access_log_enabled());
        assert!(!AppState::new(config(false)).unwrap().access_log_enabled());
    }

    #[test]
    fn test_rejects_config_without_file_server() {
        let cfg = Config::from_toml_str("[server]\nport = 9000\n").unwrap();
        assert!(matches!(
            AppState::new(cfg),
            Err(GatewayError::NotFileServer)
        ));
    }
}
