use thiserror::Error;

/// Startup failures; the server does not serve without valid settings.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Not a valid FileServer instance.")]
    NotFileServer,

    #[error("missing required setting file_server.staticfiles_dir")]
    MissingStaticDir,

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidAddress(String),
}

/// Per-request failures, mapped to a status code by the router.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServeError {
    #[error("file does not exist")]
    NotFound,

    #[error("path escapes the project directory")]
    Forbidden,
}
