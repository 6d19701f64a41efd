//! File server settings
//!
//! Typed view of the two configuration keys the gateway needs, validated
//! once at startup.

use std::path::{Path, PathBuf};

use super::GatewayError;
use crate::logger;

/// Read access to the file server section of a configuration
pub trait FileServerProperties {
    /// Whether this configuration describes a file server instance
    fn is_file_server(&self) -> bool;

    /// `FileServer.staticfiles_dir`, required
    fn staticfiles_dir(&self) -> Option<&str>;

    /// `FileServer.staticfiles_uri`, empty when unset
    fn staticfiles_uri(&self) -> &str;
}

/// Immutable settings the request handler works from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    static_dir: PathBuf,
    static_address: String,
}

impl StaticSettings {
    pub fn from_properties<P>(props: &P) -> Result<Self, GatewayError>
    where
        P: FileServerProperties + ?Sized,
    {
        if !props.is_file_server() {
            return Err(GatewayError::NotFileServer);
        }

        let static_dir = props
            .staticfiles_dir()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .ok_or(GatewayError::MissingStaticDir)?;

        if !Path::new(static_dir).is_dir() {
            logger::log_warning(&format!(
                "Static directory '{static_dir}' does not exist yet; requests will 404"
            ));
        }

        Ok(Self {
            static_dir: PathBuf::from(static_dir),
            static_address: normalize_address(props.staticfiles_uri()),
        })
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// URL prefix, always starting with a single `/`
    pub fn static_address(&self) -> &str {
        &self.static_address
    }
}

/// Prefix `uri` with exactly one `/` and drop trailing separators
///
/// ```
/// use project_fileserver::gateway::normalize_address;
///
/// assert_eq!(normalize_address(""), "/");
/// assert_eq!(normalize_address("static"), "/static");
/// assert_eq!(normalize_address("//static/"), "/static");
/// ```
pub fn normalize_address(uri: &str) -> String {
    let trimmed = uri.trim().trim_matches('/');
    format!("/{trimmed}")
}
