//! Static file gateway
//!
//! Serves `{staticfiles_dir}/{project}/{path}` at
//! `{staticfiles_uri}/{project}/files/{path}`. Meant for debugging and
//! local setups only: there is no authentication or rate limiting, so put a
//! proper file server in front of the data directory for deployments.

mod error;
pub mod route;
pub mod router;
pub mod settings;
pub mod static_files;

pub use error::{GatewayError, ServeError};
pub use route::{match_route, FileRequest};
pub use router::handle_request;
pub use settings::{normalize_address, FileServerProperties, StaticSettings};
