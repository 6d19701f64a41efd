//! Debug file server for per-project data directories.
//!
//! Files under `{staticfiles_dir}/{project}/` are served at
//! `{staticfiles_uri}/{project}/files/{path}` with CORS headers, so a
//! labeling front end on another origin can load images during
//! development. The [`classifier`] module holds the SqueezeNet adapter used
//! by the model-training side of the same platform.

pub mod classifier;
pub mod config;
pub mod cors;
pub mod gateway;
pub mod http;
pub mod logger;
pub mod server;
