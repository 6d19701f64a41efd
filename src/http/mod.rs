//! HTTP protocol layer module
//!
//! Protocol helpers shared by the file gateway: content types, cache
//! validators, byte ranges and response builders.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_byte_range, ByteRange, RangeOutcome};
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_416_response, build_preflight_response, Validators,
};
