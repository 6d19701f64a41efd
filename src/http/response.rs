//! HTTP response building module
//!
//! Builders for the status codes the file gateway emits. CORS headers are
//! added afterwards by [`crate::cors::Cors::decorate`].

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::range::ByteRange;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Validators sent with file responses
#[derive(Debug, Clone)]
pub struct Validators {
    pub etag: String,
    pub last_modified: Option<String>,
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<Full<Bytes>> {
    with_validators(Response::builder().status(304), validators)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    text_response(403, "Access denied.")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    text_response(404, "File does not exist.")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = text_response(405, "405 Method Not Allowed");
    response.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// Build preflight response: no body, CORS headers added by the caller
pub fn build_preflight_response(max_age: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS)
        .header("Access-Control-Max-Age", max_age)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response; `body` is the whole file, or empty for HEAD
pub fn build_file_response(
    body: Bytes,
    content_length: u64,
    content_type: &str,
    validators: &Validators,
) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes");

    with_validators(builder, validators)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response; `body` holds exactly `range`, or
/// nothing for HEAD
pub fn build_partial_response(
    body: Bytes,
    range: ByteRange,
    file_size: u64,
    content_type: &str,
    validators: &Validators,
) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(file_size))
        .header("Accept-Ranges", "bytes");

    with_validators(builder, validators)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn with_validators(
    builder: hyper::http::response::Builder,
    validators: &Validators,
) -> hyper::http::response::Builder {
    let builder = builder.header("ETag", &validators.etag);
    match &validators.last_modified {
        Some(last_modified) => builder.header("Last-Modified", last_modified),
        None => builder,
    }
}

fn text_response(status: u16, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from_static(message.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
