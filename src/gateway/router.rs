//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, route match,
//! file serving, then CORS decoration and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::route::match_route;
use super::static_files::{self, RequestContext};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let origin = req.headers().get(header::ORIGIN).cloned();

    let response = route_request(&req, &state).await;
    let mut response = state.cors.decorate(origin.as_ref(), response);

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(header::SERVER, server_name);
    }

    if state.access_log_enabled() {
        log_access(&req, &response, &state, remote_addr, started);
    }

    Ok(response)
}

/// Dispatch by method and path; the response still lacks CORS headers
async fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();
    if !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return http::build_405_response();
    }

    let Some(file_request) = match_route(state.settings.static_address(), req.uri().path()) else {
        logger::log_debug(&format!("No route for {}", req.uri().path()));
        return http::build_404_response();
    };

    if *method == Method::OPTIONS {
        return state.cors.preflight();
    }

    let ctx = request_context(method, req.headers());
    static_files::serve(&ctx, state.settings.static_dir(), &file_request).await
}

fn request_context(method: &Method, headers: &HeaderMap) -> RequestContext {
    let header_string = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    RequestContext {
        is_head: *method == Method::HEAD,
        if_none_match: header_string(header::IF_NONE_MATCH),
        if_modified_since: header_string(header::IF_MODIFIED_SINCE),
        range_header: header_string(header::RANGE),
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    remote_addr: SocketAddr,
    started: Instant,
) {
    let header_string = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(header::REFERER);
    entry.user_agent = header_string(header::USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;

    const ADDR: &str = "127.0.0.1:50000";

    struct Fixture {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    fn fixture(uri: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("proj1/images")).unwrap();
        std::fs::write(dir.path().join("proj1/images/a.png"), b"image-bytes").unwrap();

        let toml = format!(
            "[logging]\naccess_log = false\n\n[file_server]\nstaticfiles_dir = {:?}\nstaticfiles_uri = {uri:?}\n",
            dir.path().to_str().unwrap()
        );
        let config = Config::from_toml_str(&toml).unwrap();
        Fixture {
            state: Arc::new(AppState::new(config).unwrap()),
            _dir: dir,
        }
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        origin: Option<&str>,
    ) -> Response<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        let req = builder.body(()).unwrap();
        handle_request(req, Arc::clone(state), ADDR.parse().unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let fx = fixture("");
        let resp = send(&fx.state, Method::GET, "/proj1/files/images/a.png", None).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "image/png");
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["server"], "project-fileserver");
        assert_eq!(&body_bytes(resp).await[..], b"image-bytes");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_cors() {
        let fx = fixture("");
        let resp = send(
            &fx.state,
            Method::GET,
            "/proj1/files/images/b.png",
            Some("http://localhost:8080"),
        )
        .await;

        assert_eq!(resp.status(), 404);
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "http://localhost:8080"
        );
        assert_ne!(&body_bytes(resp).await[..], b"image-bytes");
    }

    #[tokio::test]
    async fn test_options_is_preflight_regardless_of_file() {
        let fx = fixture("");
        for uri in ["/proj1/files/images/a.png", "/proj1/files/nothing/here.png"] {
            let resp = send(&fx.state, Method::OPTIONS, uri, Some("http://ui.local")).await;
            assert_eq!(resp.status(), 204);
            assert_eq!(resp.headers()["access-control-allow-origin"], "http://ui.local");
            assert!(resp.headers().contains_key("access-control-allow-methods"));
            assert!(body_bytes(resp).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_head_has_headers_only() {
        let fx = fixture("");
        let resp = send(&fx.state, Method::HEAD, "/proj1/files/images/a.png", None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "11");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_prefixed_address() {
        let fx = fixture("static");
        let resp = send(&fx.state, Method::GET, "/static/proj1/files/images/a.png", None).await;
        assert_eq!(resp.status(), 200);

        let resp = send(&fx.state, Method::GET, "/proj1/files/images/a.png", None).await;
        assert_eq!(resp.status(), 404);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let fx = fixture("");
        let resp = send(&fx.state, Method::GET, "/proj1/files/..%2F..%2Fsecret", None).await;
        assert_eq!(resp.status(), 403);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let fx = fixture("");
        let resp = send(&fx.state, Method::POST, "/proj1/files/images/a.png", None).await;
        assert_eq!(resp.status(), 405);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }
}
