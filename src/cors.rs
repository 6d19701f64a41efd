//! Cross-origin header injection
//!
//! Wraps every gateway response so browser clients served from another
//! origin (the labeling UI) can fetch project files.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use hyper::Response;

use crate::config::CorsConfig;
use crate::http;
use crate::logger;

const WILDCARD: &str = "*";

/// CORS policy resolved once from configuration
#[derive(Debug, Clone)]
pub struct Cors {
    allow_any: bool,
    allow_origins: Vec<String>,
    /// Sent when the request carries no permitted `Origin`
    fallback_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
    max_age: u64,
}

impl Cors {
    pub fn new(config: CorsConfig) -> Self {
        let defaults = CorsConfig::default();
        let allow_any = config.allow_origins.is_empty()
            || config.allow_origins.iter().any(|o| o.trim() == WILDCARD);

        let allow_origins: Vec<String> = config
            .allow_origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .collect();

        let fallback_origin = match allow_origins.first() {
            Some(first) if !allow_any => header_or(first, WILDCARD, "cors.allow_origins"),
            _ => HeaderValue::from_static(WILDCARD),
        };

        Self {
            allow_any,
            fallback_origin,
            allow_methods: header_or(
                &config.allow_methods,
                &defaults.allow_methods,
                "cors.allow_methods",
            ),
            allow_headers: header_or(
                &config.allow_headers,
                &defaults.allow_headers,
                "cors.allow_headers",
            ),
            allow_origins,
            allow_credentials: config.allow_credentials,
            max_age: config.max_age,
        }
    }

    /// Whether `origin` may read responses
    pub fn permits(&self, origin: &str) -> bool {
        self.allow_any || self.allow_origins.iter().any(|o| o == origin)
    }

    /// Value for `Access-Control-Allow-Origin` given the request's `Origin`
    pub fn allow_origin(&self, origin: Option<&HeaderValue>) -> (HeaderValue, bool) {
        match origin {
            Some(value) if value.to_str().is_ok_and(|o| self.permits(o)) => (value.clone(), true),
            _ => (self.fallback_origin.clone(), false),
        }
    }

    /// Preflight response for a matched route
    pub fn preflight(&self) -> Response<Full<Bytes>> {
        http::build_preflight_response(self.max_age)
    }

    /// Add cross-origin headers to a response
    pub fn decorate(
        &self,
        origin: Option<&HeaderValue>,
        mut response: Response<Full<Bytes>>,
    ) -> Response<Full<Bytes>> {
        let (allow_origin, echoed) = self.allow_origin(origin);
        let headers = response.headers_mut();

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        if echoed {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }

        response
    }
}

fn header_or(value: &str, fallback: &str, key: &str) -> HeaderValue {
    HeaderValue::from_str(value.trim()).unwrap_or_else(|e| {
        logger::log_warning(&format!("Ignoring invalid {key} value '{value}': {e}"));
        HeaderValue::from_str(fallback).unwrap_or_else(|_| HeaderValue::from_static(WILDCARD))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restricted() -> Cors {
        Cors::new(CorsConfig {
            allow_origins: vec!["https://labels.example.com/".to_string()],
            allow_credentials: true,
            ..CorsConfig::default()
        })
    }

    fn empty() -> Response<Full<Bytes>> {
        Response::new(Full::new(Bytes::new()))
    }

    #[test]
    fn test_wildcard_echoes_calling_origin() {
        let cors = Cors::new(CorsConfig::default());
        let origin = HeaderValue::from_static("http://localhost:5000");
        let resp = cors.decorate(Some(&origin), empty());

        assert_eq!(resp.headers()["access-control-allow-origin"], "http://localhost:5000");
        assert_eq!(resp.headers()["vary"], "Origin");
        assert!(resp.headers().get("access-control-allow-credentials").is_none());
    }

    #[test]
    fn test_wildcard_without_origin() {
        let cors = Cors::new(CorsConfig::default());
        let resp = cors.decorate(None, empty());

        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, HEAD, OPTIONS");
        assert!(resp.headers().get("vary").is_none());
    }

    #[test]
    fn test_restricted_origins() {
        let cors = restricted();
        assert!(cors.permits("https://labels.example.com"));
        assert!(!cors.permits("https://evil.example.com"));

        let other = HeaderValue::from_static("https://evil.example.com");
        let resp = cors.decorate(Some(&other), empty());
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://labels.example.com"
        );
        assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
    }

    #[test]
    fn test_invalid_header_config_falls_back() {
        let cors = Cors::new(CorsConfig {
            allow_methods: "GE\nT".to_string(),
            ..CorsConfig::default()
        });
        let resp = cors.decorate(None, empty());
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, HEAD, OPTIONS");
    }
}
