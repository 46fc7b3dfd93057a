//! HTTP response building module
//!
//! Builders for every response the service produces, plus CORS decoration.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::AppError;

/// Cache hint for the project list: fresh 4h, shared caches 12h
pub const PROJECTS_CACHE_CONTROL: &str = "public, max-age=14400, s-maxage=43200";

const NOT_FOUND_BODY: &str = "404, not found!";
const PREFLIGHT_ALLOWED_METHODS: &str = "GET, POST";
const PREFLIGHT_DEFAULT_HEADERS: &str = "Content-Type";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Build JSON response, optionally with a `Cache-Control` hint
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    cache_control: Option<&str>,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_error_response(&AppError::from(e));
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    if let Some(value) = cache_control {
        builder = builder.header("Cache-Control", value);
    }

    builder.body(Full::new(Bytes::from(json))).unwrap_or_else(|e| {
        log_build_error("JSON", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 201 Created response with an empty body
pub fn build_created_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::CREATED)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("201", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response for unmatched routes
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain;charset=UTF-8")
        .body(Full::new(Bytes::from_static(NOT_FOUND_BODY.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from_static(NOT_FOUND_BODY.as_bytes())))
        })
}

/// Build `{"error": message}` response with the error's status
pub fn build_error_response(err: &AppError) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": err.public_message() });

    Response::builder()
        .status(err.status_code())
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("error", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
///
/// Allowed headers echo the client's `Access-Control-Request-Headers`.
pub fn build_options_response(requested_headers: Option<&str>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", PREFLIGHT_ALLOWED_METHODS)
        .header("Access-Control-Allow-Methods", PREFLIGHT_ALLOWED_METHODS)
        .header(
            "Access-Control-Allow-Headers",
            requested_headers.unwrap_or(PREFLIGHT_DEFAULT_HEADERS),
        )
        .header("Access-Control-Max-Age", PREFLIGHT_MAX_AGE)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Allow any origin on a finished response
pub fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
