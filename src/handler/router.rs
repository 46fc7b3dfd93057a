//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight handling, route
//! matching, error interception, CORS decoration and access logging.

use chrono::Utc;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, ACCESS_CONTROL_REQUEST_HEADERS, CONTENT_LENGTH, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::captcha::CaptchaVerifier;
use crate::config::AppState;
use crate::error::AppError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::store::ProjectStore;

/// Routes served by this API
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Projects,
    VoteCount,
    Vote { id: &'a str },
    Status,
    NotFound,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every error is turned into a JSON error response here.
pub async fn handle_request<B, S, V>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState<S, V>>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: ProjectStore,
    V: CaptchaVerifier,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let client_ip = client_ip(&parts.headers, &state.config.http.client_ip_header, peer_addr);
    let mut entry = AccessLogEntry::from_parts(&parts, &client_ip);

    let response = if parts.method == Method::OPTIONS {
        let requested = parts
            .headers
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .and_then(|v| v.to_str().ok());
        http::build_options_response(requested)
    } else {
        match route_request(&parts, body, &client_ip, &*state).await {
            Ok(resp) => resp,
            Err(err) => {
                logger::log_request_error(parts.method.as_str(), parts.uri.path(), &err);
                http::build_error_response(&err)
            }
        }
    };
    let response = http::with_cors(response);

    if state.config.logging.access_log {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match method and path against the route table
fn match_route<'a>(method: &Method, path: &'a str) -> Route<'a> {
    let trimmed = path.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

    match (method, segments.as_slice()) {
        (&Method::GET, ["projects"]) => Route::Projects,
        (&Method::GET, ["projects", "vote-count"]) => Route::VoteCount,
        (&Method::POST, ["projects", id, "vote"]) if !id.is_empty() => Route::Vote { id: *id },
        (&Method::GET, ["status"]) => Route::Status,
        _ => Route::NotFound,
    }
}

/// Dispatch to the matched route handler
async fn route_request<B, S, V>(
    parts: &Parts,
    body: B,
    client_ip: &str,
    state: &AppState<S, V>,
) -> Result<Response<Full<Bytes>>, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: ProjectStore,
    V: CaptchaVerifier,
{
    match match_route(&parts.method, parts.uri.path()) {
        Route::Projects => {
            let projects = state.store.list_projects().await?;
            Ok(http::build_json_response(
                StatusCode::OK,
                &projects,
                Some(http::PROJECTS_CACHE_CONTROL),
            ))
        }
        Route::VoteCount => {
            let tallies = state.store.vote_tallies().await?;
            Ok(http::build_json_response(StatusCode::OK, &tallies, None))
        }
        Route::Vote { id } => cast_vote(id, parts, body, client_ip, state).await,
        Route::Status => {
            let status = state.voting.status(Utc::now());
            Ok(http::build_json_response(StatusCode::OK, &status, None))
        }
        Route::NotFound => Ok(http::build_404_response()),
    }
}

/// `POST /projects/:id/vote`
///
/// Each step short-circuits: id, captcha token, voting window, captcha
/// verification, then the store update.
async fn cast_vote<B, S, V>(
    raw_id: &str,
    parts: &Parts,
    body: B,
    client_ip: &str,
    state: &AppState<S, V>,
) -> Result<Response<Full<Bytes>>, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: ProjectStore,
    V: CaptchaVerifier,
{
    let project_id = parse_project_id(raw_id)?;

    let body = read_body(&parts.headers, body, state.config.http.max_body_size).await?;
    let captcha_response = parse_captcha_response(&body)?;

    if !state.voting.is_open(Utc::now()) {
        return Err(AppError::status(
            StatusCode::REQUEST_TIMEOUT,
            "Voting time is over",
        ));
    }

    let captcha_valid = state
        .captcha
        .verify(
            state.config.captcha.secret.expose(),
            &captcha_response,
            client_ip,
        )
        .await?;
    if !captcha_valid {
        return Err(AppError::status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid captcha",
        ));
    }

    let user_agent = parts
        .headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let changed = state
        .store
        .cast_vote(project_id, client_ip, user_agent)
        .await?;
    if !changed {
        return Err(AppError::status(
            StatusCode::NOT_FOUND,
            "Could not find project. Nothing has changed.",
        ));
    }

    Ok(http::build_created_response())
}

/// Project ids are positive integers
fn parse_project_id(raw: &str) -> Result<u64, AppError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::status(StatusCode::BAD_REQUEST, "Invalid project id"))
}

/// Extract the `captchaResponse` token from the JSON body
///
/// A body that is not JSON, or is JSON `null`, is an unexpected failure.
/// A missing or falsy token (`null`, `false`, `0`, `""`) is a client error;
/// any other non-string token is passed on in its JSON text form.
fn parse_captcha_response(body: &[u8]) -> Result<String, AppError> {
    let value: Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Err(AppError::RequestBody("vote body is null".into()));
    }

    match value.get("captchaResponse") {
        None | Some(Value::Null | Value::Bool(false)) => Err(invalid_captcha_response()),
        Some(Value::String(token)) if token.is_empty() => Err(invalid_captcha_response()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(invalid_captcha_response()),
        Some(Value::String(token)) => Ok(token.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

fn invalid_captcha_response() -> AppError {
    AppError::status(StatusCode::BAD_REQUEST, "Invalid captcha response")
}

/// Collect the request body, rejecting anything over `max_body_size`
async fn read_body<B>(headers: &HeaderMap, body: B, max_body_size: u64) -> Result<Bytes, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let too_large = || AppError::status(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|size| size > max_body_size) {
        return Err(too_large());
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(too_large()),
        Err(e) => Err(AppError::RequestBody(e)),
    }
}

/// Caller IP from the trusted proxy header, falling back to the socket peer
fn client_ip(headers: &HeaderMap, header_name: &str, peer_addr: SocketAddr) -> String {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map_or_else(|| peer_addr.ip().to_string(), ToString::to_string)
}
