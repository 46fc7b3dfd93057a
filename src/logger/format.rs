//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::{DateTime, Utc};
use hyper::http::request::Parts;
use serde::Serialize;
use std::time::Duration;

/// Access log entry for one request/response pair
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Caller IP (proxy header first, socket peer otherwise)
    pub remote_addr: String,
    pub time: DateTime<Utc>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry from the request head; status and size are filled by `finish`
    pub fn from_parts(parts: &Parts, remote_addr: &str) -> Self {
        let header = |name: hyper::header::HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            remote_addr: remote_addr.to_string(),
            time: Utc::now(),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(ToString::to_string),
            http_version: version_label(parts.version).to_string(),
            status: 200,
            body_bytes: 0,
            referer: header(hyper::header::REFERER),
            user_agent: header(hyper::header::USER_AGENT),
            request_time_us: 0,
        }
    }

    pub fn finish(&mut self, status: u16, body_bytes: usize, elapsed: Duration) {
        self.status = status;
        self.body_bytes = body_bytes;
        self.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => serde_json::to_string(self).unwrap_or_default(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time_local(),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`
    /// (seconds, 3 decimals), `$status`, `$body_bytes_sent`, `$http_referer`,
    /// `$http_user_agent`. Unknown variables are kept as written.
    ///
    /// The pattern is scanned once, so substituted values are never expanded.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..name_len];

            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[name_len..];
        }

        out.push_str(rest);
        out
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time_local(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request" => format!(
                "{} {} HTTP/{}",
                self.method,
                self.request_uri(),
                self.http_version
            ),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let secs = self.request_time_us as f64 / 1_000_000.0;
                format!("{secs:.3}")
            }
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            _ => return None,
        };
        Some(value)
    }
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
