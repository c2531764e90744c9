use chrono::NaiveDate;
use thiserror::Error;

/// codetally error types
#[derive(Error, Debug)]
pub enum CodetallyError {
    /// Missing or invalid configuration (checked before any network call)
    #[error("config error: {0}")]
    Config(String),

    /// Remote rejected the credential (401)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Credential lacks access to the requested resource (403)
    #[error("permission denied: {0}")]
    Permission(String),

    /// Remote is throttling requests (429)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Remote failed on its side (5xx)
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Connection, timeout or TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Failed to parse a response payload
    #[error("parse error: {0}")]
    Parse(String),

    /// Single-day response carried no usable day record
    #[error("no summary data returned for {0}")]
    NoData(NaiveDate),

    /// Store persistence failed
    #[error("store error: {0}")]
    Store(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodetallyError {
    /// Map a non-2xx status and its (possibly empty) body to an error kind.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = remote_error_message(body).unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 => CodetallyError::Auth(message),
            403 => CodetallyError::Permission(message),
            429 => CodetallyError::RateLimited(message),
            500..=599 => CodetallyError::Server { status, message },
            _ => CodetallyError::Http { status, message },
        }
    }
}

/// Pull a human message out of `{"error": "..."}` or `{"errors": [...]}` bodies.
fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(msg) = value.get("error").and_then(|v| v.as_str()) {
        return Some(msg.to_string());
    }
    let errors: Vec<String> = value
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

/// Result type alias for codetally
pub type Result<T> = std::result::Result<T, CodetallyError>;
