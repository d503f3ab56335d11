//! Maps whatever went wrong during an attempt onto the closed [`ErrorKind`] set.

use serde_json::Value;

const MAX_FALLBACK_TEXT: usize = 200;

/// Terminal failure reasons a caller can observe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("no file selected")]
    InputMissing,

    #[error("analysis endpoint is not configured")]
    ConfigurationMissing,

    #[error("the analysis service did not answer in time")]
    Timeout,

    #[error("server error: {detail}")]
    ServerError { detail: String },

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("unknown error")]
    UnknownError,
}

/// A response the server sent back with a non-success status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub text: String,
}

/// Raw failure as reported by the transport, before classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFailure {
    /// The transport gave up before a response arrived.
    pub timed_out: bool,
    pub response: Option<FailureResponse>,
    pub message: Option<String>,
}

impl RawFailure {
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), ..Self::default() }
    }

    /// Builds a failure from a non-success response and its raw body text.
    pub fn response(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        let body = serde_json::from_str::<Value>(&text).ok();
        Self {
            response: Some(FailureResponse { status, body, text }),
            ..Self::default()
        }
    }
}

impl From<reqwest::Error> for RawFailure {
    fn from(error: reqwest::Error) -> Self {
        Self {
            timed_out: error.is_timeout(),
            response: None,
            message: Some(error.to_string()),
        }
    }
}

/// Total and order-sensitive: a transport timeout wins even when a body is present.
pub fn classify(raw: &RawFailure) -> ErrorKind {
    if raw.timed_out {
        return ErrorKind::Timeout;
    }

    if let Some(response) = &raw.response {
        if let Some(detail) = body_str(response, "detail") {
            return ErrorKind::ServerError { detail: detail.to_string() };
        }
        return ErrorKind::ServerError { detail: fallback_message(response) };
    }

    match raw.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => ErrorKind::NetworkError {
            message: message.to_string(),
        },
        _ => ErrorKind::UnknownError,
    }
}

fn body_str<'a>(response: &'a FailureResponse, field: &str) -> Option<&'a str> {
    response.body.as_ref()?.get(field)?.as_str()
}

fn fallback_message(response: &FailureResponse) -> String {
    if let Some(message) = body_str(response, "message") {
        return message.to_string();
    }

    let text = response.text.trim();
    if !text.is_empty() {
        return text.chars().take(MAX_FALLBACK_TEXT).collect();
    }

    match reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        Some(reason) => format!("HTTP {} {}", response.status, reason),
        None => format!("HTTP {}", response.status),
    }
}
