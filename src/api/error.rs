use thiserror::Error;

/// Why a catalog request failed. Callers surface every variant the same way;
/// the distinction exists for logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pull a human-readable message out of an API error body.
///
/// The API reports `message` as either a string or an array of strings.
pub(crate) fn message_of(body: &serde_json::Value) -> String {
    match body.get("message") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_owned).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
