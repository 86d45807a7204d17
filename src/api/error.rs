use reqwest::StatusCode;
use thiserror::Error;

/// Advisory checks run before a request is sent. The server re-validates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Quantity must be at least 1 (got {requested})")]
    QuantityTooSmall { requested: i64 },
    #[error("Only {available} available, cannot take {requested}")]
    InsufficientStock { requested: i64, available: i64 },
    #[error("Price must be greater than 0 (got {price})")]
    InvalidPrice { price: f64 },
    #[error("Quantity cannot be negative (got {quantity})")]
    NegativeQuantity { quantity: i64 },
    #[error("{field} must not be empty")]
    Blank { field: &'static str },
    #[error("Nothing to update")]
    EmptyUpdate,
    #[error("Sweet {id} is not in the current list")]
    UnknownSweet { id: i64 },
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure; there is no server detail to show.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401. Callers send the user back to login.
    #[error("{detail}")]
    Unauthorized { detail: String },

    /// Any other non-success status, with the server's message verbatim.
    #[error("{detail}")]
    Server { status: StatusCode, detail: String },

    /// Success status but the body was not what we expected.
    #[error("Parse error: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized { detail }
        } else {
            ApiError::Server { status, detail }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Text to show the user: the server's detail or the local validation
    /// message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Server { detail, .. } => detail.clone(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::Network(_) | ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

/// Pull the `detail` field out of an error body. Structured details (the
/// server's field-validation lists) are passed through as JSON text; a
/// non-JSON body is returned as-is.
fn extract_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}
