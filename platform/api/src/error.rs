use std::sync::Arc;

use thiserror::Error;

/// Shared client result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a backend call, classified the way views surface it:
/// authentication problems go to a banner, everything else to a toast.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Authentication token not found. Please log in again.")]
    MissingToken,
    #[error("{}", .0.as_deref().unwrap_or("unauthorized"))]
    Unauthorized(Option<String>),
    #[error("{}", .0.as_deref().unwrap_or("forbidden"))]
    Forbidden(Option<String>),
    #[error("{}", .0.as_deref().unwrap_or("resource not found"))]
    NotFound(Option<String>),
    #[error("{}", .0.as_deref().unwrap_or("bad request"))]
    InvalidInput(Option<String>),
    #[error("backend returned {status}")]
    Backend { status: u16, message: Option<String> },
    #[error("request failed: {0}")]
    Transport(Arc<reqwest::Error>),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingToken | ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Backend { .. } => "BACKEND",
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::Decode(_) => "DECODE",
        }
    }

    /// Builds the error for a non-2xx answer. `message` is whatever the
    /// backend put in its `error` field (or its plain-text body).
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.trim().is_empty());
        match status {
            400 => ApiError::InvalidInput(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Backend { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::InvalidInput(_) => Some(400),
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::MissingToken | ApiError::Decode(_) => None,
        }
    }

    /// Token missing or rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::MissingToken | ApiError::Unauthorized(_))
    }

    /// Message the backend supplied, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::InvalidInput(m)
            | ApiError::Backend { message: m, .. } => m.as_deref(),
            _ => None,
        }
    }

    /// Text shown to the user: the server's own message when it sent one,
    /// the view's generic fallback otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::MissingToken => self.to_string(),
            other => other
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ApiError::Decode(value.to_string())
        } else {
            ApiError::Transport(Arc::new(value))
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from_status(400, Some("bad".into())),
            ApiError::InvalidInput(Some(_))
        ));
        let incomplete = ApiError::from_status(422, Some("Details not filled.".into()));
        assert!(!incomplete.is_auth());
        assert_eq!(incomplete.status(), Some(422));
        assert_eq!(ApiError::from_status(503, None).status(), Some(503));
        assert_eq!(ApiError::from_status(500, None).code(), "BACKEND");
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = ApiError::from_status(400, Some("Employee name is required".into()));
        assert_eq!(err.user_message("Report generation failed."), "Employee name is required");
        let err = ApiError::from_status(500, Some("   ".into()));
        assert_eq!(err.user_message("Report generation failed."), "Report generation failed.");
    }

    #[test]
    fn missing_token_has_its_own_text() {
        assert_eq!(
            ApiError::MissingToken.user_message("ignored"),
            "Authentication token not found. Please log in again."
        );
    }
}
