use platform_api::ApiError;
use platform_authn::SessionError;
use thiserror::Error;

use crate::forms::ValidationErrors;

/// Why a user action did not complete. Every variant has already been
/// surfaced through the notifier by the time it is returned.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// A client-side precondition failed; nothing was sent.
    #[error("{0}")]
    Refused(String),
    #[error("{0}")]
    ConfirmationRequired(String),
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ActionError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ActionError::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
