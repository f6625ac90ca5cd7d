use platform_api::{ApiClient, ApiError};
use platform_authn::SessionStore;

use crate::{
    error::ActionError,
    forms::ValidationErrors,
    notify::Notifier,
    views::report::ResultCache,
};

/// Everything a view needs, built once at process entry and handed down.
#[derive(Clone, Debug)]
pub struct ViewContext {
    pub api: ApiClient,
    pub session: SessionStore,
    pub notifier: Notifier,
}

impl ViewContext {
    pub fn new(api: ApiClient, session: SessionStore, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn results(&self) -> ResultCache {
        ResultCache::new(self.session.storage())
    }

    /// Notifies and wraps a failed backend call.
    pub(crate) fn fail(&self, err: ApiError, fallback: &str) -> ActionError {
        let message = self.notifier.api_error(&err, fallback);
        ActionError::Api {
            message,
            source: err,
        }
    }

    pub(crate) fn refuse(&self, message: impl Into<String>) -> ActionError {
        let message = message.into();
        self.notifier.error(message.clone());
        ActionError::Refused(message)
    }

    pub(crate) fn invalid(&self, errors: ValidationErrors) -> ActionError {
        self.notifier.error(errors.to_string());
        ActionError::Invalid(errors)
    }
}

/// Signed-out context pointed at an address nothing listens on.
#[cfg(test)]
pub(crate) fn offline() -> ViewContext {
    use std::sync::Arc;

    use platform_authn::MemoryStore;

    ViewContext::new(
        ApiClient::new("http://127.0.0.1:9").expect("client"),
        SessionStore::new(Arc::new(MemoryStore::new())),
        Notifier::new(),
    )
}
