//! REST client for the evaluation backend.
//!
//! One method per endpoint. Endpoints the backend protects with a JWT take a
//! `token` and fail with [`ApiError::MissingToken`] before any I/O when it is
//! absent; the rest forward the token when there is one.

mod client;
mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
