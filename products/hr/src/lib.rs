//! Evaluation views.
//!
//! Each view model loads its data through the [`ViewContext`], tracks a
//! [`ViewState`] and renders itself as text via `Display`. Failures are
//! reported through the shared [`Notifier`] and returned as
//! [`ActionError`]; none of them is fatal and nothing is retried.

pub mod context;
pub mod error;
pub mod forms;
pub mod generation;
pub mod notify;
pub mod view_state;
pub mod views;

pub use context::ViewContext;
pub use error::{ActionError, ActionResult};
pub use forms::{FormMode, ValidationErrors};
pub use generation::{Generation, RequestGenerations};
pub use notify::{Notification, Notifier};
pub use view_state::ViewState;
