//! One module per navigable page.

pub mod assign_task;
pub mod chatbot;
pub mod employee_dashboard;
pub mod employee_list;
pub mod hr_dashboard;
pub mod insights;
pub mod login;
pub mod manager_dashboard;
pub mod manual_entry;
pub mod report;
pub mod search;
pub mod team_entry;
pub mod team_insights;
pub mod upload;

use entity::EvaluationStatus;
use platform_api::ApiError;

/// Case-insensitive substring match used by every name filter.
pub(crate) fn name_matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

pub(crate) fn status_label(status: Option<EvaluationStatus>) -> &'static str {
    match status {
        Some(EvaluationStatus::Completed) => "[done] Completed",
        Some(EvaluationStatus::InProgress) => "[....] In Progress",
        None => "[ -- ] Unknown",
    }
}

/// Fallback text for a failed call: `unreachable` when the backend could not
/// be reached at all, `fallback` otherwise.
pub(crate) fn fallback_for<'a>(err: &ApiError, fallback: &'a str, unreachable: &'a str) -> &'a str {
    if matches!(err, ApiError::Transport(_)) {
        unreachable
    } else {
        fallback
    }
}

/// Horizontal bar of `width` cells for `value` out of `max`.
pub(crate) fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}
