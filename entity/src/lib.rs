//! Wire types exchanged with the evaluation backend.
//!
//! Everything here mirrors a JSON payload of the REST API. Records the client
//! does not own (employees, tasks, reports) keep unknown fields so a load/save
//! cycle never drops data the backend added.

pub mod dashboards;
pub mod employees;
pub mod insights;
pub mod reports;
pub mod tasks;
pub mod users;

pub use employees::{EmployeeRecord, EvaluationStatus};
pub use reports::ReportResult;
pub use tasks::{Priority, Task, TaskStatus};
pub use users::{Role, User};

use serde::{Deserialize, Deserializer};

/// Reads `null` as the type's default. The backend cleans missing
/// spreadsheet cells to `null`, which `#[serde(default)]` alone rejects.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "message": ... }` acknowledgement returned by write endpoints.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
