use serde::{Deserialize, Serialize};

use crate::employees::EvaluationStatus;

/// Aggregates served by `GET /api/dashboard-data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub total_personnel: u64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employee_total: u64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub manager_total: u64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employee_completed: u64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employee_in_progress: u64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employee_list: Vec<PersonSummary>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub manager_list: Vec<PersonSummary>,
}

impl DashboardData {
    /// Share of employees whose evaluation is complete, rounded to a whole
    /// percent.
    pub fn completion_percent(&self) -> u64 {
        if self.employee_total == 0 {
            return 0;
        }
        let ratio = self.employee_completed as f64 / self.employee_total as f64;
        (ratio * 100.0).round() as u64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub status: Option<EvaluationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rounds_and_handles_empty_org() {
        let mut data = DashboardData::default();
        assert_eq!(data.completion_percent(), 0);
        data.employee_total = 3;
        data.employee_completed = 2;
        assert_eq!(data.completion_percent(), 67);
    }
}
