use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::users::Role;

/// Evaluation progress as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl EvaluationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::Completed => "Completed",
            EvaluationStatus::InProgress => "In Progress",
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full employee profile as served by `/manual-entry/hr/{id}`.
///
/// Identity fields are typed; the many evaluation inputs (KPIs, ratings,
/// notes) stay in `fields` keyed by their backend name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EmployeeRecord {
    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::Employee)
    }

    /// Reads any field by backend name, typed or not.
    pub fn get(&self, name: &str) -> Option<Value> {
        let text = |value: &Option<String>| value.clone().map(Value::String);
        match name {
            "employee_id" => Some(Value::String(self.employee_id.clone())),
            "name" => Some(Value::String(self.name.clone())),
            "role" => self.role.map(|role| Value::String(role.as_str().into())),
            "email" => text(&self.email),
            "department" => text(&self.department),
            "designation" => text(&self.designation),
            "reporting_manager" => text(&self.reporting_manager),
            "employment_type" => text(&self.employment_type),
            "work_location" => text(&self.work_location),
            "date_of_joining" => text(&self.date_of_joining),
            other => self.fields.get(other).cloned(),
        }
    }

    /// Writes a field by backend name. Identity fields accept strings only;
    /// anything else lands in the open field map.
    pub fn set(&mut self, name: &str, value: Value) {
        let as_text = |value: &Value| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        match name {
            "employee_id" => self.employee_id = as_text(&value).unwrap_or_default(),
            "name" => self.name = as_text(&value).unwrap_or_default(),
            "role" => self.role = as_text(&value).as_deref().and_then(Role::parse),
            "email" => self.email = as_text(&value),
            "department" => self.department = as_text(&value),
            "designation" => self.designation = as_text(&value),
            "reporting_manager" => self.reporting_manager = as_text(&value),
            "employment_type" => self.employment_type = as_text(&value),
            "work_location" => self.work_location = as_text(&value),
            "date_of_joining" => self.date_of_joining = as_text(&value),
            other => {
                self.fields.insert(other.to_string(), value);
            }
        }
    }

    /// True when the field exists and holds something other than null or an
    /// empty string.
    pub fn has_value(&self, name: &str) -> bool {
        match self.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Team-lead review is considered done once `tenure_in_current_role` is set.
    pub fn evaluation_status(&self) -> EvaluationStatus {
        if self.has_value("tenure_in_current_role") {
            EvaluationStatus::Completed
        } else {
            EvaluationStatus::InProgress
        }
    }

    /// HR has filled the career section once `total_experience` is set.
    pub fn hr_section_complete(&self) -> bool {
        self.has_value("total_experience")
    }
}

/// Row of `GET /manual-entry/employees`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub employee_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_manager: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeesResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub employees: Vec<EmployeeSummary>,
}

/// Row of `GET /api/employees/all`; managers and employees share one list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonnelEntry {
    pub name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<EvaluationStatus>,
}

impl PersonnelEntry {
    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::Employee)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PersonnelResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub users: Vec<PersonnelEntry>,
}

/// Row of `GET /api/manager/team`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub designation: Option<String>,
    pub status: EvaluationStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TeamResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub team: Vec<TeamMember>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ManagersResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub managers: Vec<String>,
}

/// Names of the staged records after a CSV upload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NamesResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub names: Vec<String>,
}

/// Employee self-assessment, stored alongside the team-lead fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfAssessment {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub accomplishments: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub challenges: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub collaboration: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub skills_developed: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub voluntary_contributions: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub feedback: String,
}

impl SelfAssessment {
    pub fn from_record(record: &EmployeeRecord) -> Self {
        let text = |name: &str| match record.get(name) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            accomplishments: text("accomplishments"),
            challenges: text("challenges"),
            collaboration: text("collaboration"),
            skills_developed: text("skills_developed"),
            voluntary_contributions: text("voluntary_contributions"),
            feedback: text("feedback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "employee_id": "EMP0001",
            "name": "Asha",
            "department": "Engineering",
            "code_commits": 41,
            "hr_notes": "steady"
        });
        let record: EmployeeRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.department.as_deref(), Some("Engineering"));
        assert_eq!(record.get("code_commits"), Some(json!(41)));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn evaluation_status_follows_team_lead_field() {
        let mut record = EmployeeRecord::default();
        assert_eq!(record.evaluation_status(), EvaluationStatus::InProgress);
        record.set("tenure_in_current_role", Value::Null);
        assert_eq!(record.evaluation_status(), EvaluationStatus::InProgress);
        record.set("tenure_in_current_role", json!(2));
        assert_eq!(record.evaluation_status(), EvaluationStatus::Completed);
    }

    #[test]
    fn set_routes_identity_fields() {
        let mut record = EmployeeRecord::default();
        record.set("role", json!("Manager"));
        record.set("work_location", json!(""));
        record.set("designation", json!("QA Tester"));
        assert_eq!(record.role(), Role::Manager);
        assert_eq!(record.work_location, None);
        assert_eq!(record.designation.as_deref(), Some("QA Tester"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn team_member_status_uses_spaced_spelling() {
        let member: TeamMember = serde_json::from_value(json!({
            "employee_id": "EMP0002",
            "name": "Ravi",
            "status": "In Progress"
        }))
        .unwrap();
        assert_eq!(member.status, EvaluationStatus::InProgress);
    }

    #[test]
    fn cleaned_nulls_load_as_empty_values() {
        let record: EmployeeRecord = serde_json::from_str(
            r#"{"employee_id":"EMP0001","name":null,"department":"Sales","role":null,"code_commits":null}"#,
        )
        .unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.role, None);
        assert_eq!(record.department.as_deref(), Some("Sales"));
        assert!(!record.has_value("code_commits"));

        let assessment: SelfAssessment =
            serde_json::from_value(json!({"accomplishments": null, "feedback": "ok"})).unwrap();
        assert_eq!(assessment.accomplishments, "");
        assert_eq!(assessment.feedback, "ok");

        let names: NamesResponse = serde_json::from_value(json!({"names": null})).unwrap();
        assert!(names.names.is_empty());
    }
}
