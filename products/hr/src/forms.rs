//! Field tables and validation for the two record-entry forms.
//!
//! The HR form edits identity and career data; what it shows depends on the
//! [`FormMode`]. The team-lead form edits review fields and the KPIs of the
//! employee's designation while the HR fields stay read-only.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use entity::{EmployeeRecord, Role};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label}: {message}")]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            label: label_for(field),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(value: FieldError) -> Self {
        ValidationErrors(vec![value])
    }
}

pub const DEPARTMENTS: [&str; 8] = [
    "Engineering",
    "Product",
    "Marketing",
    "Sales",
    "HR",
    "Operations",
    "Design",
    "Finance",
];

pub fn designations_for(department: &str) -> &'static [&'static str] {
    match department {
        "Engineering" => &[
            "Software Developer",
            "QA Tester",
            "DevOps Engineer",
            "Data Analyst",
            "AI/ML Engineer",
        ],
        "Product" => &["Product Manager"],
        "Marketing" => &["Marketing Specialist"],
        "Sales" => &["Sales Executive"],
        "HR" => &["HR Executive"],
        "Operations" => &["Operations Manager"],
        "Design" => &["UI/UX Designer"],
        "Finance" => &["Financial Analyst", "Accountant"],
        _ => &[],
    }
}

const FORM_ROLES: [&str; 2] = ["Employee", "Manager"];
const EMPLOYMENT_TYPES: [&str; 3] = ["Full-Time", "Intern", "Contractor"];
pub const DEFAULT_EMPLOYMENT_TYPE: &str = "Full-Time";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Select(&'static [&'static str]),
    /// Select whose options come from the chosen department.
    Designation,
    Date,
    Number,
    /// Integer from 1 (Poor) to 5 (Excellent).
    Rating,
    TextArea,
    Checkbox,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: Option<&'static str>,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required: None,
    }
}

const fn required(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    message: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required: Some(message),
    }
}

pub const HR_FIELDS: [FieldSpec; 30] = [
    required("employee_id", "Employee ID", FieldKind::Text, "Employee ID is required"),
    required("name", "Name", FieldKind::Text, "Name is required"),
    required("role", "Role", FieldKind::Select(&FORM_ROLES), "Role is required"),
    required("email", "Email", FieldKind::Email, "Email is required"),
    required("password", "Password", FieldKind::Password, "Password is required"),
    required(
        "department",
        "Department",
        FieldKind::Select(&DEPARTMENTS),
        "Department is required",
    ),
    required("designation", "Designation", FieldKind::Designation, "Designation is required"),
    field("reporting_manager", "Reporting Manager", FieldKind::Text),
    field(
        "employment_type",
        "Employment Type",
        FieldKind::Select(&EMPLOYMENT_TYPES),
    ),
    field("work_location", "Work Location", FieldKind::Text),
    required(
        "date_of_joining",
        "Date of Joining",
        FieldKind::Date,
        "Date of joining is required",
    ),
    field("total_experience", "Total Experience (Years)", FieldKind::Number),
    field("past_roles_held", "Past Roles Held", FieldKind::Text),
    field("internal_transfers", "Internal Transfers", FieldKind::Number),
    field("promotions_achieved", "Promotions Achieved", FieldKind::Number),
    field("certifications_completed", "Certifications Completed", FieldKind::Number),
    field("online_courses_attended", "Online Courses Attended", FieldKind::Number),
    field("training_hours_logged", "Training Hours Logged", FieldKind::Number),
    field("recognition_received", "Recognition Received", FieldKind::Number),
    field("special_recognitions", "Special Recognitions", FieldKind::Text),
    field("onboarding_satisfaction", "Onboarding Satisfaction", FieldKind::Rating),
    field("policy_compliance_x_y", "Policy Compliance", FieldKind::Rating),
    field("ethics_confidentiality", "Ethics & Confidentiality", FieldKind::Rating),
    field("compliance_adherence", "Compliance Adherence", FieldKind::Rating),
    field("hr_warnings", "HR Warnings", FieldKind::Number),
    field("hr_notes", "HR Notes", FieldKind::TextArea),
    field("hackathon_participation", "Hackathon Participation", FieldKind::Checkbox),
    field("mentorship_participation", "Mentorship Participation", FieldKind::Checkbox),
    field("innovation_submissions", "Innovation Submissions", FieldKind::Checkbox),
    field("knowledge_contributions", "Knowledge Contributions", FieldKind::Checkbox),
];

pub fn hr_field(name: &str) -> Option<&'static FieldSpec> {
    HR_FIELDS.iter().find(|f| f.name == name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    BasicInformation,
    CareerHistory,
    LearningAndDevelopment,
    ComplianceAndHrRecords,
    EngagementAndContributions,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::BasicInformation,
        Section::CareerHistory,
        Section::LearningAndDevelopment,
        Section::ComplianceAndHrRecords,
        Section::EngagementAndContributions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::BasicInformation => "Basic Information",
            Section::CareerHistory => "Career History",
            Section::LearningAndDevelopment => "Learning & Development",
            Section::ComplianceAndHrRecords => "Compliance & HR Records",
            Section::EngagementAndContributions => "Engagement & Contributions",
        }
    }

    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Section::BasicInformation => &[
                "employee_id",
                "name",
                "role",
                "email",
                "password",
                "department",
                "designation",
                "reporting_manager",
                "employment_type",
                "work_location",
                "date_of_joining",
            ],
            Section::CareerHistory => &[
                "total_experience",
                "past_roles_held",
                "internal_transfers",
                "promotions_achieved",
            ],
            Section::LearningAndDevelopment => &[
                "certifications_completed",
                "online_courses_attended",
                "training_hours_logged",
                "recognition_received",
                "special_recognitions",
            ],
            Section::ComplianceAndHrRecords => &[
                "onboarding_satisfaction",
                "policy_compliance_x_y",
                "ethics_confidentiality",
                "compliance_adherence",
                "hr_warnings",
                "hr_notes",
            ],
            Section::EngagementAndContributions => &[
                "hackathon_participation",
                "mentorship_participation",
                "innovation_submissions",
                "knowledge_contributions",
            ],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What the HR form is doing, and for which kind of record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    NewEmployee,
    EditEmployee,
    NewManager,
    EditManager,
}

const MANAGER_FIELDS: [&str; 5] = ["employee_id", "name", "role", "department", "date_of_joining"];

impl FormMode {
    pub fn new_for(role: Role) -> Self {
        match role {
            Role::Manager => FormMode::NewManager,
            _ => FormMode::NewEmployee,
        }
    }

    pub fn edit_for(role: Role) -> Self {
        match role {
            Role::Manager => FormMode::EditManager,
            _ => FormMode::EditEmployee,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, FormMode::NewEmployee | FormMode::NewManager)
    }

    pub fn role(self) -> Role {
        match self {
            FormMode::NewManager | FormMode::EditManager => Role::Manager,
            FormMode::NewEmployee | FormMode::EditEmployee => Role::Employee,
        }
    }

    /// Same create/edit state, different record role.
    pub fn with_role(self, role: Role) -> Self {
        if self.is_new() {
            FormMode::new_for(role)
        } else {
            FormMode::edit_for(role)
        }
    }

    pub fn sections(self) -> &'static [Section] {
        match self {
            FormMode::EditEmployee => &Section::ALL,
            FormMode::NewEmployee | FormMode::NewManager | FormMode::EditManager => {
                &[Section::BasicInformation]
            }
        }
    }

    /// Whether `field` is rendered (and therefore validated) in this mode.
    pub fn shows(self, field: &str) -> bool {
        let in_section = self
            .sections()
            .iter()
            .any(|s| s.field_names().contains(&field));
        if !in_section {
            return false;
        }
        let credentials = field == "email" || field == "password";
        match self {
            FormMode::NewManager => MANAGER_FIELDS.contains(&field) || credentials,
            FormMode::EditManager => MANAGER_FIELDS.contains(&field),
            FormMode::NewEmployee => true,
            FormMode::EditEmployee => !credentials,
        }
    }

    pub fn visible_fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        HR_FIELDS.iter().filter(move |f| self.shows(f.name))
    }

    pub fn title(self) -> &'static str {
        if self.is_new() { "New Entry" } else { "Edit Record" }
    }
}

pub fn id_prefix(role: Role) -> &'static str {
    match role {
        Role::Manager => "TL",
        _ => "EMP",
    }
}

/// Keeps a new-record ID in the `<prefix><up to 4 digits>` shape while it
/// is being typed: a foreign prefix resets to the bare prefix, non-digits
/// are dropped and extra digits truncated.
pub fn normalize_employee_id(raw: &str, prefix: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix(prefix) {
        Some(rest) => {
            let digits: String = rest.chars().filter(char::is_ascii_digit).take(4).collect();
            format!("{prefix}{digits}")
        }
        None => prefix.to_string(),
    }
}

fn employee_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceCell<Regex> = OnceCell::new();
    PATTERN
        .get_or_try_init(|| Regex::new(r"^(EMP|TL)(\d{4})$"))
        .ok()
}

pub fn validate_employee_id(id: &str, prefix: &str) -> Result<(), FieldError> {
    let matches = employee_id_pattern()
        .and_then(|re| re.captures(id))
        .is_some_and(|caps| &caps[1] == prefix);
    if matches {
        Ok(())
    } else {
        Err(FieldError::new(
            "employee_id",
            format!("ID must be '{prefix}' followed by exactly 4 digits."),
        ))
    }
}

/// Converts what the user typed into the JSON value stored for `kind`.
/// Blank input clears the field.
pub fn parse_input(name: &str, kind: FieldKind, raw: &str) -> Result<Value, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(match kind {
            FieldKind::Checkbox => Value::Bool(false),
            _ => Value::Null,
        });
    }
    match kind {
        FieldKind::Number => parse_number(raw)
            .ok_or_else(|| FieldError::new(name, "must be a number")),
        FieldKind::Rating => match raw.parse::<u8>() {
            Ok(n @ 1..=5) => Ok(Value::from(n)),
            _ => Err(FieldError::new(name, "must be a rating from 1 to 5")),
        },
        FieldKind::Checkbox => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
            _ => Err(FieldError::new(name, "must be yes or no")),
        },
        FieldKind::Date => normalize_date(raw)
            .map(Value::String)
            .ok_or_else(|| FieldError::new(name, "must be a date (YYYY-MM-DD)")),
        FieldKind::Select(options) => {
            if options.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(FieldError::new(
                    name,
                    format!("must be one of: {}", options.join(", ")),
                ))
            }
        }
        FieldKind::Text
        | FieldKind::Email
        | FieldKind::Password
        | FieldKind::Designation
        | FieldKind::TextArea => Ok(Value::String(raw.to_string())),
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Numbers, or strings holding one (older records store some as text).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_rating(n: f64) -> bool {
    n.fract() == 0.0 && (1.0..=5.0).contains(&n)
}

/// Checks an HR record against what `mode` shows.
pub fn validate_hr(mode: FormMode, record: &EmployeeRecord) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for spec in mode.visible_fields() {
        if let Some(message) = spec.required {
            if !record.has_value(spec.name) {
                errors.push(spec.name, message);
                continue;
            }
        }
        let Some(value) = record.get(spec.name) else {
            continue;
        };
        match (spec.kind, &value) {
            (_, Value::Null) => {}
            (FieldKind::Number, v) if numeric(v).is_none() => {
                errors.push(spec.name, "must be a number")
            }
            (FieldKind::Rating, v) if !numeric(v).is_some_and(is_rating) => {
                errors.push(spec.name, "must be a rating from 1 to 5")
            }
            (FieldKind::Date, Value::String(s)) if normalize_date(s).is_none() => {
                errors.push(spec.name, "must be a date (YYYY-MM-DD)")
            }
            _ => {}
        }
    }
    if mode.is_new() && record.has_value("employee_id") {
        if let Err(err) = validate_employee_id(&record.employee_id, id_prefix(mode.role())) {
            errors.0.push(err);
        }
    }
    if mode.shows("designation") {
        if let (Some(department), Some(designation)) = (&record.department, &record.designation) {
            if !designations_for(department).contains(&designation.as_str()) {
                errors.push(
                    "designation",
                    format!("'{designation}' is not a designation in {department}"),
                );
            }
        }
    }
    errors.into_result()
}

/// HR-owned fields shown read-only on the team-lead form.
pub const HR_READ_ONLY: [&str; 7] = [
    "employee_id",
    "name",
    "designation",
    "department",
    "employment_type",
    "work_location",
    "date_of_joining",
];

/// Computed by the backend; never entered by hand.
pub const LOGIC_DERIVED: [&str; 20] = [
    "adaptability_growth_score",
    "adherence_to_deadlines",
    "burnout_risk",
    "sentiment_score",
    "collaboration_communication_score",
    "communication_effectiveness",
    "effort_engagement_score",
    "historical_progress_score",
    "integrity_feedback_score",
    "leadership_score",
    "meeting_participation",
    "overall_weighted_score",
    "promotion_recommendation",
    "responsiveness",
    "retention_suggestion",
    "skill_development_score",
    "stress_load_tolerance",
    "task_ownership",
    "voluntary_contributions",
    "work_quality_consistency",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewCategory {
    pub title: &'static str,
    pub fields: &'static [&'static str],
}

pub const REVIEW_CATEGORIES: [ReviewCategory; 4] = [
    ReviewCategory {
        title: "Work & Participation",
        fields: &[
            "active_workdays",
            "avg_hours_logged_vs_team",
            "meeting_participation_rate",
            "task_completion_ratio",
        ],
    },
    ReviewCategory {
        title: "Soft Skills",
        fields: &[
            "adaptability_to_change",
            "conflict_resolution",
            "initiative_in_projects",
            "response_to_change",
        ],
    },
    ReviewCategory {
        title: "Feedback & Review",
        fields: &[
            "peer_review_rating",
            "peer_reviews",
            "peer_complaints",
            "manager_feedback",
            "manager_comments",
            "client_communication",
            "client_feedback",
            "stakeholder_ratings",
        ],
    },
    ReviewCategory {
        title: "Performance & Metrics",
        fields: &[
            "projects_handled",
            "score_delta",
            "tenure_in_current_role",
            "total_experience_score",
            "past_ratings_history",
            "report_submission_punctuality",
            "report_timeliness",
            "roadmap_adherence",
            "communication_effectiveness",
            "responsiveness",
        ],
    },
];

impl ReviewCategory {
    /// Fields a team lead may edit in this category.
    pub fn editable(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .copied()
            .filter(|f| !LOGIC_DERIVED.contains(f) && !HR_READ_ONLY.contains(f))
    }
}

pub fn role_kpis(designation: &str) -> &'static [&'static str] {
    match designation {
        "Software Developer" => &[
            "code_commits",
            "bug_fix_count",
            "sprint_velocity",
            "deployment_frequency",
            "code_quality",
        ],
        "QA Tester" => &[
            "test_cases_executed",
            "bugs_reported",
            "automation_coverage",
            "regression_pass_rate",
            "defect_leakage_rate",
        ],
        "HR Executive" => &[
            "positions_filled",
            "onboarding_satisfaction",
            "training_sessions_delivered",
            "employee_engagement_score",
            "policy_compliance",
        ],
        "Sales Executive" => &[
            "conversion_rate",
            "revenue_generated",
            "upsell_opportunities_closed",
            "client_retention_rate",
            "crm_followup_consistency",
        ],
        "Marketing Specialist" => &[
            "campaign_reach",
            "leads_generated",
            "social_engagement_rate",
            "content_delivery_timeliness",
        ],
        "Product Manager" => &[
            "feature_delivery_timeliness",
            "roadmap_adherence",
            "cross_team_coordination",
            "sprint_success_rate",
            "stakeholder_ratings",
        ],
        "UI/UX Designer" => &[
            "design_delivery_timeliness",
            "usability_test_score",
            "rework_count",
            "visual_consistency",
            "accessibility_score",
        ],
        "DevOps Engineer" => &[
            "uptime_percentage",
            "mttr",
            "successful_deployments",
            "cicd_pipeline_efficiency",
            "incident_response_time",
        ],
        "Data Analyst" => &[
            "reports_delivered",
            "insight_accuracy",
            "query_efficiency",
            "dashboard_usage_rate",
            "data_quality_score",
        ],
        "AI/ML Engineer" => &[
            "model_accuracy",
            "feature_engineering",
            "experiment_reproducibility",
            "model_deployment_count",
            "tech_debt_reduction",
        ],
        "Financial Analyst" => &[
            "budget_forecasting_accuracy",
            "variance_analysis_score",
            "report_timeliness",
            "cost_saving_suggestions",
            "financial_modeling_score",
        ],
        "Accountant" => &[
            "ledger_accuracy",
            "compliance_adherence",
            "invoice_processing_efficiency",
            "audit_readiness_score",
            "report_submission_punctuality",
        ],
        _ => &[],
    }
}

/// Every field a team lead may write for an employee with `designation`,
/// category fields first, then KPIs not already listed.
pub fn review_fields(designation: Option<&str>) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = REVIEW_CATEGORIES
        .iter()
        .flat_map(ReviewCategory::editable)
        .collect();
    for kpi in designation.map(role_kpis).unwrap_or(&[]) {
        if !fields.contains(kpi) {
            fields.push(kpi);
        }
    }
    fields
}

pub fn review_field_kind(name: &str) -> FieldKind {
    match name {
        "meeting_participation_rate"
        | "adaptability_to_change"
        | "conflict_resolution"
        | "initiative_in_projects"
        | "response_to_change"
        | "peer_review_rating"
        | "manager_feedback"
        | "client_communication"
        | "stakeholder_ratings"
        | "report_submission_punctuality"
        | "report_timeliness"
        | "roadmap_adherence"
        | "communication_effectiveness"
        | "responsiveness" => FieldKind::Rating,
        "peer_reviews" | "manager_comments" | "client_feedback" => FieldKind::TextArea,
        "date_of_joining" => FieldKind::Date,
        _ if HR_READ_ONLY.contains(&name) || name == "reporting_manager" => FieldKind::Text,
        _ => FieldKind::Number,
    }
}

/// Checks the team-lead fields present in `record`. Every field is optional;
/// what is filled must match its kind.
pub fn validate_review(record: &EmployeeRecord) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for name in review_fields(record.designation.as_deref()) {
        let Some(value) = record.get(name).filter(|v| !v.is_null()) else {
            continue;
        };
        match review_field_kind(name) {
            FieldKind::Number if numeric(&value).is_none() => errors.push(name, "must be a number"),
            FieldKind::Rating if !numeric(&value).is_some_and(is_rating) => {
                errors.push(name, "must be a rating from 1 to 5")
            }
            _ => {}
        }
    }
    errors.into_result()
}

/// Display label for any record field.
pub fn label_for(name: &str) -> String {
    if let Some(spec) = hr_field(name) {
        return spec.label.to_string();
    }
    match name {
        "avg_hours_logged_vs_team" => "Avg Hours Logged vs Team".to_string(),
        "mttr" => "MTTR".to_string(),
        "cicd_pipeline_efficiency" => "CI/CD Pipeline Efficiency".to_string(),
        "crm_followup_consistency" => "CRM Follow-up Consistency".to_string(),
        other => labelize(other),
    }
}

/// `code_commits` -> `Code Commits`.
pub fn labelize(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalises the date shapes the backend emits to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok())?;
    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sections_by_mode() {
        assert_eq!(FormMode::NewEmployee.sections(), &[Section::BasicInformation]);
        assert_eq!(FormMode::NewManager.sections(), &[Section::BasicInformation]);
        assert_eq!(FormMode::EditManager.sections(), &[Section::BasicInformation]);
        assert_eq!(FormMode::EditEmployee.sections().len(), 5);
    }

    #[test]
    fn manager_forms_hide_employee_fields() {
        assert!(FormMode::NewManager.shows("password"));
        assert!(!FormMode::NewManager.shows("designation"));
        assert!(!FormMode::EditManager.shows("email"));
        assert!(FormMode::EditManager.shows("date_of_joining"));
        assert!(!FormMode::EditEmployee.shows("password"));
        assert!(FormMode::EditEmployee.shows("hr_notes"));
        assert!(!FormMode::NewEmployee.shows("hr_notes"));
    }

    #[test]
    fn id_prefix_follows_role() {
        assert_eq!(id_prefix(Role::Manager), "TL");
        assert_eq!(id_prefix(Role::Employee), "EMP");
        assert_eq!(id_prefix(Role::Hr), "EMP");
    }

    #[test]
    fn id_normalisation() {
        assert_eq!(normalize_employee_id("EMP12a345", "EMP"), "EMP1234");
        assert_eq!(normalize_employee_id("TL0001", "EMP"), "EMP");
        assert_eq!(normalize_employee_id("", "TL"), "TL");
    }

    #[test]
    fn id_validation_rejects_extra_digits() {
        assert!(validate_employee_id("EMP0042", "EMP").is_ok());
        assert!(validate_employee_id("TL0042", "TL").is_ok());
        let err = validate_employee_id("EMP00421", "EMP").unwrap_err();
        assert_eq!(err.message, "ID must be 'EMP' followed by exactly 4 digits.");
        assert!(validate_employee_id("TL0042", "EMP").is_err());
        assert!(validate_employee_id("EMP042", "EMP").is_err());
    }

    #[test]
    fn validate_new_employee_reports_each_missing_field() {
        let mut record = EmployeeRecord::default();
        record.set("employee_id", json!("EMP1"));
        record.set("name", json!("Asha"));
        let errors = validate_hr(FormMode::NewEmployee, &record).unwrap_err();
        assert_eq!(
            errors.for_field("email").map(|e| e.message.as_str()),
            Some("Email is required")
        );
        assert!(errors.for_field("password").is_some());
        assert!(errors.for_field("employee_id").is_some());
        assert!(errors.for_field("reporting_manager").is_none());
    }

    #[test]
    fn validate_accepts_complete_manager() {
        let mut record = EmployeeRecord::default();
        for (k, v) in [
            ("employee_id", "TL0007"),
            ("name", "Meera"),
            ("role", "Manager"),
            ("email", "meera@example.com"),
            ("password", "secret"),
            ("department", "Engineering"),
            ("date_of_joining", "2021-04-01"),
        ] {
            record.set(k, json!(v));
        }
        assert_eq!(validate_hr(FormMode::NewManager, &record), Ok(()));
    }

    #[test]
    fn designation_must_match_department() {
        let mut record = EmployeeRecord::default();
        record.set("department", json!("Finance"));
        record.set("designation", json!("QA Tester"));
        let errors = validate_hr(FormMode::EditEmployee, &record).unwrap_err();
        assert!(errors.for_field("designation").is_some());
    }

    #[test]
    fn input_parsing() {
        assert_eq!(parse_input("x", FieldKind::Number, "12").unwrap(), json!(12));
        assert_eq!(parse_input("x", FieldKind::Number, "1.5").unwrap(), json!(1.5));
        assert!(parse_input("x", FieldKind::Number, "abc").is_err());
        assert!(parse_input("x", FieldKind::Rating, "6").is_err());
        assert_eq!(parse_input("x", FieldKind::Checkbox, "yes").unwrap(), json!(true));
        assert_eq!(parse_input("x", FieldKind::Text, "  ").unwrap(), Value::Null);
        assert!(parse_input("x", FieldKind::Select(&EMPLOYMENT_TYPES), "Temp").is_err());
    }

    #[test]
    fn review_fields_skip_derived_and_add_kpis() {
        let fields = review_fields(Some("Product Manager"));
        assert!(fields.contains(&"tenure_in_current_role"));
        assert!(!fields.contains(&"responsiveness"));
        assert!(!fields.contains(&"communication_effectiveness"));
        assert!(fields.contains(&"feature_delivery_timeliness"));
        assert_eq!(fields.iter().filter(|f| **f == "roadmap_adherence").count(), 1);
        assert!(review_fields(Some("Unknown")).iter().all(|f| !f.contains("code")));
    }

    #[test]
    fn review_validation_checks_filled_fields_only() {
        let mut record = EmployeeRecord::default();
        assert!(validate_review(&record).is_ok());
        record.set("active_workdays", json!("21"));
        record.set("peer_review_rating", json!(7));
        record.set("manager_comments", json!("Strong quarter"));
        let errors = validate_review(&record).unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert!(errors.for_field("peer_review_rating").is_some());
    }

    #[test]
    fn labels() {
        assert_eq!(labelize("code_commits"), "Code Commits");
        assert_eq!(label_for("policy_compliance_x_y"), "Policy Compliance");
        assert_eq!(label_for("mttr"), "MTTR");
    }

    #[test]
    fn dates_normalise_or_vanish() {
        assert_eq!(normalize_date("2023-05-09").as_deref(), Some("2023-05-09"));
        assert_eq!(
            normalize_date("Tue, 09 May 2023 00:00:00 GMT").as_deref(),
            Some("2023-05-09")
        );
        assert_eq!(normalize_date("2023-05-09T10:00:00").as_deref(), Some("2023-05-09"));
        assert_eq!(normalize_date("05/09/2023").as_deref(), Some("2023-05-09"));
        assert_eq!(normalize_date("soon"), None);
    }
}
