//! Team-lead review of a direct report's evaluation inputs.

use std::fmt;

use entity::{EmployeeRecord, employees::EmployeeSummary};
use platform_api::{ApiError, ApiResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    context::ViewContext,
    error::{ActionError, ActionResult},
    forms::{
        FieldError, FieldKind, HR_READ_ONLY, REVIEW_CATEGORIES, ValidationErrors, label_for,
        normalize_date, parse_input, review_field_kind, review_fields, role_kpis,
        validate_review,
    },
    generation::{Generation, RequestGenerations},
    view_state::ViewState,
};

const TOKEN_MISSING: &str = "Authentication token not found. Please log in again.";

#[derive(Clone, Debug, Default)]
pub struct TeamEntryView {
    team: ViewState<Vec<EmployeeSummary>>,
    managers: Vec<String>,
    query: String,
    selected: Option<EmployeeSummary>,
    record: Option<EmployeeRecord>,
    errors: ValidationErrors,
    generations: RequestGenerations,
}

fn same_person(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl TeamEntryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(&self) -> &ViewState<Vec<EmployeeSummary>> {
        &self.team
    }

    pub fn record(&self) -> Option<&EmployeeRecord> {
        self.record.as_ref()
    }

    pub fn selected(&self) -> Option<&EmployeeSummary> {
        self.selected.as_ref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Loads the signed-in lead's direct reports and the manager list. The
    /// manager list is optional.
    pub async fn load(&mut self, ctx: &ViewContext) {
        self.team = ViewState::Loading;
        let token = ctx.token();
        let lead = ctx.session.user().map(|u| u.name).unwrap_or_default();
        let (employees, managers) = tokio::join!(
            ctx.api.employee_summaries(token.as_deref()),
            ctx.api.managers(token.as_deref()),
        );
        self.managers = managers.unwrap_or_else(|err| {
            warn!(error = %err, "could not fetch managers");
            Vec::new()
        });
        self.team = match employees {
            Ok(employees) => ViewState::Success(
                employees
                    .into_iter()
                    .filter(|e| {
                        e.reporting_manager
                            .as_deref()
                            .is_some_and(|m| same_person(m, &lead))
                    })
                    .collect(),
            ),
            Err(err) => {
                let fallback = super::fallback_for(
                    &err,
                    "Could not load employee list.",
                    "Server error while fetching employees.",
                );
                ViewState::Error(ctx.fail(err, fallback).to_string())
            }
        };
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn matches(&self) -> Vec<&EmployeeSummary> {
        let query = self.query.trim();
        let needle = query.to_lowercase();
        self.team
            .data()
            .map(|team| {
                team.iter()
                    .filter(|e| {
                        query.is_empty()
                            || e.name.to_lowercase().contains(&needle)
                            || e.employee_id.contains(query)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Starts a new selection. Anything still in flight for an earlier one
    /// is dropped when it lands.
    pub fn begin_select(&mut self, employee: EmployeeSummary) -> Generation {
        self.selected = Some(employee);
        self.record = None;
        self.errors = ValidationErrors::default();
        self.generations.begin()
    }

    /// Applies the record fetched for `generation`. Returns `Ok(false)` when
    /// a newer selection superseded it.
    pub fn finish_select(
        &mut self,
        ctx: &ViewContext,
        generation: Generation,
        fetched: ApiResult<EmployeeRecord>,
    ) -> ActionResult<bool> {
        if !self.generations.accept(generation, "team-lead record") {
            return Ok(false);
        }
        let mut record = fetched.map_err(|err| ctx.fail(err, "Employee not found"))?;
        record.date_of_joining = record.date_of_joining.as_deref().and_then(normalize_date);
        self.record = Some(record);
        ctx.notifier.success("Employee data loaded.");
        Ok(true)
    }

    /// Selects a team member by ID or name and loads their record.
    pub async fn select(&mut self, ctx: &ViewContext, id_or_name: &str) -> ActionResult<bool> {
        let key = id_or_name.trim();
        let found = self.team.data().and_then(|team| {
            team.iter()
                .find(|e| e.employee_id == key || same_person(&e.name, key))
                .cloned()
        });
        let Some(employee) = found else {
            return Err(ctx.refuse("Nothing found."));
        };
        let Some(token) = ctx.token() else {
            ctx.notifier.banner(TOKEN_MISSING);
            return Err(ActionError::Refused(TOKEN_MISSING.to_string()));
        };
        let employee_id = employee.employee_id.clone();
        let generation = self.begin_select(employee);
        let fetched = ctx.api.employee_record(Some(&token), &employee_id).await;
        self.finish_select(ctx, generation, fetched)
    }

    /// Fields the lead may edit for the loaded employee.
    pub fn editable_fields(&self) -> Vec<&'static str> {
        review_fields(self.record.as_ref().and_then(|r| r.designation.as_deref()))
    }

    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FieldError> {
        let editable = self.editable_fields();
        let Some(record) = self.record.as_mut() else {
            return Err(FieldError::new(name, "no employee is loaded"));
        };
        if !editable.contains(&name) {
            return Err(FieldError::new(name, "is not editable by a team lead"));
        }
        let value = parse_input(name, review_field_kind(name), raw)?;
        record.set(name, value);
        Ok(())
    }

    pub async fn submit(&mut self, ctx: &ViewContext) -> ActionResult<()> {
        let Some(record) = self.record.as_ref() else {
            return Err(ctx.refuse("Please select an employee first."));
        };
        if let Err(errors) = validate_review(record) {
            self.errors = errors.clone();
            return Err(ctx.invalid(errors));
        }
        let token = ctx.token();
        let saved = ctx
            .api
            .save_team_lead_entry(token.as_deref(), &record.employee_id, record)
            .await;
        if let Err(err) = saved {
            let message = match &err {
                ApiError::Transport(inner) => format!("Network Error: {inner}"),
                other => format!("Error: {}", other.user_message("the entry was not saved")),
            };
            if err.is_auth() {
                ctx.notifier.banner(message.clone());
            } else {
                ctx.notifier.error(message.clone());
            }
            return Err(ActionError::Api {
                message,
                source: err,
            });
        }
        info!(employee = %record.employee_id, "team-lead entry saved");
        ctx.notifier.success("TL Entry Saved Successfully!");
        self.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.record = None;
        self.errors = ValidationErrors::default();
        self.query.clear();
    }
}

fn shown(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

impl TeamEntryView {
    fn field_row(&self, f: &mut fmt::Formatter<'_>, record: &EmployeeRecord, name: &str) -> fmt::Result {
        let mut value = shown(record.get(name));
        if review_field_kind(name) == FieldKind::Rating && !value.is_empty() {
            value.push_str(" / 5");
        }
        writeln!(f, "  {:<32} {value}", label_for(name))?;
        if let Some(error) = self.errors.for_field(name) {
            writeln!(f, "    ! {}", error.message)?;
        }
        Ok(())
    }
}

impl fmt::Display for TeamEntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Team Lead Entry")?;
        match &self.team {
            ViewState::Loading => return writeln!(f, "  Loading your team..."),
            ViewState::Error(message) => return writeln!(f, "  {message}"),
            ViewState::Success(_) => {}
        }
        let Some(record) = &self.record else {
            let matches = self.matches();
            if matches.is_empty() {
                return writeln!(f, "  Nothing found.");
            }
            for employee in matches {
                writeln!(f, "  {} ({})", employee.name, employee.employee_id)?;
            }
            return Ok(());
        };

        writeln!(f, "\nEmployee Details (read-only)")?;
        for name in HR_READ_ONLY {
            writeln!(f, "  {:<32} {}", label_for(name), shown(record.get(name)))?;
        }
        let manager = record.reporting_manager.as_deref().unwrap_or_default();
        let unlisted = !self.managers.is_empty()
            && !manager.is_empty()
            && !self.managers.iter().any(|m| same_person(m, manager));
        let note = if unlisted { " (not a listed manager)" } else { "" };
        writeln!(f, "  {:<32} {manager}{note}", label_for("reporting_manager"))?;

        for category in &REVIEW_CATEGORIES {
            writeln!(f, "\n{}", category.title)?;
            for name in category.editable() {
                self.field_row(f, record, name)?;
            }
        }
        let kpis: Vec<_> = record
            .designation
            .as_deref()
            .map(role_kpis)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|kpi| !REVIEW_CATEGORIES.iter().any(|c| c.fields.contains(kpi)))
            .collect();
        if !kpis.is_empty() {
            writeln!(f, "\nRole KPIs")?;
            for name in kpis {
                self.field_row(f, record, name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::offline;

    fn summary(id: &str, name: &str) -> EmployeeSummary {
        EmployeeSummary {
            employee_id: id.into(),
            name: name.into(),
            reporting_manager: Some("Ravi".into()),
        }
    }

    fn record(id: &str) -> EmployeeRecord {
        let mut record = EmployeeRecord::default();
        record.set("employee_id", json!(id));
        record.set("designation", json!("QA Tester"));
        record.set("date_of_joining", json!("Tue, 09 May 2023 00:00:00 GMT"));
        record
    }

    #[test]
    fn stale_selection_is_dropped() {
        let ctx = offline();
        let mut view = TeamEntryView::new();
        let first = view.begin_select(summary("EMP0001", "Asha"));
        let second = view.begin_select(summary("EMP0002", "Meena"));

        assert!(view.finish_select(&ctx, second, Ok(record("EMP0002"))).unwrap());
        assert!(!view.finish_select(&ctx, first, Ok(record("EMP0001"))).unwrap());
        let loaded = view.record().unwrap();
        assert_eq!(loaded.employee_id, "EMP0002");
        assert_eq!(loaded.date_of_joining.as_deref(), Some("2023-05-09"));
        assert_eq!(view.selected().map(|s| s.name.as_str()), Some("Meena"));
    }

    #[test]
    fn only_review_fields_are_editable() {
        let ctx = offline();
        let mut view = TeamEntryView::new();
        assert!(view.set_field("active_workdays", "20").is_err());
        let generation = view.begin_select(summary("EMP0001", "Asha"));
        view.finish_select(&ctx, generation, Ok(record("EMP0001"))).unwrap();
        view.set_field("active_workdays", "20").unwrap();
        assert!(view.set_field("name", "Someone").is_err());
        assert!(view.set_field("responsiveness", "4").is_err());
        assert!(view.set_field("peer_review_rating", "9").is_err());
        assert_eq!(view.record().unwrap().get("active_workdays"), Some(json!(20)));
    }

    #[tokio::test]
    async fn unknown_member_is_refused() {
        let ctx = offline();
        let mut view = TeamEntryView {
            team: ViewState::Success(vec![summary("EMP0001", "Asha")]),
            ..TeamEntryView::default()
        };
        let err = view.select(&ctx, "EMP0404").await.unwrap_err();
        assert_eq!(err.to_string(), "Nothing found.");
        let err = view.select(&ctx, "asha").await.unwrap_err();
        assert_eq!(err.to_string(), TOKEN_MISSING);
    }
}
