//! HR manual entry: create, load, edit and delete employee records.

use std::fmt;

use entity::{EmployeeRecord, Role, employees::EmployeeSummary};
use platform_api::ApiError;
use serde_json::Value;
use tracing::info;

use super::fallback_for;
use crate::{
    context::ViewContext,
    error::{ActionError, ActionResult},
    forms::{
        DEFAULT_EMPLOYMENT_TYPE, FieldError, FieldKind, FormMode, ValidationErrors, hr_field,
        id_prefix, normalize_date, normalize_employee_id, parse_input, validate_hr,
    },
    view_state::ViewState,
};

const AUTH_ERROR: &str = "Authentication error. Please log in again.";
const SERVER_ERROR: &str = "A server error occurred. Please try again later.";

fn blank_record() -> EmployeeRecord {
    EmployeeRecord {
        employee_id: id_prefix(Role::Employee).to_string(),
        role: Some(Role::Employee),
        employment_type: Some(DEFAULT_EMPLOYMENT_TYPE.to_string()),
        ..EmployeeRecord::default()
    }
}

#[derive(Clone, Debug)]
pub struct ManualEntryView {
    employees: ViewState<Vec<EmployeeSummary>>,
    query: String,
    selected: Option<EmployeeSummary>,
    mode: FormMode,
    record: EmployeeRecord,
    errors: ValidationErrors,
    saving: bool,
}

impl Default for ManualEntryView {
    fn default() -> Self {
        Self {
            employees: ViewState::Loading,
            query: String::new(),
            selected: None,
            mode: FormMode::NewEmployee,
            record: blank_record(),
            errors: ValidationErrors::default(),
            saving: false,
        }
    }
}

impl ManualEntryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn record(&self) -> &EmployeeRecord {
        &self.record
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn employees(&self) -> &ViewState<Vec<EmployeeSummary>> {
        &self.employees
    }

    /// Refreshes the picker list.
    pub async fn load_list(&mut self, ctx: &ViewContext) {
        let token = ctx.token();
        self.employees = match ctx.api.employee_summaries(token.as_deref()).await {
            Ok(employees) => ViewState::Success(employees),
            Err(err) => {
                let fallback = fallback_for(
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

    /// Picker entries whose name contains the query (any case) or whose ID
    /// contains it verbatim.
    pub fn matches(&self) -> Vec<&EmployeeSummary> {
        let query = self.query.trim();
        let needle = query.to_lowercase();
        self.employees
            .data()
            .map(|employees| {
                employees
                    .iter()
                    .filter(|e| {
                        query.is_empty()
                            || e.name.to_lowercase().contains(&needle)
                            || e.employee_id.contains(query)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Picks a list entry by exact ID, or by name when that is unambiguous.
    pub fn select(&mut self, id_or_name: &str) -> bool {
        let key = id_or_name.trim();
        let found = self.employees.data().and_then(|employees| {
            employees
                .iter()
                .find(|e| e.employee_id == key)
                .or_else(|| {
                    let mut named = employees.iter().filter(|e| e.name.eq_ignore_ascii_case(key));
                    match (named.next(), named.next()) {
                        (Some(one), None) => Some(one),
                        _ => None,
                    }
                })
                .cloned()
        });
        let picked = found.is_some();
        self.selected = found;
        picked
    }

    /// Loads the picked employee into the form in edit mode.
    pub async fn load_selected(&mut self, ctx: &ViewContext) -> ActionResult<()> {
        let Some(selected) = self.selected.clone() else {
            return Err(ctx.refuse("Please select an employee to load."));
        };
        let Some(token) = ctx.token() else {
            ctx.notifier.banner(AUTH_ERROR);
            return Err(ActionError::Refused(AUTH_ERROR.to_string()));
        };
        match ctx.api.employee_record(Some(&token), &selected.employee_id).await {
            Ok(mut record) => {
                record.date_of_joining = record.date_of_joining.as_deref().and_then(normalize_date);
                self.mode = FormMode::edit_for(record.role());
                self.record = record;
                self.errors = ValidationErrors::default();
                ctx.notifier.success("Employee record loaded successfully.");
                Ok(())
            }
            Err(err) => {
                let unreachable = matches!(err, ApiError::Transport(_));
                let fallback = fallback_for(&err, "Employee not found.", SERVER_ERROR);
                let failure = ctx.fail(err, fallback);
                if !unreachable {
                    self.clear();
                }
                Err(failure)
            }
        }
    }

    /// Writes one field from user input and applies its knock-on effects.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FieldError> {
        let spec = hr_field(name)
            .ok_or_else(|| FieldError::new(name, "is not a field of this form"))?;
        if !self.mode.shows(name) {
            return Err(FieldError::new(name, "is not shown for this record"));
        }
        if name == "employee_id" {
            if !self.mode.is_new() {
                return Err(FieldError::new(name, "cannot be changed on an existing record"));
            }
            let prefix = id_prefix(self.mode.role());
            self.record.employee_id = normalize_employee_id(raw, prefix);
            return Ok(());
        }
        let value = parse_input(name, spec.kind, raw)?;
        self.record.set(name, value);
        match name {
            "role" => {
                let role = self.record.role();
                self.mode = self.mode.with_role(role);
                if role == Role::Manager {
                    self.record.designation = None;
                }
                let prefix = id_prefix(role);
                if self.mode.is_new() && !self.record.employee_id.starts_with(prefix) {
                    self.record.employee_id = prefix.to_string();
                }
            }
            "department" => self.record.designation = None,
            _ => {}
        }
        Ok(())
    }

    /// Creates or updates the record, depending on the mode.
    pub async fn submit(&mut self, ctx: &ViewContext) -> ActionResult<String> {
        if let Err(errors) = validate_hr(self.mode, &self.record) {
            self.errors = errors.clone();
            return Err(ctx.invalid(errors));
        }
        self.errors = ValidationErrors::default();
        let token = ctx.token();
        let creating = self.mode.is_new();
        self.saving = true;
        let response = if creating {
            ctx.api.create_employee(token.as_deref(), &self.record).await
        } else {
            ctx.api
                .update_employee(token.as_deref(), &self.record.employee_id, &self.record)
                .await
        };
        self.saving = false;
        let response = response.map_err(|err| {
            let fallback = fallback_for(&err, "An unknown error occurred.", SERVER_ERROR);
            ctx.fail(err, fallback)
        })?;
        let message = response.message.unwrap_or_else(|| {
            if creating {
                "Record created successfully!".to_string()
            } else {
                "Record updated successfully!".to_string()
            }
        });
        info!(employee = %self.record.employee_id, creating, "employee record saved");
        ctx.notifier.success(message.clone());
        if creating {
            self.load_list(ctx).await;
        }
        self.clear();
        Ok(message)
    }

    /// Permanently deletes the loaded record. Without `confirmed` nothing is
    /// sent and the confirmation prompt comes back as the error.
    pub async fn delete(&mut self, ctx: &ViewContext, confirmed: bool) -> ActionResult<String> {
        let employee_id = self.record.employee_id.trim().to_string();
        if self.mode.is_new() || employee_id.is_empty() {
            return Err(ctx.refuse("Cannot delete. No employee is loaded."));
        }
        if !confirmed {
            return Err(ActionError::ConfirmationRequired(format!(
                "Are you sure you want to permanently delete employee {employee_id}? This action cannot be undone."
            )));
        }
        let Some(token) = ctx.token() else {
            ctx.notifier.banner(AUTH_ERROR);
            return Err(ActionError::Refused(AUTH_ERROR.to_string()));
        };
        let response = ctx
            .api
            .delete_employee(Some(&token), &employee_id)
            .await
            .map_err(|err| {
                let fallback = fallback_for(
                    &err,
                    "An error occurred during deletion.",
                    "A server error occurred. Please try again.",
                );
                ctx.fail(err, fallback)
            })?;
        let message = response
            .message
            .unwrap_or_else(|| format!("Employee {employee_id} deleted."));
        info!(employee = %employee_id, "employee record deleted");
        ctx.notifier.success(message.clone());
        self.clear();
        self.load_list(ctx).await;
        Ok(message)
    }

    /// Back to an empty new-employee form.
    pub fn clear(&mut self) {
        self.mode = FormMode::NewEmployee;
        self.record = blank_record();
        self.errors = ValidationErrors::default();
        self.selected = None;
        self.query.clear();
    }
}

fn display_value(kind: FieldKind, value: Option<Value>) -> String {
    match (kind, value) {
        (_, None | Some(Value::Null)) => String::new(),
        (FieldKind::Password, Some(_)) => "********".to_string(),
        (FieldKind::Checkbox, Some(Value::Bool(b))) => String::from(if b { "yes" } else { "no" }),
        (_, Some(Value::String(s))) => s,
        (_, Some(other)) => other.to_string(),
    }
}

impl fmt::Display for ManualEntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Manual Entry: {}", self.mode.title())?;
        match &self.employees {
            ViewState::Loading => writeln!(f, "  Loading employees...")?,
            ViewState::Error(message) => writeln!(f, "  {message}")?,
            ViewState::Success(_) if !self.query.trim().is_empty() => {
                let matches = self.matches();
                if matches.is_empty() {
                    writeln!(f, "  Nothing found.")?;
                }
                for employee in matches {
                    writeln!(f, "  {} ({})", employee.name, employee.employee_id)?;
                }
            }
            ViewState::Success(_) => {}
        }
        if let Some(selected) = &self.selected {
            writeln!(f, "  Selected: {} ({})", selected.name, selected.employee_id)?;
        }
        for section in self.mode.sections() {
            writeln!(f, "\n{section}")?;
            for spec in self.mode.visible_fields() {
                if !section.field_names().contains(&spec.name) {
                    continue;
                }
                let marker = if spec.required.is_some() { "*" } else { " " };
                let value = display_value(spec.kind, self.record.get(spec.name));
                writeln!(f, "  {marker}{:<28} {value}", spec.label)?;
                if let Some(error) = self.errors.for_field(spec.name) {
                    writeln!(f, "    ! {}", error.message)?;
                }
            }
        }
        if self.saving {
            writeln!(f, "\nSaving...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::offline;

    fn listed() -> ManualEntryView {
        ManualEntryView {
            employees: ViewState::Success(vec![
                EmployeeSummary {
                    employee_id: "EMP0001".into(),
                    name: "Asha Rao".into(),
                    reporting_manager: None,
                },
                EmployeeSummary {
                    employee_id: "TL0001".into(),
                    name: "Ravi Kumar".into(),
                    reporting_manager: None,
                },
            ]),
            ..ManualEntryView::default()
        }
    }

    #[test]
    fn picker_searches_names_and_ids() {
        let mut view = listed();
        view.set_query("rao");
        assert_eq!(view.matches().len(), 1);
        view.set_query("TL00");
        assert_eq!(view.matches()[0].name, "Ravi Kumar");
        view.set_query("zzz");
        assert!(view.to_string().contains("Nothing found."));
        assert!(view.select("asha rao"));
        assert!(!view.select("EMP9999"));
    }

    #[test]
    fn role_change_resets_prefix_and_designation() {
        let mut view = ManualEntryView::new();
        view.set_field("employee_id", "EMP12345").unwrap();
        assert_eq!(view.record().employee_id, "EMP1234");
        view.set_field("department", "Engineering").unwrap();
        view.set_field("designation", "Software Developer").unwrap();
        view.set_field("role", "Manager").unwrap();
        assert_eq!(view.mode(), FormMode::NewManager);
        assert_eq!(view.record().employee_id, "TL");
        assert_eq!(view.record().designation, None);
    }

    #[test]
    fn department_change_clears_designation() {
        let mut view = ManualEntryView::new();
        view.set_field("department", "Engineering").unwrap();
        view.set_field("designation", "Software Developer").unwrap();
        view.set_field("department", "Sales").unwrap();
        assert_eq!(view.record().designation, None);
    }

    #[test]
    fn hidden_fields_are_rejected() {
        let mut view = ManualEntryView::new();
        assert!(view.set_field("total_experience", "3").is_err());
        assert!(view.set_field("nonsense", "3").is_err());
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let ctx = offline();
        let mut view = ManualEntryView::new();
        view.set_field("name", "Asha").unwrap();
        let err = view.submit(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
        assert!(view.errors().for_field("email").is_some());
        assert!(view.errors().for_field("employee_id").is_some());
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn delete_needs_a_loaded_record_and_confirmation() {
        let ctx = offline();
        let mut view = ManualEntryView::new();
        let err = view.delete(&ctx, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete. No employee is loaded.");

        view.mode = FormMode::EditEmployee;
        view.record.set("employee_id", json!("EMP0001"));
        let err = view.delete(&ctx, false).await.unwrap_err();
        assert!(matches!(err, ActionError::ConfirmationRequired(ref m) if m.contains("EMP0001")));
    }

    #[tokio::test]
    async fn load_requires_a_selection() {
        let ctx = offline();
        let mut view = listed();
        let err = view.load_selected(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select an employee to load.");
        view.select("EMP0001");
        let err = view.load_selected(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), AUTH_ERROR);
    }
}
