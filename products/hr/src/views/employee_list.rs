use std::fmt;

use entity::{ReportResult, Role, employees::PersonnelEntry};

use super::{name_matches, report, status_label};
use crate::{context::ViewContext, error::ActionResult, view_state::ViewState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoleFilter {
    #[default]
    All,
    Employees,
    TeamLeaders,
}

impl RoleFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(RoleFilter::All),
            "employees" | "employee" => Some(RoleFilter::Employees),
            "team-leaders" | "team leaders" | "managers" | "manager" => {
                Some(RoleFilter::TeamLeaders)
            }
            _ => None,
        }
    }

    pub fn admits(self, role: Role) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Employees => role != Role::Manager,
            RoleFilter::TeamLeaders => role == Role::Manager,
        }
    }
}

/// HR directory of every employee and team lead.
#[derive(Clone, Debug, Default)]
pub struct EmployeeListView {
    state: ViewState<Vec<PersonnelEntry>>,
    filter: RoleFilter,
    query: String,
    generating: Option<String>,
}

impl EmployeeListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<Vec<PersonnelEntry>> {
        &self.state
    }

    pub fn generating(&self) -> Option<&str> {
        self.generating.as_deref()
    }

    pub fn set_filter(&mut self, filter: RoleFilter) {
        self.filter = filter;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        self.state = match ctx.api.all_personnel(token.as_deref()).await {
            Ok(users) => ViewState::Success(users),
            Err(err) => {
                ViewState::Error(ctx.fail(err, "Failed to fetch the employee list").to_string())
            }
        };
    }

    pub fn filtered(&self) -> Vec<&PersonnelEntry> {
        self.state
            .data()
            .map(|users| {
                users
                    .iter()
                    .filter(|u| self.filter.admits(u.role()))
                    .filter(|u| name_matches(&u.name, &self.query))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Runs a prediction for one listed person.
    pub async fn generate_report(
        &mut self,
        ctx: &ViewContext,
        employee_name: &str,
    ) -> ActionResult<ReportResult> {
        self.generating = Some(employee_name.to_string());
        let result = report::predict(ctx, employee_name, "Report generation failed.").await;
        self.generating = None;
        result
    }
}

impl fmt::Display for EmployeeListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ViewState::Loading => return writeln!(f, "Loading personnel..."),
            ViewState::Error(message) => return writeln!(f, "{message}"),
            ViewState::Success(_) => {}
        }
        writeln!(f, "Employee Directory")?;
        let rows = self.filtered();
        if rows.is_empty() {
            return writeln!(f, "No personnel data found for the current filter.");
        }
        for person in rows {
            writeln!(
                f,
                "  {:<10} {:<24} {:<8} {:<28} {}",
                person.employee_id.as_deref().unwrap_or("—"),
                person.name,
                person.role(),
                person.designation.as_deref().unwrap_or("—"),
                status_label(person.status)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, role: Role) -> PersonnelEntry {
        PersonnelEntry {
            name: name.into(),
            employee_id: None,
            role: Some(role),
            designation: None,
            department: None,
            status: None,
        }
    }

    #[test]
    fn filters_by_role_and_name() {
        let mut view = EmployeeListView {
            state: ViewState::Success(vec![
                person("Asha", Role::Employee),
                person("Ravi", Role::Manager),
                person("Meena", Role::Hr),
            ]),
            ..EmployeeListView::default()
        };
        assert_eq!(view.filtered().len(), 3);
        view.set_filter(RoleFilter::Employees);
        let names: Vec<_> = view.filtered().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Asha", "Meena"]);
        view.set_filter(RoleFilter::TeamLeaders);
        assert_eq!(view.filtered().len(), 1);
        view.set_query("asha");
        assert!(view.to_string().contains("No personnel data found"));
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!(RoleFilter::parse("Team-Leaders"), Some(RoleFilter::TeamLeaders));
        assert_eq!(RoleFilter::parse("nobody"), None);
    }
}
