use std::fmt;

use entity::{EvaluationStatus, ReportResult, dashboards::DashboardData};
use tracing::debug;

use super::{report, status_label};
use crate::{context::ViewContext, error::ActionResult, view_state::ViewState};

const EMPLOYEE_PREVIEW: usize = 4;
const MANAGER_PREVIEW: usize = 3;

/// Organisation overview for HR.
#[derive(Clone, Debug, Default)]
pub struct HrDashboardView {
    state: ViewState<DashboardData>,
    generating: Option<String>,
}

impl HrDashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<DashboardData> {
        &self.state
    }

    /// Name whose report is being generated, if any.
    pub fn generating(&self) -> Option<&str> {
        self.generating.as_deref()
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        self.state = match ctx.api.dashboard_data(token.as_deref()).await {
            Ok(data) => {
                debug!(
                    personnel = data.total_personnel,
                    employees = data.employee_total,
                    "dashboard loaded"
                );
                ViewState::Success(data)
            }
            Err(err) => ViewState::Error(ctx.fail(err, "Could not fetch dashboard data.").to_string()),
        };
    }

    pub async fn generate_report(
        &mut self,
        ctx: &ViewContext,
        employee_name: &str,
        status: Option<EvaluationStatus>,
    ) -> ActionResult<ReportResult> {
        self.generating = Some(employee_name.to_string());
        let result = report::generate_report(ctx, employee_name, status).await;
        self.generating = None;
        result
    }

    /// Evaluation status of a listed person, used to refuse early reports.
    pub fn status_of(&self, employee_name: &str) -> Option<EvaluationStatus> {
        let data = self.state.data()?;
        data.employee_list
            .iter()
            .chain(&data.manager_list)
            .find(|p| p.name == employee_name)
            .and_then(|p| p.status)
    }
}

impl fmt::Display for HrDashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HR Dashboard")?;
        writeln!(f, "Welcome back! Here's an overview of the current evaluation cycle.")?;
        let data = match &self.state {
            ViewState::Loading => return writeln!(f, "Loading..."),
            ViewState::Error(message) => return writeln!(f, "{message}"),
            ViewState::Success(data) => data,
        };
        writeln!(f)?;
        writeln!(f, "  Total Personnel        {:>6}", data.total_personnel)?;
        writeln!(f, "  Employees              {:>6}", data.employee_total)?;
        writeln!(f, "  Team Leaders           {:>6}", data.manager_total)?;
        writeln!(f, "  Evaluations Completed  {:>6}", data.employee_completed)?;
        writeln!(f, "  Evaluations Pending    {:>6}", data.employee_in_progress)?;
        writeln!(f, "  Completion             {:>5}%", data.completion_percent())?;

        writeln!(f, "\nEmployee Evaluation Status")?;
        if data.employee_list.is_empty() {
            writeln!(f, "  No employees to show.")?;
        }
        for person in data.employee_list.iter().take(EMPLOYEE_PREVIEW) {
            let busy = if self.generating.as_deref() == Some(person.name.as_str()) {
                "  (generating report...)"
            } else {
                ""
            };
            writeln!(f, "  {:<28} {}{busy}", person.name, status_label(person.status))?;
        }
        writeln!(f, "\nTeam Leader Status")?;
        if data.manager_list.is_empty() {
            writeln!(f, "  No team leaders to show.")?;
        }
        for person in data.manager_list.iter().take(MANAGER_PREVIEW) {
            writeln!(f, "  {:<28} Role: Manager", person.name)?;
        }
        writeln!(f, "\nView all personnel: /employees")
    }
}
