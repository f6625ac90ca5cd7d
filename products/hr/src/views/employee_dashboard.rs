use std::fmt;

use entity::{EmployeeRecord, EvaluationStatus, Task, TaskStatus, employees::SelfAssessment};
use tracing::warn;

use crate::{context::ViewContext, error::ActionResult, view_state::ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Todo {
    pub text: &'static str,
    pub done: bool,
}

/// The signed-in employee's own record, reduced to what the page shows.
#[derive(Clone, Debug, PartialEq)]
pub struct EmployeeOverview {
    pub record: EmployeeRecord,
    pub status: EvaluationStatus,
    pub todos: [Todo; 2],
    pub assessment: SelfAssessment,
}

impl EmployeeOverview {
    pub fn from_record(record: EmployeeRecord) -> Self {
        let hr_done = record.hr_section_complete();
        let status = record.evaluation_status();
        let lead_done = status == EvaluationStatus::Completed;
        let todos = [
            Todo {
                text: if hr_done {
                    "HR has updated your record"
                } else {
                    "HR has to update your record"
                },
                done: hr_done,
            },
            Todo {
                text: if lead_done {
                    "Your Team Lead has evaluated you"
                } else {
                    "Your Team Lead has to evaluate you"
                },
                done: lead_done,
            },
        ];
        let assessment = SelfAssessment::from_record(&record);
        Self {
            record,
            status,
            todos,
            assessment,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self.status {
            EvaluationStatus::Completed => "Manager Review Complete",
            EvaluationStatus::InProgress => "Self-Assessment Pending",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EmployeeDashboardView {
    state: ViewState<EmployeeOverview>,
    tasks: Vec<Task>,
}

impl EmployeeDashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<EmployeeOverview> {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Fetches the record and the task list concurrently. A task failure
    /// only empties the list.
    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        let employee_id = ctx
            .session
            .user()
            .map(|u| u.employee_id)
            .filter(|id| !id.is_empty());
        let (Some(employee_id), Some(token)) = (employee_id, token) else {
            let message = "Could not find employee ID or authentication token.";
            ctx.notifier.banner(message);
            self.state = ViewState::Error(message.to_string());
            return;
        };
        let (record, tasks) = tokio::join!(
            ctx.api.employee_record(Some(&token), &employee_id),
            ctx.api.my_tasks(Some(&token)),
        );
        self.tasks = match tasks {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "could not fetch tasks");
                Vec::new()
            }
        };
        self.state = match record {
            Ok(record) => ViewState::Success(EmployeeOverview::from_record(record)),
            Err(err) => {
                ViewState::Error(ctx.fail(err, "Failed to fetch employee data.").to_string())
            }
        };
    }

    pub async fn submit_self_assessment(
        &mut self,
        ctx: &ViewContext,
        assessment: &SelfAssessment,
    ) -> ActionResult<()> {
        let employee_id = ctx
            .session
            .user()
            .map(|u| u.employee_id)
            .filter(|id| !id.trim().is_empty());
        let Some(employee_id) = employee_id else {
            return Err(ctx.refuse("Could not find employee ID. Please log in again."));
        };
        let token = ctx.token();
        ctx.api
            .save_team_lead_entry(token.as_deref(), &employee_id, assessment)
            .await
            .map_err(|err| ctx.fail(err, "Failed to submit assessment."))?;
        ctx.notifier.success("Self-assessment submitted.");
        self.load(ctx).await;
        Ok(())
    }

    /// Marks a task done (or not) and patches the local list on success.
    pub async fn set_task_done(
        &mut self,
        ctx: &ViewContext,
        task_id: &str,
        done: bool,
    ) -> ActionResult<()> {
        let status = if done {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        };
        self.set_task_status(ctx, task_id, status).await
    }

    /// Flips a listed task between `Pending` and `Completed`. Returns the
    /// new status.
    pub async fn toggle_task(
        &mut self,
        ctx: &ViewContext,
        task_id: &str,
    ) -> ActionResult<TaskStatus> {
        let Some(current) = self.tasks.iter().find(|t| t.id == task_id).map(|t| t.status) else {
            return Err(ctx.refuse(format!("Task {task_id} is not on your list.")));
        };
        let next = current.toggled();
        self.set_task_status(ctx, task_id, next).await?;
        Ok(next)
    }

    async fn set_task_status(
        &mut self,
        ctx: &ViewContext,
        task_id: &str,
        status: TaskStatus,
    ) -> ActionResult<()> {
        let token = ctx.token();
        ctx.api
            .update_task_status(token.as_deref(), task_id, status)
            .await
            .map_err(|err| ctx.fail(err, "Failed to update task status."))?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status;
        }
        Ok(())
    }
}

impl fmt::Display for EmployeeDashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overview = match &self.state {
            ViewState::Loading => return writeln!(f, "Loading your dashboard..."),
            ViewState::Error(message) => return writeln!(f, "{message}"),
            ViewState::Success(overview) => overview,
        };
        let record = &overview.record;
        writeln!(f, "Welcome, {}", record.name)?;
        writeln!(f, "\nEvaluation")?;
        writeln!(f, "  Status: {}", overview.status)?;
        writeln!(f, "  Stage:  {}", overview.stage())?;

        writeln!(f, "\nMy Tasks")?;
        if self.tasks.is_empty() {
            writeln!(f, "  No tasks assigned.")?;
        }
        for task in &self.tasks {
            let mark = if task.status == TaskStatus::Completed { "x" } else { " " };
            writeln!(
                f,
                "  [{mark}] {:<32} {:<6} due {}  ({})",
                task.task_title, task.priority, task.due_date, task.id
            )?;
        }

        writeln!(f, "\nEvaluation Status")?;
        for todo in &overview.todos {
            let mark = if todo.done { "x" } else { " " };
            writeln!(f, "  [{mark}] {}", todo.text)?;
        }

        writeln!(f, "\nProfile")?;
        writeln!(f, "  Employee ID: {}", record.employee_id)?;
        writeln!(f, "  Designation: {}", record.designation.as_deref().unwrap_or("—"))?;
        writeln!(f, "  Manager:     {}", record.reporting_manager.as_deref().unwrap_or("—"))?;
        writeln!(f, "  Email:       {}", record.email.as_deref().unwrap_or("—"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{context::offline, error::ActionError};

    #[test]
    fn overview_tracks_both_reviews() {
        let mut record = EmployeeRecord::default();
        record.set("name", json!("Asha"));
        record.set("total_experience", json!(4));
        record.set("accomplishments", json!("Shipped search"));
        let overview = EmployeeOverview::from_record(record);
        assert_eq!(overview.status, EvaluationStatus::InProgress);
        assert_eq!(overview.stage(), "Self-Assessment Pending");
        assert!(overview.todos[0].done);
        assert_eq!(overview.todos[1].text, "Your Team Lead has to evaluate you");
        assert_eq!(overview.assessment.accomplishments, "Shipped search");
    }

    #[tokio::test]
    async fn missing_identity_is_an_error_state() {
        let ctx = offline();
        let mut view = EmployeeDashboardView::new();
        view.load(&ctx).await;
        assert_eq!(
            view.state().error(),
            Some("Could not find employee ID or authentication token.")
        );
    }

    #[tokio::test]
    async fn self_assessment_needs_a_signed_in_employee() {
        let ctx = offline();
        let mut view = EmployeeDashboardView::new();
        let err = view
            .submit_self_assessment(&ctx, &SelfAssessment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Refused(_)));
        assert_eq!(
            ctx.notifier.drain()[0].message,
            "Could not find employee ID. Please log in again."
        );
    }

    #[tokio::test]
    async fn toggling_an_unknown_task_is_refused() {
        let ctx = offline();
        let mut view = EmployeeDashboardView::new();
        let err = view.toggle_task(&ctx, "t9").await.unwrap_err();
        assert!(matches!(err, ActionError::Refused(_)));
    }
}
