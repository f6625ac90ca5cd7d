//! Manager task assignment, to one team member or the whole team.

use std::fmt;

use chrono::NaiveDate;
use entity::{Priority, Task, TaskStatus, employees::TeamMember, tasks::NewTask};
use platform_api::ApiResult;
use tracing::info;

use crate::{
    context::ViewContext,
    error::ActionResult,
    forms::{FieldError, ValidationErrors},
    generation::{Generation, RequestGenerations},
    view_state::ViewState,
};

/// Where the page goes once a task is assigned.
pub const AFTER_ASSIGN: &str = "/manager-dashboard";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    All,
    Member(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
}

impl TaskDraft {
    fn validate(&self) -> Result<NaiveDate, ValidationErrors> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("task_title", "Task title is required"));
        }
        let due = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d");
        match due {
            Ok(due) if errors.is_empty() => Ok(due),
            Ok(_) => Err(ValidationErrors(errors)),
            Err(_) => {
                errors.push(FieldError::new("due_date", "Due date must be a date (YYYY-MM-DD)"));
                Err(ValidationErrors(errors))
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AssignTaskView {
    team: ViewState<Vec<TeamMember>>,
    target: Target,
    history: Vec<Task>,
    loading_history: bool,
    generations: RequestGenerations,
    pub draft: TaskDraft,
    submitting: bool,
}

impl AssignTaskView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(&self) -> &ViewState<Vec<TeamMember>> {
        &self.team
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn history(&self) -> &[Task] {
        &self.history
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        let token = ctx.token();
        self.team = match ctx.api.manager_team(token.as_deref()).await {
            Ok(team) => ViewState::Success(team),
            Err(err) => {
                ViewState::Error(ctx.fail(err, "Failed to fetch team members.").to_string())
            }
        };
    }

    /// Switches the target. Returns the generation of the history fetch to
    /// run, or `None` for a broadcast.
    pub fn begin_target(&mut self, target: Target) -> Option<Generation> {
        self.history.clear();
        let generation = self.generations.begin();
        self.target = target;
        match self.target {
            Target::All => {
                self.loading_history = false;
                None
            }
            Target::Member(_) => {
                self.loading_history = true;
                Some(generation)
            }
        }
    }

    /// Applies a fetched task history unless a newer target replaced it.
    pub fn finish_history(
        &mut self,
        ctx: &ViewContext,
        generation: Generation,
        fetched: ApiResult<Vec<Task>>,
    ) -> ActionResult<bool> {
        if !self.generations.accept(generation, "task history") {
            return Ok(false);
        }
        self.loading_history = false;
        self.history = fetched.map_err(|err| ctx.fail(err, "Failed to fetch employee's tasks."))?;
        Ok(true)
    }

    /// Picks `All` or a member by ID or name and loads that member's tasks.
    pub async fn set_target(&mut self, ctx: &ViewContext, target: &str) -> ActionResult<()> {
        let key = target.trim();
        if key.eq_ignore_ascii_case("all") {
            self.begin_target(Target::All);
            return Ok(());
        }
        let member = self.team.data().and_then(|team| {
            team.iter()
                .find(|m| m.employee_id == key || m.name.eq_ignore_ascii_case(key))
                .map(|m| m.employee_id.clone())
        });
        let Some(employee_id) = member else {
            return Err(ctx.refuse(format!("'{key}' is not on your team.")));
        };
        if let Some(generation) = self.begin_target(Target::Member(employee_id.clone())) {
            let token = ctx.token();
            let fetched = ctx.api.employee_tasks(token.as_deref(), &employee_id).await;
            self.finish_history(ctx, generation, fetched)?;
        }
        Ok(())
    }

    /// Sends the draft. On success returns the route to show next.
    pub async fn submit(&mut self, ctx: &ViewContext) -> ActionResult<&'static str> {
        let due = self.draft.validate().map_err(|errors| ctx.invalid(errors))?;
        let (assigned_to_id, is_broadcast) = match &self.target {
            Target::All => (None, true),
            Target::Member(id) => (Some(id.clone()), false),
        };
        let task = NewTask {
            task_title: self.draft.title.trim().to_string(),
            task_description: self.draft.description.trim().to_string(),
            due_date: due.format("%Y-%m-%d").to_string(),
            priority: self.draft.priority,
            assigned_to_id,
            is_broadcast,
        };
        self.submitting = true;
        let token = ctx.token();
        let sent = ctx.api.assign_task(token.as_deref(), &task).await;
        self.submitting = false;
        sent.map_err(|err| ctx.fail(err, "Failed to assign task."))?;
        info!(broadcast = is_broadcast, title = %task.task_title, "task assigned");
        ctx.notifier.success("Task assigned successfully!");
        self.draft = TaskDraft::default();
        Ok(AFTER_ASSIGN)
    }
}

impl fmt::Display for AssignTaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Assign Task")?;
        let team = match &self.team {
            ViewState::Loading => return writeln!(f, "  Loading team..."),
            ViewState::Error(message) => return writeln!(f, "  {message}"),
            ViewState::Success(team) => team,
        };
        let target = match &self.target {
            Target::All => "Entire team".to_string(),
            Target::Member(id) => team
                .iter()
                .find(|m| &m.employee_id == id)
                .map(|m| format!("{} ({id})", m.name))
                .unwrap_or_else(|| id.clone()),
        };
        writeln!(f, "  Assign to: {target}")?;
        writeln!(f, "  Title:     {}", self.draft.title)?;
        writeln!(f, "  Due:       {}", self.draft.due_date)?;
        writeln!(f, "  Priority:  {}", self.draft.priority)?;
        if let Target::Member(_) = self.target {
            writeln!(f, "\nCurrent tasks")?;
            if self.loading_history {
                writeln!(f, "  Loading tasks...")?;
            } else if self.history.is_empty() {
                writeln!(f, "  No tasks assigned yet.")?;
            }
            for task in &self.history {
                let mark = if task.status == TaskStatus::Completed { "x" } else { " " };
                writeln!(f, "  [{mark}] {} (due {}, {})", task.task_title, task.due_date, task.priority)?;
            }
        }
        if self.submitting {
            writeln!(f, "\nAssigning...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use entity::EvaluationStatus;
    use platform_api::ApiError;

    use super::*;
    use crate::{context::offline, error::ActionError};

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            task_title: format!("task {id}"),
            task_description: String::new(),
            due_date: "2026-11-01".into(),
            priority: Priority::Low,
            status: TaskStatus::Pending,
            assigned_to_id: None,
            assigned_by_name: None,
        }
    }

    #[test]
    fn newer_target_wins() {
        let ctx = offline();
        let mut view = AssignTaskView::new();
        let first = view.begin_target(Target::Member("EMP0001".into())).unwrap();
        let second = view.begin_target(Target::Member("EMP0002".into())).unwrap();
        assert!(view.finish_history(&ctx, second, Ok(vec![task("b")])).unwrap());
        assert!(!view.finish_history(&ctx, first, Ok(vec![task("a")])).unwrap());
        assert_eq!(view.history()[0].id, "b");

        assert!(view.begin_target(Target::All).is_none());
        assert!(view.history().is_empty());
    }

    #[tokio::test]
    async fn draft_is_validated_before_sending() {
        let ctx = offline();
        let mut view = AssignTaskView::new();
        view.draft.due_date = "next week".into();
        let Err(ActionError::Invalid(errors)) = view.submit(&ctx).await else {
            panic!("expected validation errors");
        };
        assert!(errors.for_field("task_title").is_some());
        assert!(errors.for_field("due_date").is_some());
    }

    #[tokio::test]
    async fn targets_must_be_on_the_team() {
        let ctx = offline();
        let mut view = AssignTaskView {
            team: ViewState::Success(vec![TeamMember {
                employee_id: "EMP0001".into(),
                name: "Asha".into(),
                designation: None,
                status: EvaluationStatus::InProgress,
            }]),
            ..AssignTaskView::default()
        };
        assert!(view.set_target(&ctx, "EMP0404").await.is_err());
        view.set_target(&ctx, "all").await.unwrap();
        assert_eq!(view.target(), &Target::All);
    }

    #[test]
    fn failed_history_is_reported() {
        let ctx = offline();
        let mut view = AssignTaskView::new();
        let generation = view.begin_target(Target::Member("EMP0001".into())).unwrap();
        let err = view
            .finish_history(&ctx, generation, Err(ApiError::NotFound(None)))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch employee's tasks.");
        assert!(view.history().is_empty());
        assert_eq!(ctx.notifier.drain().len(), 1);
    }
}
