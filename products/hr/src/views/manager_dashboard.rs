use std::fmt;

use entity::{EvaluationStatus, ReportResult, employees::TeamMember};

use super::{name_matches, report, status_label};
use crate::{context::ViewContext, error::ActionResult, view_state::ViewState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeamStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TeamStats {
    pub fn of(team: &[TeamMember]) -> Self {
        let completed = team
            .iter()
            .filter(|m| m.status == EvaluationStatus::Completed)
            .count();
        Self {
            total: team.len(),
            completed,
            pending: team.len() - completed,
        }
    }
}

/// A team lead's direct reports.
#[derive(Clone, Debug, Default)]
pub struct ManagerDashboardView {
    state: ViewState<Vec<TeamMember>>,
    query: String,
    generating: Option<String>,
}

impl ManagerDashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<Vec<TeamMember>> {
        &self.state
    }

    pub fn generating(&self) -> Option<&str> {
        self.generating.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        self.state = match ctx.api.manager_team(token.as_deref()).await {
            Ok(team) => ViewState::Success(team),
            Err(err) => ViewState::Error(ctx.fail(err, "Failed to fetch team data.").to_string()),
        };
    }

    pub fn stats(&self) -> TeamStats {
        self.state.data().map(|t| TeamStats::of(t)).unwrap_or_default()
    }

    pub fn filtered(&self) -> Vec<&TeamMember> {
        self.state
            .data()
            .map(|team| {
                team.iter()
                    .filter(|m| name_matches(&m.name, &self.query))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn member(&self, name_or_id: &str) -> Option<&TeamMember> {
        self.state.data()?.iter().find(|m| {
            m.employee_id == name_or_id || m.name.eq_ignore_ascii_case(name_or_id.trim())
        })
    }

    pub async fn generate_report(
        &mut self,
        ctx: &ViewContext,
        employee_name: &str,
    ) -> ActionResult<ReportResult> {
        let status = self.member(employee_name).map(|m| m.status);
        self.generating = Some(employee_name.to_string());
        let result = report::generate_report(ctx, employee_name, status).await;
        self.generating = None;
        result
    }
}

impl fmt::Display for ManagerDashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Team Dashboard")?;
        let stats = self.stats();
        writeln!(f, "  Team Members  {:>4}", stats.total)?;
        writeln!(f, "  Completed     {:>4}", stats.completed)?;
        writeln!(f, "  Pending       {:>4}", stats.pending)?;
        writeln!(f)?;
        match &self.state {
            ViewState::Loading => return writeln!(f, "Loading team..."),
            ViewState::Error(message) => return writeln!(f, "{message}"),
            ViewState::Success(_) => {}
        }
        let members = self.filtered();
        if members.is_empty() {
            let query = self.query.trim();
            if query.is_empty() {
                writeln!(f, "No Team Members Found")?;
                return writeln!(f, "No employees are currently assigned to you.");
            }
            writeln!(f, "No Employees Found")?;
            return writeln!(f, "Your search for \"{query}\" did not match any team members.");
        }
        for member in members {
            let busy = if self.generating.as_deref() == Some(member.name.as_str()) {
                "  (generating report...)"
            } else {
                ""
            };
            writeln!(
                f,
                "  {:<10} {:<24} {:<22} {}{busy}",
                member.employee_id,
                member.name,
                member.designation.as_deref().unwrap_or("—"),
                status_label(Some(member.status))
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str, status: EvaluationStatus) -> TeamMember {
        TeamMember {
            employee_id: id.into(),
            name: name.into(),
            designation: Some("QA Tester".into()),
            status,
        }
    }

    fn loaded(team: Vec<TeamMember>) -> ManagerDashboardView {
        ManagerDashboardView {
            state: ViewState::Success(team),
            ..ManagerDashboardView::default()
        }
    }

    #[test]
    fn empty_team_is_an_empty_state() {
        let view = loaded(Vec::new());
        let text = view.to_string();
        assert!(text.contains("No Team Members Found"));
        assert!(view.state().error().is_none());
    }

    #[test]
    fn search_filters_and_explains_misses() {
        let mut view = loaded(vec![
            member("EMP0001", "Asha", EvaluationStatus::Completed),
            member("EMP0002", "Ravi", EvaluationStatus::InProgress),
        ]);
        assert_eq!(view.stats(), TeamStats { total: 2, completed: 1, pending: 1 });
        view.set_query("ra");
        assert_eq!(view.filtered().len(), 1);
        view.set_query("zed");
        assert!(view.to_string().contains("Your search for \"zed\""));
        assert_eq!(view.member("ravi").map(|m| m.status), Some(EvaluationStatus::InProgress));
    }
}
