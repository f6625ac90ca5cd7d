use std::fmt;

use entity::{EvaluationStatus, employees::TeamMember};

use super::bar;
use crate::{context::ViewContext, view_state::ViewState};

/// Evaluation progress of the signed-in manager's team.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamInsights {
    pub size: usize,
    pub completed: usize,
    pub pending: Vec<String>,
}

impl TeamInsights {
    pub fn of(team: &[TeamMember]) -> Self {
        let pending: Vec<String> = team
            .iter()
            .filter(|m| m.status == EvaluationStatus::InProgress)
            .map(|m| m.name.clone())
            .collect();
        Self {
            size: team.len(),
            completed: team.len() - pending.len(),
            pending,
        }
    }

    /// Whole percent of the team with a completed review; zero for an
    /// empty team.
    pub fn completion_rate(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        ((self.completed as f64 / self.size as f64) * 100.0).round() as u64
    }
}

#[derive(Clone, Debug, Default)]
pub struct TeamInsightsView {
    state: ViewState<TeamInsights>,
}

impl TeamInsightsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<TeamInsights> {
        &self.state
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        self.state = match ctx.api.manager_team(token.as_deref()).await {
            Ok(team) => ViewState::Success(TeamInsights::of(&team)),
            Err(err) => ViewState::Error(ctx.fail(err, "Failed to fetch team data.").to_string()),
        };
    }
}

impl fmt::Display for TeamInsightsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let insights = match &self.state {
            ViewState::Loading => return writeln!(f, "Loading team insights..."),
            ViewState::Error(message) => return writeln!(f, "{message}"),
            ViewState::Success(insights) => insights,
        };
        let rate = insights.completion_rate();
        writeln!(f, "Team Insights")?;
        writeln!(f, "  Team size:       {}", insights.size)?;
        writeln!(f, "  Reviews done:    {}", insights.completed)?;
        writeln!(f, "  Reviews pending: {}", insights.pending.len())?;
        writeln!(f, "  Completion:      {rate}% {}", bar(rate as f64, 100.0, 20))?;
        if !insights.pending.is_empty() {
            writeln!(f, "\nAwaiting your review")?;
            for name in &insights.pending {
                writeln!(f, "  - {name}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, status: EvaluationStatus) -> TeamMember {
        TeamMember {
            employee_id: String::new(),
            name: name.into(),
            designation: None,
            status,
        }
    }

    #[test]
    fn derives_rates_from_the_team() {
        let insights = TeamInsights::of(&[
            member("Asha", EvaluationStatus::Completed),
            member("Ravi", EvaluationStatus::InProgress),
            member("Meena", EvaluationStatus::Completed),
        ]);
        assert_eq!(insights.size, 3);
        assert_eq!(insights.completion_rate(), 67);
        assert_eq!(insights.pending, ["Ravi"]);
        assert_eq!(TeamInsights::of(&[]).completion_rate(), 0);
    }
}
