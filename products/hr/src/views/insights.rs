use std::fmt;

use entity::insights::Insights;

use super::bar;
use crate::{context::ViewContext, view_state::ViewState};

/// Ratings across the organisation are on a 1-5 scale.
const SCALE: f64 = 5.0;
const BAR_WIDTH: usize = 20;

#[derive(Clone, Debug, Default)]
pub struct InsightsView {
    state: ViewState<Insights>,
}

impl InsightsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<Insights> {
        &self.state
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        self.state = ViewState::Loading;
        let token = ctx.token();
        self.state = match ctx.api.insights(token.as_deref()).await {
            Ok(insights) => ViewState::Success(insights),
            Err(err) => ViewState::Error(ctx.fail(err, "Could not fetch insights.").to_string()),
        };
    }
}

fn chart<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    rows: &[T],
    row: impl Fn(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    if rows.is_empty() {
        return writeln!(f, "  No data available");
    }
    rows.iter().try_for_each(|r| row(f, r))
}

impl fmt::Display for InsightsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let insights = match &self.state {
            ViewState::Loading => return writeln!(f, "Loading insights..."),
            ViewState::Error(message) => {
                writeln!(f, "Failed to Load Data")?;
                return writeln!(f, "{message}");
            }
            ViewState::Success(insights) => insights,
        };
        writeln!(f, "Organizational Insights")?;
        writeln!(f, "\nOverall Performance")?;
        writeln!(
            f,
            "  {:.1} / 5  {}",
            insights.overall_score,
            bar(insights.overall_score, SCALE, BAR_WIDTH)
        )?;
        chart(f, "Category-Wise Average Scores", &insights.category_scores, |f, c| {
            writeln!(f, "  {:<28} {:>5.2} {}", c.category, c.score, bar(c.score, SCALE, BAR_WIDTH))
        })?;
        chart(f, "Skill Balance", &insights.skill_balance, |f, s| {
            writeln!(f, "  {:<28} {:>5.2} {}", s.skill, s.value, bar(s.value, SCALE, BAR_WIDTH))
        })?;
        chart(f, "Monthly Performance Trend", &insights.monthly_trends, |f, m| {
            writeln!(f, "  {:<10} {:>5.2} {}", m.month, m.avg_score, bar(m.avg_score, SCALE, BAR_WIDTH))
        })?;
        chart(f, "Team Performance Heatmap", &insights.team_heatmap, |f, row| {
            let cells: Vec<String> = row
                .scores
                .iter()
                .map(|(category, score)| format!("{category}={score:.1}"))
                .collect();
            writeln!(f, "  {:<20} {}", row.team, cells.join("  "))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use entity::insights::{CategoryScore, HeatmapRow};

    use super::*;

    #[test]
    fn empty_series_say_so() {
        let view = InsightsView {
            state: ViewState::Success(Insights {
                overall_score: 3.9,
                category_scores: vec![CategoryScore {
                    category: "Soft Skills".into(),
                    score: 4.0,
                }],
                team_heatmap: vec![HeatmapRow {
                    team: "Engineering".into(),
                    scores: BTreeMap::from([("Quality".to_string(), 4.25)]),
                }],
                ..Insights::default()
            }),
        };
        let text = view.to_string();
        assert!(text.contains("3.9 / 5"));
        assert!(text.contains("Soft Skills"));
        assert!(text.contains("Quality=4.2") || text.contains("Quality=4.3"));
        assert_eq!(text.matches("No data available").count(), 2);
    }

    #[test]
    fn failure_is_shown() {
        let view = InsightsView {
            state: ViewState::Error("Could not fetch insights.".into()),
        };
        assert!(view.to_string().starts_with("Failed to Load Data"));
    }
}
