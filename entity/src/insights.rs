use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Organisation analytics served by `GET /api/insights`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub category_scores: Vec<CategoryScore>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub skill_balance: Vec<SkillValue>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub monthly_trends: Vec<MonthlyTrend>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub team_heatmap: Vec<HeatmapRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillValue {
    pub skill: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub avg_score: f64,
}

/// One department with its averaged skill scores keyed by label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub team: String,
    #[serde(flatten)]
    pub scores: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatQuery {
    pub query: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatmap_row_collects_dynamic_columns() {
        let row: HeatmapRow =
            serde_json::from_str(r#"{"team":"Engineering","Leadership":3.9,"Skill Development":4.1}"#)
                .unwrap();
        assert_eq!(row.team, "Engineering");
        assert_eq!(row.scores.len(), 2);
        assert_eq!(row.scores["Leadership"], 3.9);
    }
}
