use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Computed evaluation returned by `/search` and `/api/generate-report`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub promotion: PromotionResult,
    pub attrition: AttritionResult,
    pub anomaly: AnomalyResult,
    #[serde(default)]
    pub feedback_summary: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromotionResult {
    pub employee_name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub kpi_scores: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttritionResult {
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    #[serde(default)]
    pub anomaly_status: Option<String>,
    #[serde(default)]
    pub anomaly_score: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Visual weight of a level label such as `Highly Ready` or `High Risk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
    Good,
    Warning,
    Danger,
    Neutral,
}

impl Badge {
    /// Exact labels win; otherwise the label is classified by keyword, so
    /// `Very Low Risk` reads as good and `Moderate Risk` as a warning.
    pub fn for_level(level: &str) -> Self {
        match level {
            "Highly Ready" | "Low" | "Normal" => return Badge::Good,
            "Medium" => return Badge::Warning,
            "High" | "Anomaly Detected" => return Badge::Danger,
            _ => {}
        }
        let lower = level.to_lowercase();
        if contains_any(&lower, &["high", "negative", "detected"]) {
            Badge::Danger
        } else if contains_any(&lower, &["medium", "moderate", "neutral"]) {
            Badge::Warning
        } else if contains_any(&lower, &["low", "positive", "normal"]) {
            Badge::Good
        } else {
            Badge::Neutral
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Badge::Good => "[+]",
            Badge::Warning => "[~]",
            Badge::Danger => "[!]",
            Badge::Neutral => "[ ]",
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
