//! Report generation and the printable report result.

use std::{fmt, sync::Arc};

use entity::{EvaluationStatus, ReportResult, reports::Badge};
use platform_authn::{KeyValueStore, RESULT_KEY, StorageError};
use tracing::{info, warn};

use crate::{context::ViewContext, error::ActionResult};

pub const INCOMPLETE_MESSAGE: &str =
    "Details Incomplete: Cannot generate a report while the evaluation is still in progress.";
pub const NO_REPORT_MESSAGE: &str = "No report data found. Please generate a report first.";

/// Last report result, kept in durable storage so it survives a restart.
#[derive(Clone)]
pub struct ResultCache {
    storage: Arc<dyn KeyValueStore>,
}

impl ResultCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Option<ReportResult> {
        let raw = match self.storage.get(RESULT_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "cannot read cached report");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(error = %err, "cached report unreadable; ignoring it");
                None
            }
        }
    }

    pub fn store(&self, result: &ReportResult) -> Result<(), StorageError> {
        match serde_json::to_string(result) {
            Ok(raw) => self.storage.set(RESULT_KEY, &raw),
            Err(err) => {
                warn!(error = %err, "cannot encode report for caching");
                Ok(())
            }
        }
    }

    fn remember(&self, result: &ReportResult) {
        if let Err(err) = self.store(result) {
            warn!(error = %err, "cannot cache report");
        }
    }
}

/// `POST /api/generate-report` for one person. Refused client-side while
/// their evaluation is still in progress. The result is cached.
pub async fn generate_report(
    ctx: &ViewContext,
    employee_name: &str,
    status: Option<EvaluationStatus>,
) -> ActionResult<ReportResult> {
    if status == Some(EvaluationStatus::InProgress) {
        return Err(ctx.refuse(INCOMPLETE_MESSAGE));
    }
    let name = employee_name.trim();
    if name.is_empty() {
        return Err(ctx.refuse("Employee name is required to generate a report."));
    }
    let token = ctx.token();
    let result = ctx
        .api
        .generate_report(token.as_deref(), name)
        .await
        .map_err(|err| ctx.fail(err, "Report generation failed."))?;
    info!(employee = name, "report generated");
    ctx.results().remember(&result);
    Ok(result)
}

/// `POST /search`: prediction for one staged or listed employee. The result
/// is cached like a generated report.
pub async fn predict(
    ctx: &ViewContext,
    employee_name: &str,
    fallback: &str,
) -> ActionResult<ReportResult> {
    let name = employee_name.trim();
    if name.is_empty() {
        return Err(ctx.refuse("Please select an employee to evaluate."));
    }
    let token = ctx.token();
    let result = ctx
        .api
        .predict(token.as_deref(), name)
        .await
        .map_err(|err| ctx.fail(err, fallback))?;
    info!(employee = name, "prediction received");
    ctx.results().remember(&result);
    Ok(result)
}

/// Feedback summary as the model writes it: numbered `label: value` lines,
/// or free text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub sentiment: String,
    pub key_themes: Vec<String>,
    pub one_line_summary: String,
    pub soft_skills_score: String,
}

impl FeedbackSummary {
    pub fn parse(raw: Option<&str>) -> Self {
        let not_available = || "N/A".to_string();
        let text = raw.map(|r| r.replace('*', "")).unwrap_or_default();
        if !text.contains(':') {
            let one_line_summary = if text.trim().is_empty() {
                "No feedback provided.".to_string()
            } else {
                text.trim().to_string()
            };
            return Self {
                sentiment: not_available(),
                key_themes: vec![not_available()],
                one_line_summary,
                soft_skills_score: not_available(),
            };
        }
        let find = |label: &str| {
            text.lines()
                .map(str::trim)
                .find(|line| line.to_lowercase().starts_with(label))
                .and_then(|line| line.split(':').nth(1))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let key_themes = find("2. key themes")
            .map(|themes| {
                themes
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![not_available()]);
        Self {
            sentiment: find("1. sentiment").unwrap_or_else(not_available),
            key_themes,
            one_line_summary: find("3. one-line summary")
                .unwrap_or_else(|| "No summary available.".to_string()),
            soft_skills_score: find("4. soft-skills score").unwrap_or_else(not_available),
        }
    }
}

/// The report result page: the result handed over by navigation, or the
/// cached one after a restart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportView {
    result: Option<ReportResult>,
}

impl ReportView {
    pub fn open(payload: Option<ReportResult>, cache: &ResultCache) -> Self {
        let result = match payload {
            Some(result) => {
                cache.remember(&result);
                Some(result)
            }
            None => cache.load(),
        };
        Self { result }
    }

    pub fn result(&self) -> Option<&ReportResult> {
        self.result.as_ref()
    }
}

fn labelled(f: &mut fmt::Formatter<'_>, label: &str, value: Option<&str>) -> fmt::Result {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => writeln!(f, "  {label}: {value}"),
        None => writeln!(f, "  {label}: —"),
    }
}

fn badged(f: &mut fmt::Formatter<'_>, label: &str, level: Option<&str>) -> fmt::Result {
    let level = level.unwrap_or("Unknown");
    writeln!(f, "  {label}: {} {level}", Badge::for_level(level).marker())
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(report) = &self.result else {
            return writeln!(f, "{NO_REPORT_MESSAGE}");
        };
        let promotion = &report.promotion;
        writeln!(f, "Employee Performance Report")?;
        writeln!(f, "===========================")?;
        labelled(f, "Name", Some(&promotion.employee_name))?;
        labelled(f, "ID", promotion.employee_id.as_deref())?;
        labelled(f, "Department", promotion.department.as_deref())?;
        labelled(f, "Role", promotion.role.as_deref())?;

        if !promotion.kpi_scores.is_empty() {
            writeln!(f, "\nKey Performance Indicators")?;
            for (kpi, score) in &promotion.kpi_scores {
                writeln!(f, "  {kpi:<32} {score:>6.2}")?;
            }
        }

        writeln!(f, "\nPromotion Readiness")?;
        match promotion.score {
            Some(score) => writeln!(f, "  Score: {score:.1} / 100")?,
            None => writeln!(f, "  Score: —")?,
        }
        badged(f, "Level", promotion.level.as_deref())?;
        labelled(f, "Recommendation", promotion.recommendation.as_deref())?;

        writeln!(f, "\nAttrition Risk")?;
        badged(f, "Risk", report.attrition.risk_level.as_deref())?;
        labelled(f, "Recommendation", report.attrition.recommendation.as_deref())?;

        let anomaly = &report.anomaly;
        writeln!(f, "\nAnomaly Status")?;
        badged(f, "Status", anomaly.anomaly_status.as_deref())?;
        if let Some(score) = anomaly.anomaly_score {
            writeln!(f, "  Score: {score:.2}")?;
        }
        if anomaly.anomaly_status.as_deref() != Some("Normal") {
            if let Some(description) = anomaly.description.as_deref().filter(|d| !d.is_empty()) {
                writeln!(f, "  {description}")?;
            }
        }

        let feedback = FeedbackSummary::parse(report.feedback_summary.as_deref());
        writeln!(f, "\nFeedback Summary")?;
        writeln!(f, "  {}", feedback.one_line_summary)?;
        badged(f, "Sentiment", Some(&feedback.sentiment))?;
        writeln!(f, "  Key themes: {}", feedback.key_themes.join(", "))?;
        writeln!(f, "  Soft-skills score: {}", feedback.soft_skills_score)
    }
}
