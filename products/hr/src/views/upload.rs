//! CSV upload and prediction for one staged employee.

use std::fmt;

use entity::ReportResult;
use tracing::info;

use super::report;
use crate::{context::ViewContext, error::ActionResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadStep {
    #[default]
    Idle,
    Uploading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CsvFile {
    name: String,
    contents: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct UploadView {
    file: Option<CsvFile>,
    step: UploadStep,
    message: String,
    names: Vec<String>,
    query: String,
    selected: Option<String>,
    predicting: bool,
}

/// Case-insensitive match that also ignores whitespace on both sides.
fn loosely_contains(name: &str, query: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    squash(name).contains(&squash(query))
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> UploadStep {
        self.step
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_predicting(&self) -> bool {
        self.predicting
    }

    fn failed(&mut self, message: impl Into<String>) {
        self.step = UploadStep::Failed;
        self.message = message.into();
    }

    /// Picks the file to upload. Only `.csv` files are accepted.
    pub fn choose_file(
        &mut self,
        ctx: &ViewContext,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ActionResult<()> {
        let is_csv = file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            self.file = None;
            let err = ctx.refuse("Please select a valid .csv file.");
            self.failed(err.to_string());
            return Err(err);
        }
        self.file = Some(CsvFile {
            name: file_name.to_string(),
            contents,
        });
        self.step = UploadStep::Idle;
        self.message.clear();
        Ok(())
    }

    /// Uploads the chosen file, then lists the staged names with the first
    /// one preselected.
    pub async fn upload(&mut self, ctx: &ViewContext) -> ActionResult<()> {
        let Some(file) = self.file.clone() else {
            let err = ctx.refuse("Please select a file first.");
            self.failed(err.to_string());
            return Err(err);
        };
        self.step = UploadStep::Uploading;
        self.message = "Uploading and processing file...".to_string();
        let token = ctx.token();
        let size = file.contents.len();
        if let Err(err) = ctx
            .api
            .upload_csv(token.as_deref(), &file.name, file.contents)
            .await
        {
            let err = ctx.fail(err, "File processing failed on the server.");
            self.failed(err.to_string());
            return Err(err);
        }
        info!(file = %file.name, bytes = size, "csv uploaded");
        let names = match ctx.api.staged_names(token.as_deref()).await {
            Ok(names) => names,
            Err(err) => {
                let err = ctx.fail(err, "Failed to load employee list");
                self.failed(err.to_string());
                return Err(err);
            }
        };
        self.selected = names.first().cloned();
        self.names = names;
        self.query.clear();
        self.step = UploadStep::Ready;
        self.message = "File processed. Please select an employee.".to_string();
        ctx.notifier.success(self.message.clone());
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| loosely_contains(name, &self.query))
            .collect()
    }

    pub fn select(&mut self, name: &str) -> bool {
        let found = self.names.iter().find(|n| n.as_str() == name.trim()).cloned();
        let picked = found.is_some();
        if picked {
            self.selected = found;
        }
        picked
    }

    pub async fn predict(&mut self, ctx: &ViewContext) -> ActionResult<ReportResult> {
        let name = self.selected.clone().unwrap_or_default();
        self.predicting = true;
        self.message = "Generating predictions...".to_string();
        let result = report::predict(ctx, &name, "Prediction request failed.").await;
        self.predicting = false;
        match &result {
            Ok(_) => self.message.clear(),
            Err(err) => self.failed(err.to_string()),
        }
        result
    }

    /// Back to an empty page.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for UploadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Upload Employee Data")?;
        match &self.file {
            Some(file) => writeln!(f, "  File: {} ({} bytes)", file.name, file.contents.len())?,
            None => writeln!(f, "  No file selected.")?,
        }
        if !self.message.is_empty() {
            let tag = if self.step == UploadStep::Failed { "error" } else { "info" };
            writeln!(f, "  [{tag}] {}", self.message)?;
        }
        if self.step == UploadStep::Ready {
            let visible = self.visible_names();
            if visible.is_empty() && !self.query.trim().is_empty() {
                writeln!(f, "  Nothing found.")?;
            }
            for name in visible {
                let mark = if self.selected.as_deref() == Some(name) { ">" } else { " " };
                writeln!(f, "  {mark} {name}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::offline, error::ActionError};

    #[test]
    fn only_csv_files_are_accepted() {
        let ctx = offline();
        let mut view = UploadView::new();
        let err = view.choose_file(&ctx, "people.xlsx", vec![1]).unwrap_err();
        assert_eq!(err.to_string(), "Please select a valid .csv file.");
        assert_eq!(view.step(), UploadStep::Failed);
        view.choose_file(&ctx, "People.CSV", b"name\nAsha\n".to_vec()).unwrap();
        assert_eq!(view.step(), UploadStep::Idle);
        assert!(view.message().is_empty());
    }

    #[tokio::test]
    async fn upload_without_a_file_is_refused() {
        let ctx = offline();
        let mut view = UploadView::new();
        let err = view.upload(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::Refused(ref m) if m == "Please select a file first."));
    }

    #[tokio::test]
    async fn prediction_needs_a_selection() {
        let ctx = offline();
        let mut view = UploadView::new();
        let err = view.predict(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select an employee to evaluate.");
        assert!(!view.is_predicting());
    }

    #[test]
    fn name_filter_ignores_spacing() {
        let view = UploadView {
            names: vec!["Asha Rao".into(), "Ravi Kumar".into()],
            step: UploadStep::Ready,
            query: "asharao".into(),
            ..UploadView::default()
        };
        assert_eq!(view.visible_names(), ["Asha Rao"]);
        assert!(loosely_contains("Ravi Kumar", "vi ku"));
    }
}
