use std::fmt;

use entity::ReportResult;

use super::report;
use crate::{context::ViewContext, error::ActionResult, view_state::ViewState};

/// Pick a staged employee by name and run a prediction for them.
#[derive(Clone, Debug, Default)]
pub struct SearchView {
    names: ViewState<Vec<String>>,
    selected: Option<String>,
    predicting: bool,
}

impl SearchView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &ViewState<Vec<String>> {
        &self.names
    }

    pub async fn load(&mut self, ctx: &ViewContext) {
        let token = ctx.token();
        self.names = match ctx.api.staged_names(token.as_deref()).await {
            Ok(names) => ViewState::Success(names),
            Err(err) => {
                ViewState::Error(ctx.fail(err, "Failed to load employee list").to_string())
            }
        };
    }

    pub fn select(&mut self, name: &str) -> bool {
        let known = self
            .names
            .data()
            .is_some_and(|names| names.iter().any(|n| n == name));
        if known {
            self.selected = Some(name.to_string());
        }
        known
    }

    pub async fn submit(&mut self, ctx: &ViewContext) -> ActionResult<ReportResult> {
        let Some(name) = self.selected.clone() else {
            return Err(ctx.refuse("Please select a name"));
        };
        self.predicting = true;
        let result = report::predict(ctx, &name, "Prediction error").await;
        self.predicting = false;
        result
    }
}

impl fmt::Display for SearchView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search Employee")?;
        let names = match &self.names {
            ViewState::Loading => return writeln!(f, "  Loading names..."),
            ViewState::Error(message) => return writeln!(f, "  {message}"),
            ViewState::Success(names) => names,
        };
        for name in names {
            let mark = if self.selected.as_ref() == Some(name) { ">" } else { " " };
            writeln!(f, "  {mark} {name}")?;
        }
        if self.predicting {
            writeln!(f, "  Predicting...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::offline;

    #[tokio::test]
    async fn submit_requires_a_known_name() {
        let ctx = offline();
        let mut view = SearchView {
            names: ViewState::Success(vec!["Asha".into()]),
            ..SearchView::default()
        };
        assert!(!view.select("Nobody"));
        let err = view.submit(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a name");
        assert!(view.select("Asha"));
        assert!(view.to_string().contains("> Asha"));
    }
}
