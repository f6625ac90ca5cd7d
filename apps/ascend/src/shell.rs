//! Active route, active view and the session that decides both.

use std::fmt;

use entity::{ReportResult, Role};
use platform_authn::{Session, SessionError};
use products_hr::{
    ActionResult, ViewContext,
    views::{
        assign_task::AssignTaskView, employee_dashboard::EmployeeDashboardView,
        employee_list::EmployeeListView, hr_dashboard::HrDashboardView, insights::InsightsView,
        login::{LandingView, LoginView}, manager_dashboard::ManagerDashboardView,
        manual_entry::ManualEntryView, report::ReportView, search::SearchView,
        team_entry::TeamEntryView, team_insights::TeamInsightsView, upload::UploadView,
    },
};
use tracing::{debug, info};

use crate::{
    chrome::Chrome,
    router::{Resolution, Route, dashboard_for, guard},
};

/// The view model behind the active route.
#[derive(Debug)]
pub enum Page {
    Landing(LandingView),
    Login(LoginView),
    HrDashboard(HrDashboardView),
    Upload(UploadView),
    Search(SearchView),
    ManualEntry(ManualEntryView),
    Insights(InsightsView),
    Employees(EmployeeListView),
    ManagerDashboard(ManagerDashboardView),
    TeamEntry(TeamEntryView),
    TeamInsights(TeamInsightsView),
    AssignTask(AssignTaskView),
    Report(ReportView),
    EmployeeDashboard(EmployeeDashboardView),
    Denied { route: Route, role: Role },
}

impl Page {
    fn build(route: Route, ctx: &ViewContext, payload: Option<ReportResult>) -> Page {
        match route {
            Route::Landing => Page::Landing(LandingView),
            Route::Login => Page::Login(LoginView::default()),
            Route::HrDashboard => Page::HrDashboard(HrDashboardView::new()),
            Route::Upload => Page::Upload(UploadView::new()),
            Route::Search => Page::Search(SearchView::new()),
            Route::ManualEntry => Page::ManualEntry(ManualEntryView::new()),
            Route::Insights => Page::Insights(InsightsView::new()),
            Route::Employees => Page::Employees(EmployeeListView::new()),
            Route::ManagerDashboard => Page::ManagerDashboard(ManagerDashboardView::new()),
            Route::TeamEntry => Page::TeamEntry(TeamEntryView::new()),
            Route::TeamInsights => Page::TeamInsights(TeamInsightsView::new()),
            Route::AssignTask => Page::AssignTask(AssignTaskView::new()),
            Route::GenerateReport => Page::Report(ReportView::open(payload, &ctx.results())),
            Route::MyResult => Page::Report(ReportView::open(None, &ctx.results())),
            Route::EmployeeDashboard => Page::EmployeeDashboard(EmployeeDashboardView::new()),
        }
    }

    /// Issues the page's initial requests.
    async fn load(&mut self, ctx: &ViewContext) {
        match self {
            Page::HrDashboard(view) => view.load(ctx).await,
            Page::Search(view) => view.load(ctx).await,
            Page::ManualEntry(view) => view.load_list(ctx).await,
            Page::Insights(view) => view.load(ctx).await,
            Page::Employees(view) => view.load(ctx).await,
            Page::ManagerDashboard(view) => view.load(ctx).await,
            Page::TeamEntry(view) => view.load(ctx).await,
            Page::TeamInsights(view) => view.load(ctx).await,
            Page::AssignTask(view) => view.load(ctx).await,
            Page::EmployeeDashboard(view) => view.load(ctx).await,
            Page::Landing(_)
            | Page::Login(_)
            | Page::Upload(_)
            | Page::Report(_)
            | Page::Denied { .. } => {}
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Landing(view) => write!(f, "{view}"),
            Page::Login(view) => write!(f, "{view}"),
            Page::HrDashboard(view) => write!(f, "{view}"),
            Page::Upload(view) => write!(f, "{view}"),
            Page::Search(view) => write!(f, "{view}"),
            Page::ManualEntry(view) => write!(f, "{view}"),
            Page::Insights(view) => write!(f, "{view}"),
            Page::Employees(view) => write!(f, "{view}"),
            Page::ManagerDashboard(view) => write!(f, "{view}"),
            Page::TeamEntry(view) => write!(f, "{view}"),
            Page::TeamInsights(view) => write!(f, "{view}"),
            Page::AssignTask(view) => write!(f, "{view}"),
            Page::Report(view) => write!(f, "{view}"),
            Page::EmployeeDashboard(view) => write!(f, "{view}"),
            Page::Denied { route, role } => {
                writeln!(f, "Access Denied")?;
                writeln!(
                    f,
                    "Your role ({role}) does not have permission to view {}.",
                    route.path()
                )
            }
        }
    }
}

/// Owns the view context and whatever page is showing.
#[derive(Debug)]
pub struct AppShell {
    ctx: ViewContext,
    route: Route,
    page: Page,
}

impl AppShell {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            route: Route::Landing,
            page: Page::Landing(LandingView),
        }
    }

    /// Restores the persisted session. The shell starts on the landing page,
    /// so a restored identity moves it straight to that role's dashboard.
    pub async fn start(ctx: ViewContext) -> Result<Self, SessionError> {
        let mut shell = Self::new(ctx);
        shell.ctx.session.restore()?;
        shell.on_identity_change().await;
        Ok(shell)
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Opens `path` for the current role and loads it. Returns the route
    /// that ended up active.
    pub async fn navigate(&mut self, path: &str) -> Route {
        self.go(Route::resolve(path), None).await
    }

    /// Shows a freshly computed report.
    pub async fn open_report(&mut self, result: ReportResult) -> Route {
        self.go(Route::GenerateReport, Some(result)).await
    }

    async fn go(&mut self, route: Route, payload: Option<ReportResult>) -> Route {
        let role = self.ctx.session.role();
        let (route, page) = match guard(route, role) {
            Resolution::Public(route) | Resolution::Allowed(route, _) => {
                (route, Page::build(route, &self.ctx, payload))
            }
            Resolution::Denied(route, role) => {
                info!(path = route.path(), %role, "access denied");
                (route, Page::Denied { route, role })
            }
            Resolution::RedirectToEntry => {
                debug!(path = route.path(), "no session; redirecting to entry");
                (Route::Landing, Page::Landing(LandingView))
            }
        };
        self.route = route;
        self.page = page;
        self.page.load(&self.ctx).await;
        route
    }

    /// Signs in through the login view and lands on the role's dashboard.
    pub async fn login(&mut self, email: &str, password: &str) -> ActionResult<Session> {
        if self.route != Route::Login {
            self.go(Route::Login, None).await;
        }
        let mut view = LoginView::new(email, password);
        let result = view.submit(&self.ctx).await;
        self.page = Page::Login(view);
        let session = result?;
        self.on_identity_change().await;
        Ok(session)
    }

    /// Clears the session and returns to the entry view. The shell is
    /// signed out even when storage could not be cleared.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        let result = self.ctx.session.logout();
        self.go(Route::Landing, None).await;
        result
    }

    async fn on_identity_change(&mut self) {
        let on_entry = matches!(self.route, Route::Landing | Route::Login);
        if let (true, Some(role)) = (on_entry, self.ctx.session.role()) {
            self.go(dashboard_for(role), None).await;
        }
    }
}

impl fmt::Display for AppShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authorised = self.route.required().is_some() && !matches!(self.page, Page::Denied { .. });
        if authorised {
            let user = self.ctx.session.user();
            let chrome = Chrome {
                user: user.as_ref(),
                active: self.route,
            };
            write!(f, "{chrome}")?;
        }
        write!(f, "{}", self.page)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use entity::User;
    use platform_api::ApiClient;
    use platform_authn::{KeyValueStore, MemoryStore, SessionStore, TOKEN_KEY, USER_KEY};
    use products_hr::Notifier;

    use super::*;

    fn context(storage: Arc<MemoryStore>) -> ViewContext {
        ViewContext::new(
            ApiClient::new("http://127.0.0.1:9").unwrap(),
            SessionStore::new(storage),
            Notifier::new(),
        )
    }

    fn persist(storage: &MemoryStore, role: Role) {
        let user = User {
            id: None,
            employee_id: "EMP0001".into(),
            name: "Asha".into(),
            email: None,
            role,
        };
        storage.set(TOKEN_KEY, "t1").unwrap();
        storage.set(USER_KEY, &serde_json::to_string(&user).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn signed_out_navigation_redirects_to_entry() {
        let mut shell = AppShell::new(context(Arc::new(MemoryStore::new())));
        assert_eq!(shell.navigate("/dashboard").await, Route::Landing);
        assert_eq!(shell.navigate("/login").await, Route::Login);
        assert_eq!(shell.navigate("/made-up").await, Route::Landing);
        assert!(!shell.to_string().contains("logout"));
    }

    #[tokio::test]
    async fn restored_session_lands_on_dashboard_and_denies_others() {
        let storage = Arc::new(MemoryStore::new());
        persist(&storage, Role::Employee);
        let mut shell = AppShell::start(context(storage)).await.unwrap();
        assert_eq!(shell.route(), Route::EmployeeDashboard);

        assert_eq!(shell.navigate("/upload").await, Route::Upload);
        assert!(matches!(shell.page(), Page::Denied { role: Role::Employee, .. }));
        assert!(shell.to_string().starts_with("Access Denied"));
    }

    #[tokio::test]
    async fn logout_returns_to_entry() {
        let storage = Arc::new(MemoryStore::new());
        persist(&storage, Role::Manager);
        let mut shell = AppShell::start(context(storage.clone())).await.unwrap();
        shell.logout().await.unwrap();
        assert_eq!(shell.route(), Route::Landing);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
