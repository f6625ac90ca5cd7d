//! Static route table and role guard.

use entity::Role;
use platform_authz::{GuardDecision, RoleSet, check};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    HrDashboard,
    Upload,
    Search,
    ManualEntry,
    Insights,
    Employees,
    ManagerDashboard,
    TeamEntry,
    TeamInsights,
    AssignTask,
    GenerateReport,
    EmployeeDashboard,
    MyResult,
}

impl Route {
    pub const ALL: [Route; 15] = [
        Route::Landing,
        Route::Login,
        Route::HrDashboard,
        Route::Upload,
        Route::Search,
        Route::ManualEntry,
        Route::Insights,
        Route::Employees,
        Route::ManagerDashboard,
        Route::TeamEntry,
        Route::TeamInsights,
        Route::AssignTask,
        Route::GenerateReport,
        Route::EmployeeDashboard,
        Route::MyResult,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::HrDashboard => "/dashboard",
            Route::Upload => "/upload",
            Route::Search => "/search",
            Route::ManualEntry => "/manual-entry",
            Route::Insights => "/insights",
            Route::Employees => "/employees",
            Route::ManagerDashboard => "/manager-dashboard",
            Route::TeamEntry => "/manual-complete",
            Route::TeamInsights => "/insightstl",
            Route::AssignTask => "/assigntask",
            Route::GenerateReport => "/generate-report",
            Route::EmployeeDashboard => "/employee-dashboard",
            Route::MyResult => "/my-result",
        }
    }

    /// Roles allowed to open the route; `None` for public routes.
    pub fn required(self) -> Option<RoleSet> {
        match self {
            Route::Landing | Route::Login => None,
            Route::HrDashboard
            | Route::Upload
            | Route::Search
            | Route::ManualEntry
            | Route::Insights
            | Route::Employees => Some(RoleSet::HR),
            Route::ManagerDashboard
            | Route::TeamEntry
            | Route::TeamInsights
            | Route::AssignTask => Some(RoleSet::MANAGER),
            Route::GenerateReport => Some(RoleSet::HR_OR_MANAGER),
            Route::EmployeeDashboard | Route::MyResult => Some(RoleSet::EMPLOYEE),
        }
    }

    /// Maps a path to its route. Query strings, fragments and trailing
    /// slashes are ignored; anything unknown is the landing page.
    pub fn resolve(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::Landing)
    }
}

pub fn dashboard_for(role: Role) -> Route {
    match role {
        Role::Hr => Route::HrDashboard,
        Role::Manager => Route::ManagerDashboard,
        Role::Employee => Route::EmployeeDashboard,
    }
}

/// What navigating to a route yields for the current role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Public(Route),
    Allowed(Route, Role),
    Denied(Route, Role),
    RedirectToEntry,
}

pub fn guard(route: Route, role: Option<Role>) -> Resolution {
    let Some(required) = route.required() else {
        return Resolution::Public(route);
    };
    match check(required, role) {
        GuardDecision::Allow(role) => Resolution::Allowed(route, role),
        GuardDecision::Deny(role) => Resolution::Denied(route, role),
        GuardDecision::RedirectToEntry => Resolution::RedirectToEntry,
    }
}
