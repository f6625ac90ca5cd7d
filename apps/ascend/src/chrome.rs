use std::fmt;

use entity::{Role, User};

use crate::router::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

const fn link(label: &'static str, route: Route) -> NavLink {
    NavLink { label, route }
}

const HR_LINKS: [NavLink; 4] = [
    link("Dashboard", Route::HrDashboard),
    link("Upload CSV", Route::Upload),
    link("Manual Entry", Route::ManualEntry),
    link("Insights", Route::Insights),
];

const MANAGER_LINKS: [NavLink; 3] = [
    link("Dashboard", Route::ManagerDashboard),
    link("Assign Task", Route::AssignTask),
    link("Insights", Route::TeamInsights),
];

const EMPLOYEE_LINKS: [NavLink; 1] = [link("Dashboard", Route::EmployeeDashboard)];

pub fn links_for(role: Option<Role>) -> &'static [NavLink] {
    match role {
        Some(Role::Hr) => &HR_LINKS,
        Some(Role::Manager) => &MANAGER_LINKS,
        Some(Role::Employee) => &EMPLOYEE_LINKS,
        None => &[],
    }
}

/// Navigation bar drawn above every authorised view.
#[derive(Clone, Debug)]
pub struct Chrome<'a> {
    pub user: Option<&'a User>,
    pub active: Route,
}

impl Chrome<'_> {
    pub fn links(&self) -> &'static [NavLink] {
        links_for(self.user.map(|u| u.role))
    }

    pub fn shows_logout(&self) -> bool {
        self.user.is_some()
    }
}

impl fmt::Display for Chrome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<String> = self
            .links()
            .iter()
            .map(|l| {
                if l.route == self.active {
                    format!("[{}]", l.label)
                } else {
                    format!(" {} ", l.label)
                }
            })
            .collect();
        write!(f, "{}", links.join("|"))?;
        if let Some(user) = self.user {
            write!(f, "   {} ({}) | logout", user.name, user.role)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(72))
    }
}
