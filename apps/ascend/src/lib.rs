//! Application shell for the evaluation client.
//!
//! [`router`] maps paths to views and guards them by role, [`chrome`] draws
//! the navigation for the signed-in role and [`shell::AppShell`] ties both to
//! the session and the view models in `products-hr`.

pub mod chrome;
pub mod config;
pub mod router;
pub mod shell;

pub use config::AppConfig;
pub use router::{Resolution, Route, dashboard_for};
pub use shell::{AppShell, Page};
