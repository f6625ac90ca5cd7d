use std::sync::Arc;

use anyhow::Result;
use ascend::{AppShell, Page, Route};
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use entity::Role;
use platform_authn::{FileStore, KeyValueStore, MemoryStore, RESULT_KEY, TOKEN_KEY, USER_KEY};
use platform_authz::{GuardDecision, RoleSet, check};
use serde_json::{Value, json};
use suite_tests::{MockBackend, error, user};

async fn login(Json(body): Json<Value>) -> Response {
    match body["password"].as_str() {
        Some("secret") => Json(json!({
            "user": user(Role::Manager, "Ravi"),
            "token": "t-manager"
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

fn backend() -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/manager/team", get(|| async { Json(json!({ "team": [] })) }))
}

#[tokio::test]
async fn login_lands_on_role_dashboard_and_persists() -> Result<()> {
    let backend = MockBackend::start(backend()).await;
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStore::open(dir.path())?);
    let mut shell = AppShell::start(backend.context(storage.clone())).await?;
    assert_eq!(shell.route(), Route::Landing);

    let session = shell.login("ravi@example.com", "secret").await?;
    assert_eq!(session.role(), Role::Manager);
    assert_eq!(shell.route(), Route::ManagerDashboard);
    assert_eq!(storage.get(TOKEN_KEY)?.as_deref(), Some("t-manager"));
    assert!(storage.get(USER_KEY)?.is_some_and(|u| u.contains("Ravi")));

    // A fresh process over the same directory picks the session back up.
    let reopened = Arc::new(FileStore::open(dir.path())?);
    let restarted = AppShell::start(backend.context(reopened)).await?;
    assert_eq!(restarted.route(), Route::ManagerDashboard);
    assert!(restarted.to_string().contains("Ravi (Manager)"));
    Ok(())
}

#[tokio::test]
async fn rejected_login_keeps_user_signed_out() -> Result<()> {
    let backend = MockBackend::start(backend()).await;
    let storage = Arc::new(MemoryStore::new());
    let mut shell = AppShell::start(backend.context(storage.clone())).await?;

    assert!(shell.login("ravi@example.com", "wrong").await.is_err());
    assert_eq!(shell.route(), Route::Login);
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    assert!(shell.to_string().contains("Invalid credentials"));
    let messages: Vec<String> = shell
        .context()
        .notifier
        .drain()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["Invalid credentials".to_string()]);
    Ok(())
}

#[tokio::test]
async fn logout_clears_identity_and_cached_report() -> Result<()> {
    let backend = MockBackend::start(backend()).await;
    let storage = Arc::new(MemoryStore::new());
    let mut shell = AppShell::start(backend.context(storage.clone())).await?;
    shell.login("ravi@example.com", "secret").await?;
    storage.set(RESULT_KEY, "{}")?;

    shell.logout().await?;
    assert_eq!(shell.route(), Route::Landing);
    for key in [TOKEN_KEY, USER_KEY, RESULT_KEY] {
        assert_eq!(storage.get(key)?, None, "{key} survived logout");
    }
    assert_eq!(shell.navigate("/manager-dashboard").await, Route::Landing);
    Ok(())
}

#[tokio::test]
async fn guard_admits_exactly_the_declared_roles() -> Result<()> {
    let backend = MockBackend::start(Router::new()).await;
    for role in Role::ALL {
        let storage = Arc::new(MemoryStore::new());
        let ctx = backend.context(storage);
        ctx.session.login(user(role, "Asha"), "t1".into())?;
        let mut shell = AppShell::new(ctx);
        for route in Route::ALL {
            let required = route.required();
            shell.navigate(route.path()).await;
            let denied = matches!(shell.page(), Page::Denied { .. });
            match required {
                None => assert!(!denied, "{} is public", route.path()),
                Some(set) => {
                    assert_eq!(denied, !set.contains(role), "{role} on {}", route.path());
                    assert_eq!(
                        matches!(check(set, Some(role)), GuardDecision::Allow(_)),
                        !denied,
                        "{role} on {}",
                        route.path()
                    );
                }
            }
        }
    }
    assert_eq!(check(RoleSet::HR, None), GuardDecision::RedirectToEntry);
    Ok(())
}
