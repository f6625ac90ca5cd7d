//! In-process stand-in for the evaluation backend.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use entity::{Role, User};
use platform_api::ApiClient;
use platform_authn::{KeyValueStore, MemoryStore, SessionStore};
use products_hr::{Notifier, ViewContext};
use serde_json::{Value, json};

/// A backend bound to an ephemeral local port.
pub struct MockBackend {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub async fn start(router: Router) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = router.layer(middleware::from_fn(move |req: Request, next: Next| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                next.run(req).await
            }
        }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock backend");
        });
        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).expect("mock base url")
    }

    /// Signed-out context over the given storage.
    pub fn context(&self, storage: Arc<dyn KeyValueStore>) -> ViewContext {
        ViewContext::new(self.client(), SessionStore::new(storage), Notifier::new())
    }

    /// Context already signed in as `role`.
    pub fn signed_in(&self, role: Role, name: &str) -> ViewContext {
        let ctx = self.context(Arc::new(MemoryStore::new()));
        ctx.session
            .login(user(role, name), "t1".to_string())
            .expect("sign in");
        ctx
    }
}

pub fn user(role: Role, name: &str) -> User {
    User {
        id: Some(format!("u-{name}")),
        employee_id: "EMP0001".into(),
        name: name.into(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        role,
    }
}

/// `{ "error": message }` with the given status.
pub fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn report_body(name: &str) -> Value {
    json!({
        "promotion": {
            "employee_name": name,
            "employee_id": "EMP0002",
            "score": 71.0,
            "level": "Ready",
            "kpi_scores": { "code_quality": 4.2 }
        },
        "attrition": { "risk_level": "Low" },
        "anomaly": { "anomaly_status": "Normal", "anomaly_score": 0.1 },
        "feedback_summary": "1. Sentiment: Positive\n3. One-line summary: Steady."
    })
}
