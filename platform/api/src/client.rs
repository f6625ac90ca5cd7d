use std::time::Instant;

use entity::{
    EmployeeRecord, MessageResponse, ReportResult, Task, TaskStatus,
    dashboards::DashboardData,
    employees::{
        EmployeeSummary, EmployeesResponse, ManagersResponse, NamesResponse, PersonnelEntry,
        PersonnelResponse, TeamMember, TeamResponse,
    },
    insights::{ChatQuery, ChatReply, Insights},
    tasks::{NewTask, StatusUpdate, TasksResponse},
    users::{LoginRequest, LoginResponse},
};
use reqwest::{
    Method, RequestBuilder, Response, Url,
    header::{AUTHORIZATION, HeaderValue},
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|err| ApiError::InvalidInput(Some(format!("invalid base url: {err}"))))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidInput(Some(format!(
                "invalid base url: {base_url}"
            ))));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        let req = self.request(Method::POST, &["api", "auth", "login"], None)?;
        self.send(req.json(credentials)).await
    }

    pub async fn dashboard_data(&self, token: Option<&str>) -> ApiResult<DashboardData> {
        let req = self.request(Method::GET, &["api", "dashboard-data"], token)?;
        self.send(req).await
    }

    pub async fn all_personnel(&self, token: Option<&str>) -> ApiResult<Vec<PersonnelEntry>> {
        let req = self.request(Method::GET, &["api", "employees", "all"], token)?;
        let body: PersonnelResponse = self.send(req).await?;
        Ok(body.users)
    }

    pub async fn manager_team(&self, token: Option<&str>) -> ApiResult<Vec<TeamMember>> {
        let token = require(token)?;
        let req = self.request(Method::GET, &["api", "manager", "team"], Some(token))?;
        let body: TeamResponse = self.send(req).await?;
        Ok(body.team)
    }

    pub async fn managers(&self, token: Option<&str>) -> ApiResult<Vec<String>> {
        let req = self.request(Method::GET, &["api", "managers"], token)?;
        let body: ManagersResponse = self.send(req).await?;
        Ok(body.managers)
    }

    pub async fn employee_summaries(
        &self,
        token: Option<&str>,
    ) -> ApiResult<Vec<EmployeeSummary>> {
        let req = self.request(Method::GET, &["manual-entry", "employees"], token)?;
        let body: EmployeesResponse = self.send(req).await?;
        Ok(body.employees)
    }

    pub async fn employee_record(
        &self,
        token: Option<&str>,
        employee_id: &str,
    ) -> ApiResult<EmployeeRecord> {
        let token = require(token)?;
        let req = self.request(Method::GET, &["manual-entry", "hr", employee_id], Some(token))?;
        self.send(req).await
    }

    pub async fn create_employee(
        &self,
        token: Option<&str>,
        record: &EmployeeRecord,
    ) -> ApiResult<MessageResponse> {
        let req = self.request(Method::POST, &["manual-entry", "hr"], token)?;
        self.send(req.json(record)).await
    }

    pub async fn update_employee(
        &self,
        token: Option<&str>,
        employee_id: &str,
        record: &EmployeeRecord,
    ) -> ApiResult<MessageResponse> {
        let req = self.request(Method::PUT, &["manual-entry", "hr", employee_id], token)?;
        self.send(req.json(record)).await
    }

    /// `PUT /manual-entry/tl/{id}`: team-lead review fields or an employee's
    /// self-assessment.
    pub async fn save_team_lead_entry<B: Serialize + ?Sized>(
        &self,
        token: Option<&str>,
        employee_id: &str,
        body: &B,
    ) -> ApiResult<MessageResponse> {
        let req = self.request(Method::PUT, &["manual-entry", "tl", employee_id], token)?;
        self.send(req.json(body)).await
    }

    pub async fn delete_employee(
        &self,
        token: Option<&str>,
        employee_id: &str,
    ) -> ApiResult<MessageResponse> {
        let token = require(token)?;
        let req = self.request(Method::DELETE, &["api", "employees", employee_id], Some(token))?;
        self.send(req).await
    }

    pub async fn assign_task(
        &self,
        token: Option<&str>,
        task: &NewTask,
    ) -> ApiResult<MessageResponse> {
        let token = require(token)?;
        let req = self.request(Method::POST, &["api", "manager", "assign-task"], Some(token))?;
        self.send(req.json(task)).await
    }

    pub async fn employee_tasks(
        &self,
        token: Option<&str>,
        employee_id: &str,
    ) -> ApiResult<Vec<Task>> {
        let token = require(token)?;
        let req = self.request(
            Method::GET,
            &["api", "manager", "employee-tasks", employee_id],
            Some(token),
        )?;
        let body: TasksResponse = self.send(req).await?;
        Ok(body.tasks)
    }

    pub async fn my_tasks(&self, token: Option<&str>) -> ApiResult<Vec<Task>> {
        let token = require(token)?;
        let req = self.request(Method::GET, &["api", "employee", "tasks"], Some(token))?;
        let body: TasksResponse = self.send(req).await?;
        Ok(body.tasks)
    }

    pub async fn update_task_status(
        &self,
        token: Option<&str>,
        task_id: &str,
        status: TaskStatus,
    ) -> ApiResult<MessageResponse> {
        let token = require(token)?;
        let req = self.request(Method::PUT, &["api", "tasks", task_id, "status"], Some(token))?;
        self.send(req.json(&StatusUpdate { status })).await
    }

    pub async fn upload_csv(
        &self,
        token: Option<&str>,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ApiResult<MessageResponse> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let req = self.request(Method::POST, &["upload"], token)?;
        self.send(req.multipart(Form::new().part("file", part)))
            .await
    }

    pub async fn staged_names(&self, token: Option<&str>) -> ApiResult<Vec<String>> {
        let req = self.request(Method::GET, &["api", "employees"], token)?;
        let body: NamesResponse = self.send(req).await?;
        Ok(body.names)
    }

    /// `POST /search`: promotion/attrition/anomaly prediction for one
    /// employee.
    pub async fn predict(&self, token: Option<&str>, employee_name: &str) -> ApiResult<ReportResult> {
        let form = Form::new().text("employee_name", employee_name.to_string());
        let req = self.request(Method::POST, &["search"], token)?;
        self.send(req.multipart(form)).await
    }

    pub async fn generate_report(
        &self,
        token: Option<&str>,
        employee_name: &str,
    ) -> ApiResult<ReportResult> {
        let token = require(token)?;
        let form = Form::new().text("employee_name", employee_name.to_string());
        let req = self.request(Method::POST, &["api", "generate-report"], Some(token))?;
        self.send(req.multipart(form)).await
    }

    pub async fn insights(&self, token: Option<&str>) -> ApiResult<Insights> {
        let req = self.request(Method::GET, &["api", "insights"], token)?;
        self.send(req).await
    }

    pub async fn chatbot_query(&self, token: Option<&str>, query: &str) -> ApiResult<String> {
        let token = require(token)?;
        let req = self.request(Method::POST, &["api", "chatbot-query"], Some(token))?;
        let body = ChatQuery {
            query: query.to_string(),
        };
        let reply: ChatReply = self.send(req.json(&body)).await?;
        Ok(reply.response)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments);
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Unauthorized(Some("malformed token".into())))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let started = Instant::now();
        debug!(%method, %path, %request_id, "backend request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %path, %request_id, error = %err, "backend unreachable");
                return Err(err.into());
            }
        };
        let status = response.status().as_u16();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let result = read_body(response).await;
        match &result {
            Ok(_) => debug!(%method, %path, %request_id, status, elapsed_ms, "backend response"),
            Err(err) => warn!(
                %method,
                %path,
                %request_id,
                status,
                elapsed_ms,
                code = err.code(),
                error = %err,
                "backend call failed"
            ),
        }
        result
    }
}

fn require(token: Option<&str>) -> ApiResult<&str> {
    token.filter(|t| !t.is_empty()).ok_or(ApiError::MissingToken)
}

async fn read_body<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(error_for(status.as_u16(), &body));
    }
    let value: Value = if body.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(&body)?
    };
    // Some endpoints report failures as `{ "error": ... }` with a 200.
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Backend {
            status: status.as_u16(),
            message: Some(message.to_string()),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Token rejections come back as 422 `{ "msg": ... }`; any other 422 is a
/// validation failure.
fn error_for(status: u16, body: &str) -> ApiError {
    if status == 422 {
        let token_message = serde_json::from_str::<Value>(body.trim())
            .ok()
            .filter(|value| value.get("error").is_none())
            .and_then(|value| value.get("msg").and_then(Value::as_str).map(str::to_string));
        if let Some(message) = token_message {
            return ApiError::Unauthorized(Some(message));
        }
    }
    ApiError::from_status(status, error_message(body))
}

/// Extracts the backend's message from an error body: the `error` field of a
/// JSON object, or the raw text when the body is not JSON.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value.get("error").and_then(Value::as_str).map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::json;

    use super::*;

    async fn spawn(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ApiClient::new(&format!("http://{addr}")).unwrap()
    }

    #[test]
    fn error_message_handles_json_text_and_html() {
        assert_eq!(error_message(r#"{"error":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("Employee not found").as_deref(), Some("Employee not found"));
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(r#"{"detail":"x"}"#), None);
    }

    #[test]
    fn endpoint_encodes_path_segments() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        let url = client.endpoint(&["manual-entry", "hr", "EMP 01/2"]);
        assert_eq!(url.path(), "/manual-entry/hr/EMP%2001%2F2");
    }

    #[tokio::test]
    async fn protected_calls_need_a_token() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.manager_team(None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn bearer_token_is_forwarded() {
        let router = Router::new().route(
            "/api/manager/team",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer t1" && headers.contains_key("x-request-id") {
                    (StatusCode::OK, Json(json!({"team": []})))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad token"})))
                }
            }),
        );
        let client = spawn(router).await;
        assert!(client.manager_team(Some("t1")).await.unwrap().is_empty());
        let err = client.manager_team(Some("t2")).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.server_message(), Some("bad token"));
    }

    #[tokio::test]
    async fn error_field_on_success_status_is_a_failure() {
        let router = Router::new().route(
            "/api/dashboard-data",
            get(|| async { Json(json!({"error": "database offline"})) }),
        );
        let client = spawn(router).await;
        let err = client.dashboard_data(None).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "database offline");
    }

    #[tokio::test]
    async fn plain_text_errors_are_kept() {
        let router = Router::new().route(
            "/search",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "Details not filled.") }),
        );
        let client = spawn(router).await;
        let err = client.predict(None, "Asha").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Details not filled."));
        assert!(!err.is_auth());
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn unprocessable_is_auth_only_for_token_rejections() {
        let router = Router::new()
            .route(
                "/search",
                post(|| async {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"error": "Details not filled for Asha."})),
                    )
                }),
            )
            .route(
                "/api/generate-report",
                post(|| async {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"msg": "Signature verification failed"})),
                    )
                }),
            );
        let client = spawn(router).await;

        let err = client.predict(Some("t1"), "Asha").await.unwrap_err();
        assert!(matches!(err, ApiError::Backend { status: 422, .. }));
        assert_eq!(err.user_message("Search failed"), "Details not filled for Asha.");

        let err = client.generate_report(Some("t1"), "Asha").await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.server_message(), Some("Signature verification failed"));
    }
}
