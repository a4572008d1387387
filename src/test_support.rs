//! In-process fake of the studio backend for sync and store tests.

use std::{
    rc::Rc,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Map, Value};

use crate::prelude::{MemoryTokenStore, Resource, Session, StudioConfig, TokenStore};

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_PASSWORD: &str = "secret";

#[derive(Debug, Default)]
pub struct BackendData {
    pub processes: Vec<Value>,
    pub policies: Vec<Value>,
    pub rules: Vec<Value>,
    pub next_id: u64,
    pub token: String,
    /// Every request sleeps this long before answering.
    pub delay: Option<Duration>,
    /// Every request fails with this status code.
    pub fail_with: Option<u16>,
    /// Collection reads answer with this body verbatim.
    pub raw_body: Option<String>,
    pub last_auth: Option<String>,
    pub requests: usize,
}

impl BackendData {
    fn collection(&mut self, resource: Resource) -> &mut Vec<Value> {
        match resource {
            Resource::Processes => &mut self.processes,
            Resource::Policies => &mut self.policies,
            Resource::Rules => &mut self.rules,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Backend(Arc<Mutex<BackendData>>);

impl Backend {
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.0.lock().expect("backend state poisoned")
    }

    pub fn seed(&self, resource: Resource, record: Value) {
        self.data().collection(resource).push(record);
    }

    pub fn records(&self, resource: Resource) -> Vec<Value> {
        self.data().collection(resource).clone()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Backend,
}

impl TestServer {
    pub fn config(&self) -> StudioConfig {
        StudioConfig {
            api_base_url: self.base_url.clone(),
            request_timeout_secs: 1,
            ..StudioConfig::default()
        }
    }

    /// A session already holding the backend's valid token.
    pub fn session(&self) -> Session {
        self.session_with(Rc::new(MemoryTokenStore::with_token(TEST_TOKEN)))
    }

    pub fn anonymous_session(&self) -> Session {
        self.session_with(Rc::new(MemoryTokenStore::new()))
    }

    pub fn session_with(&self, tokens: Rc<dyn TokenStore>) -> Session {
        Session::with_token_store(&self.config(), tokens).expect("session starts")
    }
}

pub async fn spawn_backend() -> TestServer {
    let backend = Backend::default();
    backend.data().token = TEST_TOKEN.to_string();

    let mut app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/validate", get(validate))
        .route("/api/compliance/analyze", post(analyze));
    for resource in [Resource::Processes, Resource::Policies, Resource::Rules] {
        app = app
            .route(
                &resource.collection_path(),
                get(move |State(backend): State<Backend>, headers: HeaderMap| async move {
                    list(backend, headers, resource).await
                })
                .post(
                    move |State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        create(backend, headers, resource, body).await
                    },
                ),
            )
            .route(
                &resource.item_path(":id"),
                put(
                    move |State(backend): State<Backend>,
                          Path(id): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        update(backend, headers, resource, id, body).await
                    },
                )
                .delete(
                    move |State(backend): State<Backend>, Path(id): Path<String>, headers: HeaderMap| async move {
                        remove(backend, headers, resource, id).await
                    },
                ),
            );
    }
    let app = app.with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        backend,
    }
}

/// Applies the configured delay and failure, then checks the bearer token.
async fn gate(backend: &Backend, headers: &HeaderMap, requires_auth: bool) -> Option<Response> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let (delay, fail_with, token) = {
        let mut data = backend.data();
        data.requests += 1;
        data.last_auth = presented.clone();
        (data.delay, data.fail_with, data.token.clone())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(code) = fail_with {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Some((status, "backend unavailable").into_response());
    }
    if requires_auth && presented.as_deref() != Some(format!("Bearer {token}").as_str()) {
        return Some((StatusCode::UNAUTHORIZED, "invalid token").into_response());
    }
    None
}

fn test_user(email: &str) -> Value {
    json!({ "id": 1, "email": email, "name": "Test User", "role": "admin" })
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = gate(&backend, &headers, false).await {
        return rejection;
    }
    if body["password"] != TEST_PASSWORD {
        return (StatusCode::UNAUTHORIZED, "bad credentials").into_response();
    }
    let token = backend.data().token.clone();
    let email = body["email"].as_str().unwrap_or_default();
    Json(json!({ "user": test_user(email), "token": token })).into_response()
}

async fn register(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = gate(&backend, &headers, false).await {
        return rejection;
    }
    let Some(email) = body["email"].as_str().filter(|email| !email.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "email required").into_response();
    };
    let token = backend.data().token.clone();
    Json(json!({ "user": test_user(email), "token": token })).into_response()
}

async fn validate(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    Json(test_user("user@example.com")).into_response()
}

async fn analyze(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    let process_id = body["processId"].clone();
    let matrix: Vec<Value> = body["policyIds"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|policy_id| {
            json!({
                "id": format!("row-{}", policy_id.as_str().unwrap_or_default()),
                "processId": process_id,
                "policyId": policy_id,
                "status": "compliant",
            })
        })
        .collect();
    Json(json!({
        "complianceMatrix": matrix,
        "wasteAnalysis": [{ "id": "waste-1", "step": "review", "kind": "waiting" }],
    }))
    .into_response()
}

async fn list(backend: Backend, headers: HeaderMap, resource: Resource) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    let mut data = backend.data();
    if let Some(raw) = data.raw_body.clone() {
        return (StatusCode::OK, raw).into_response();
    }
    Json(Value::Array(data.collection(resource).clone())).into_response()
}

async fn create(backend: Backend, headers: HeaderMap, resource: Resource, body: Value) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    let Value::Object(mut record) = body else {
        return (StatusCode::BAD_REQUEST, "expected an object").into_response();
    };
    let mut data = backend.data();
    data.next_id += 1;
    record.insert("id".to_string(), Value::String(data.next_id.to_string()));
    let record = Value::Object(record);
    data.collection(resource).push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update(backend: Backend, headers: HeaderMap, resource: Resource, id: String, body: Value) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    let patch: Map<String, Value> = match body {
        Value::Object(patch) => patch,
        _ => return (StatusCode::BAD_REQUEST, "expected an object").into_response(),
    };
    let mut data = backend.data();
    let revision = data.requests;
    let Some(record) = data
        .collection(resource)
        .iter_mut()
        .find(|record| record_id(record) == id)
    else {
        return (StatusCode::NOT_FOUND, "no such record").into_response();
    };
    if let Value::Object(fields) = record {
        for (key, value) in patch {
            if key != "id" {
                fields.insert(key, value);
            }
        }
        if resource == Resource::Processes {
            fields.insert("updatedAt".to_string(), json!(format!("rev-{revision}")));
        }
    }
    Json(record.clone()).into_response()
}

async fn remove(backend: Backend, headers: HeaderMap, resource: Resource, id: String) -> Response {
    if let Some(rejection) = gate(&backend, &headers, true).await {
        return rejection;
    }
    let mut data = backend.data();
    let records = data.collection(resource);
    let before = records.len();
    records.retain(|record| record_id(record) != id);
    if records.len() == before {
        return (StatusCode::NOT_FOUND, "no such record").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn record_id(record: &Value) -> String {
    match &record["id"] {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => String::new(),
    }
}
