// Allow dead code: not every test binary uses every helper
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use taskdeck::api::ApiClient;
use taskdeck::auth::Session;

pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "correct-horse-battery";

/// Token accepted by the stub at startup.
pub const INITIAL_TOKEN: &str = "token-0";
/// Token handed out (and normally accepted) after a refresh.
pub const ROTATED_TOKEN: &str = "token-1";
/// A token the stub never accepts.
pub const STALE_TOKEN: &str = "stale-token";

/// Stand-in for the remote Todolist API with adjustable behavior and
/// call accounting, so tests can assert on refresh/retry traffic.
pub struct ApiStub {
    pub valid_token: Mutex<String>,
    pub next_token: Mutex<String>,
    /// Whether auth/refresh succeeds.
    pub refresh_ok: AtomicBool,
    /// Whether a successful refresh also makes the new token valid.
    /// Turned off to simulate a retry that fails again with 401.
    pub rotate_on_refresh: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    /// Authorization bearer seen by each todolist/get call, in order.
    pub list_bearers: Mutex<Vec<Option<String>>>,
    pub todos: Mutex<Vec<Value>>,
    pub user_name: Mutex<String>,
    pub password: Mutex<String>,
    next_id: AtomicUsize,
}

impl ApiStub {
    fn new() -> Self {
        Self {
            valid_token: Mutex::new(INITIAL_TOKEN.to_string()),
            next_token: Mutex::new(ROTATED_TOKEN.to_string()),
            refresh_ok: AtomicBool::new(true),
            rotate_on_refresh: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            list_bearers: Mutex::new(Vec::new()),
            todos: Mutex::new(Vec::new()),
            user_name: Mutex::new("Alice Example".to_string()),
            password: Mutex::new(PASSWORD.to_string()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn seed_todo(&self, text: &str) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.todos
            .lock()
            .unwrap()
            .push(json!({"id": id, "todo": text, "isDone": false}));
        id
    }

    pub fn last_list_bearer(&self) -> Option<String> {
        self.list_bearers.lock().unwrap().last().cloned().flatten()
    }

    pub fn list_bearers_seen(&self) -> Vec<Option<String>> {
        self.list_bearers.lock().unwrap().clone()
    }
}

type SharedStub = Arc<ApiStub>;

pub struct TestApp {
    pub base_url: String,
    pub stub: SharedStub,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let stub = Arc::new(ApiStub::new());
        let router = router(Arc::clone(&stub));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/api"),
            stub,
        }
    }

    /// Client whose session already holds the stub's valid token.
    pub fn authed_client(&self) -> (ApiClient, Session) {
        self.client_with_token(Some(INITIAL_TOKEN))
    }

    /// Client with no stored credential.
    pub fn anon_client(&self) -> (ApiClient, Session) {
        self.client_with_token(None)
    }

    pub fn client_with_token(&self, token: Option<&str>) -> (ApiClient, Session) {
        let session = Session::in_memory();
        if let Some(token) = token {
            session.set_token(token.to_string());
        }
        let client = ApiClient::new(self.base_url.clone(), session.clone()).unwrap();
        (client, session)
    }
}

fn router(stub: SharedStub) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/user/current", get(current_user).patch(update_user))
        .route("/api/user/change-password", post(change_password))
        .route("/api/todolist/get", get(get_todos))
        .route("/api/todolist/get-order-by-name", get(get_todos_by_name))
        .route("/api/todolist/get-order-by-done", get(get_todos_by_done))
        .route("/api/todolist/add", post(add_todo))
        .route("/api/todolist/update/{id}", axum::routing::put(update_todo))
        .route("/api/todolist/delete/{id}", delete(delete_todo))
        .route("/api/todolist/delete-all", delete(delete_all))
        .with_state(stub)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authorized(stub: &ApiStub, headers: &HeaderMap) -> bool {
    bearer(headers).as_deref() == Some(stub.valid_token.lock().unwrap().as_str())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": "Invalid token"})),
    )
}

async fn login(
    State(stub): State<SharedStub>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let password_ok = body["password"] == stub.password.lock().unwrap().as_str();
    if body["email"] == EMAIL && password_ok {
        let token = stub.valid_token.lock().unwrap().clone();
        (
            StatusCode::OK,
            Json(json!({"data": {"accessToken": token}, "message": "Berhasil Login"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": "Incorrect username or password"})),
        )
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == EMAIL {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": "Email Already Exists"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"message": "Success Register"})))
    }
}

async fn refresh(State(stub): State<SharedStub>) -> (StatusCode, Json<Value>) {
    stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // widen the window so overlapping refresh attempts would show up
    // in the call count
    tokio::time::sleep(Duration::from_millis(25)).await;

    if !stub.refresh_ok.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": "token jwt expired"})),
        );
    }

    let token = stub.next_token.lock().unwrap().clone();
    if stub.rotate_on_refresh.load(Ordering::SeqCst) {
        *stub.valid_token.lock().unwrap() = token.clone();
    }
    (
        StatusCode::OK,
        Json(json!({"data": {"accessToken": token}})),
    )
}

async fn logout() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"message": "Logout Success"})))
}

async fn current_user(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let name = stub.user_name.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({"data": {"name": name, "email": EMAIL}})),
    )
}

async fn update_user(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    *stub.user_name.lock().unwrap() = name.clone();
    (
        StatusCode::OK,
        Json(json!({
            "data": {"name": name, "email": EMAIL},
            "message": "Update User Success"
        })),
    )
}

async fn change_password(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let stored = stub.password.lock().unwrap().clone();
    if body["oldPassword"] != stored.as_str() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": "old password does not match"})),
        );
    }
    if body["newPassword"] != body["confirmPassword"] {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": "password confirmation does not match"})),
        );
    }
    let new_password = body["newPassword"].as_str().unwrap_or_default().to_string();
    *stub.password.lock().unwrap() = new_password;
    (
        StatusCode::OK,
        Json(json!({"message": "Change Password Success"})),
    )
}

async fn get_todos(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    stub.list_calls.fetch_add(1, Ordering::SeqCst);
    stub.list_bearers.lock().unwrap().push(bearer(&headers));
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let todos = stub.todos.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({"data": todos})))
}

async fn get_todos_by_name(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let mut todos = stub.todos.lock().unwrap().clone();
    todos.sort_by(|a, b| a["todo"].as_str().cmp(&b["todo"].as_str()));
    (StatusCode::OK, Json(json!({"data": todos})))
}

async fn get_todos_by_done(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let mut todos = stub.todos.lock().unwrap().clone();
    todos.sort_by_key(|todo| todo["isDone"].as_bool().unwrap_or(false));
    (StatusCode::OK, Json(json!({"data": todos})))
}

async fn add_todo(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let text = body["todo"].as_str().unwrap_or_default().to_string();
    let id = stub.next_id.fetch_add(1, Ordering::SeqCst).to_string();
    let todo = json!({"id": id, "todo": text, "isDone": false});
    stub.todos.lock().unwrap().push(todo.clone());
    (
        StatusCode::OK,
        Json(json!({"data": todo, "message": "Success Add Todolist"})),
    )
}

async fn update_todo(
    State(stub): State<SharedStub>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let mut todos = stub.todos.lock().unwrap();
    match todos.iter_mut().find(|todo| todo["id"] == id.as_str()) {
        Some(item) => {
            item["todo"] = body["todo"].clone();
            item["isDone"] = body["isDone"].clone();
            (
                StatusCode::OK,
                Json(json!({"data": item.clone(), "message": "Success Update Todolist"})),
            )
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"errors": "Todolist Not Found"})),
        ),
    }
}

async fn delete_todo(
    State(stub): State<SharedStub>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    let mut todos = stub.todos.lock().unwrap();
    let before = todos.len();
    todos.retain(|todo| todo["id"] != id.as_str());
    if todos.len() < before {
        (
            StatusCode::OK,
            Json(json!({"message": "Success Delete Todolist"})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"errors": "Todolist Not Found"})),
        )
    }
}

async fn delete_all(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&stub, &headers) {
        return unauthorized();
    }
    stub.todos.lock().unwrap().clear();
    (
        StatusCode::OK,
        Json(json!({"message": "Success Delete All Todolist"})),
    )
}
