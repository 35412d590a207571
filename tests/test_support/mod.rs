#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use schoold::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Method, Transport};
use schoold::ipc::{AppState, Request};
use schoold::session::{Credentials, Session};

enum Canned {
    Reply(ApiResponse),
    Unreachable,
}

/// In-memory backend: canned replies per (method, path), every request
/// recorded. Unrouted requests get a 404 with a `detail`.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert((method, path.to_string()), Canned::Reply(ApiResponse { status, body }));
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) {
        self.on(method, path, 200, body);
    }

    pub fn unreachable(&self, method: Method, path: &str) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert((method, path.to_string()), Canned::Unreachable);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.seen.lock().expect("seen lock").clear();
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.seen.lock().expect("seen lock").push(req.clone());
        let routes = self.routes.lock().expect("routes lock");
        match routes.get(&(req.method, req.path.clone())) {
            Some(Canned::Reply(resp)) => Ok(resp.clone()),
            Some(Canned::Unreachable) => Err(ApiError::Transport("connection refused".to_string())),
            None => Ok(ApiResponse {
                status: 404,
                body: json!({ "detail": "Not Found" }),
            }),
        }
    }
}

pub const TOKEN: &str = "test-token";

pub fn client(fake: &Arc<FakeTransport>) -> ApiClient {
    let transport: Arc<dyn Transport> = fake.clone();
    ApiClient::new(transport).with_token(Some(TOKEN.to_string()))
}

pub fn user_json(role: &str) -> Value {
    json!({
        "id": format!("u-{}", role),
        "username": role,
        "name": format!("{} user", role),
        "email": format!("{}@school.test", role),
        "role": role,
    })
}

pub fn login_reply(fake: &FakeTransport, role: &str) {
    fake.ok(
        Method::Post,
        "/auth/login",
        json!({ "access_token": TOKEN, "token_type": "bearer", "user": user_json(role) }),
    );
}

pub async fn signed_in_session(fake: &Arc<FakeTransport>, role: &str) -> Session {
    login_reply(fake, role);
    let mut session = Session::default();
    session
        .login(
            &client(fake),
            &Credentials {
                username: role.to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .expect("login");
    session
}

/// Library-level sidecar state backed by `fake`, signed in as `role`.
pub async fn state_as(fake: &Arc<FakeTransport>, role: &str) -> AppState {
    let transport: Arc<dyn Transport> = fake.clone();
    let mut state = AppState::new(ApiClient::new(transport));
    state.session = signed_in_session(fake, role).await;
    fake.clear_requests();
    state
}

pub fn req(id: &str, method: &str, params: Value) -> Request {
    Request {
        id: id.to_string(),
        method: method.to_string(),
        params,
    }
}

pub fn notice_messages(resp: &Value) -> Vec<String> {
    resp.get("notices")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|n| n.get("message").and_then(|m| m.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn error_code(resp: &Value) -> Option<&str> {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    // Port 9 (discard) refuses connections, so backend calls fail fast.
    let mut child = Command::new(exe)
        .args(["--api-url", "http://127.0.0.1:9", "--log-level", "off"])
        .env_remove("SCHOOLD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}
