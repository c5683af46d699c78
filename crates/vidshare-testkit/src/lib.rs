//! In-process stand-in for the video API, for integration tests.
//!
//! Every request is recorded (method, path, `Authorization` header, JSON or
//! multipart body) before the canned response for its route is returned.
//! Unregistered routes answer 404.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::debug;

pub use axum::http::Method;

#[derive(Debug, Clone)]
pub struct RecordedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RecordedBody {
    Empty,
    Json(Value),
    Multipart(Vec<RecordedPart>),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: RecordedBody,
}

impl RecordedRequest {
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RecordedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn part(&self, name: &str) -> Option<&RecordedPart> {
        match &self.body {
            RecordedBody::Multipart(parts) => parts.iter().find(|p| p.name == name),
            _ => None,
        }
    }

    pub fn text_field(&self, name: &str) -> Option<String> {
        self.part(name)
            .map(|p| String::from_utf8_lossy(&p.data).into_owned())
    }
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Value,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Mutex<Duration>,
}

pub struct MockApi {
    pub base_url: String,
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock api server");
        });

        Self {
            base_url: format!("http://{}", addr),
            addr,
            state,
        }
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Canned { status, body });
    }

    /// Hold every response for `delay` after recording the request.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn handle(State(state): State<Arc<MockState>>, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let body = if is_multipart {
        let mut multipart = match Multipart::from_request(req, &()).await {
            Ok(m) => m,
            Err(rejection) => return rejection.into_response(),
        };
        let mut parts = Vec::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            parts.push(RecordedPart {
                name,
                file_name,
                content_type,
                data,
            });
        }
        RecordedBody::Multipart(parts)
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        if bytes.is_empty() {
            RecordedBody::Empty
        } else {
            RecordedBody::Json(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }
    };

    debug!("mock api: {} {}", method, path);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization,
        body,
    });

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let canned = state.routes.lock().unwrap().get(&(method.clone(), path.clone())).cloned();
    match canned {
        Some(Canned { status, body }) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("no mock for {} {}", method, path) })),
        )
            .into_response(),
    }
}
