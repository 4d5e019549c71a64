//! In-process mock of the scholarship backend for tests.
//!
//! Every request is recorded (multipart bodies are split into fields) and
//! answered from a canned `(method, path) -> (status, json)` table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Bytes,
    pub fields: Vec<(String, Bytes)>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn field(&self, name: &str) -> Option<&Bytes> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.recorded.lock().unwrap().clone()
    }

    pub fn hits(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    // `&Request` is not `Send`; the borrow must end before the first await.
    let (authorization, content_type, request_id) = {
        let headers = request.headers();
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        (
            header_value(header::AUTHORIZATION),
            header_value(header::CONTENT_TYPE),
            header_value(header::HeaderName::from_static("x-request-id")),
        )
    };

    let is_multipart = content_type
        .as_deref()
        .is_some_and(|c| c.starts_with("multipart/form-data"));

    let (body, fields) = if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let data = field.bytes().await.unwrap();
            fields.push((name, data));
        }
        (Bytes::new(), fields)
    } else {
        (to_bytes(request.into_body(), usize::MAX).await.unwrap(), Vec::new())
    };

    state.recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query,
        authorization,
        content_type,
        request_id,
        body,
        fields,
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned();
    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "no mock route" })),
        )
            .into_response(),
    }
}
