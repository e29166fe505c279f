use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::info;

/// Canned response served for a path.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: String,
}

impl Reply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, Some("application/json"), body.to_string())
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some("text/plain; charset=utf-8"), body.into())
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some("text/html; charset=utf-8"), body.into())
    }

    pub fn bytes(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some("application/octet-stream"), body.into())
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, None, String::new())
    }

    fn new(status: u16, content_type: Option<&'static str>, body: String) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        Self {
            status,
            content_type,
            body,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(content_type) => {
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            None => {
                response.headers_mut().remove(CONTENT_TYPE);
            }
        }
        response
    }
}

/// A request as seen by the backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, Default)]
struct BackendState {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// In-process backend answering scripted replies, 404 otherwise.
#[derive(Debug, Clone)]
pub struct TestBackend {
    addr: SocketAddr,
    state: BackendState,
}

impl TestBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = BackendState::default();

        let router = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("backend running");
        });
        info!(%addr, "test backend started");

        Ok(Self { addr, state })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Serves `reply` for every request on `path`, whatever the method.
    pub fn reply(&self, path: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .expect("replies lock")
            .insert(path.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests()
            .pop()
            .expect("at least one request received")
    }
}

async fn handle(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reply = state
        .replies
        .lock()
        .expect("replies lock")
        .get(uri.path())
        .cloned()
        .unwrap_or_else(|| Reply::empty(404));

    state.requests.lock().expect("requests lock").push(Recorded {
        method,
        uri,
        headers,
        body,
    });

    reply.into_response()
}
