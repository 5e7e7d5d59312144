use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request received by a [`MockProvider`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Value,
}

impl RecordedRequest {
    /// The credential sent under `id_token` or `access_token`.
    pub fn token(&self) -> Option<&str> {
        self.body
            .get("id_token")
            .or_else(|| self.body.get("access_token"))
            .and_then(Value::as_str)
    }
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct ProviderState {
    default: Option<Canned>,
    by_token: HashMap<String, Canned>,
    requests: Vec<RecordedRequest>,
}

/// Stand-in for the identity provider: an axum server on an ephemeral
/// local port answering every path with canned responses.
///
/// Responses are picked by the credential in the request body; anything
/// unmatched gets the default response, which is `401` until set.
pub struct MockProvider {
    addr: SocketAddr,
    state: Arc<Mutex<ProviderState>>,
    task: JoinHandle<()>,
}

impl MockProvider {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(ProviderState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock provider");
        let addr = listener.local_addr().expect("no local address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of `path` on this server (`"tokeninfo"` or `"/tokeninfo"`).
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Response for credentials without a dedicated one.
    pub fn respond(&self, status: StatusCode, body: impl Into<String>) -> &Self {
        self.lock().default = Some(Canned {
            status,
            body: body.into(),
        });
        self
    }

    /// Response for one credential.
    pub fn respond_for(&self, token: &str, status: StatusCode, body: impl Into<String>) -> &Self {
        self.lock().by_token.insert(
            token.to_string(),
            Canned {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// `200` with the JSON of `profile` for `token`.
    pub fn profile_for(&self, token: &str, profile: &impl serde::Serialize) -> &Self {
        let body = serde_json::to_string(profile).expect("profile serializes");
        self.respond_for(token, StatusCode::OK, body)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn hits(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requests that carried `token`.
    pub fn hits_for(&self, token: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.token() == Some(token))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        self.state.lock().expect("mock provider lock poisoned")
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(State(state): State<Arc<Mutex<ProviderState>>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        content_type: parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    };

    let canned = {
        let mut state = state.lock().expect("mock provider lock poisoned");
        let canned = recorded
            .token()
            .and_then(|t| state.by_token.get(t))
            .or(state.default.as_ref())
            .cloned();
        state.requests.push(recorded);
        canned
    };

    match canned {
        Some(c) => Response::builder()
            .status(c.status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(c.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// URL on a local port nothing listens on, for transport failures.
pub async fn unreachable_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let addr = listener.local_addr().expect("no local address");
    drop(listener);
    format!("http://{addr}/{}", path.trim_start_matches('/'))
}
