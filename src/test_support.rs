//! Scripted collaborators shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::error::ApiError;
use crate::net::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::session::{Navigator, Notice, Notifier};

pub const BASE_URL: &str = "http://api.test";

pub fn client_config() -> crate::config::ClientConfig {
    crate::config::ClientConfig { api_base_url: BASE_URL.to_owned() }
}

// =============================================================================
// TRANSPORT
// =============================================================================

struct Reply {
    gate: Option<Arc<Notify>>,
    result: Result<ApiResponse, ApiError>,
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// Transport answering from per-route reply queues and recording every request.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        if let Some(route) = routes.iter_mut().find(|r| r.method == method && r.path == path) {
            route.replies.push_back(reply);
            return;
        }
        routes.push(Route { method, path: path.to_owned(), replies: VecDeque::from([reply]) });
    }

    /// Queue a JSON response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        let response = ApiResponse { status, body: body.to_string() };
        self.push(method, path, Reply { gate: None, result: Ok(response) });
    }

    /// Queue a response that is only delivered once the returned gate is notified.
    pub fn respond_gated(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let response = ApiResponse { status, body: body.to_string() };
        self.push(method, path, Reply { gate: Some(gate.clone()), result: Ok(response) });
        gate
    }

    /// Queue a transport-level failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Reply { gate: None, result: Err(ApiError::Request(message.to_owned())) });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

#[cfg_attr(feature = "hydrate", async_trait::async_trait(?Send))]
#[cfg_attr(not(feature = "hydrate"), async_trait::async_trait)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let reply = {
            self.requests.lock().unwrap().push(request.clone());
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.method == request.method && request.url.ends_with(&r.path))
                .and_then(|r| r.replies.pop_front())
        };
        let Some(reply) = reply else {
            return Err(ApiError::Request(format!("no scripted reply for {}", request.url)));
        };
        if let Some(gate) = reply.gate {
            gate.notified().await;
        }
        reply.result
    }
}

// =============================================================================
// NAVIGATION + NOTICES
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visits.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
