//! A scripted stand-in for the backend, served over real HTTP on an ephemeral port.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::State,
    http::{
        HeaderMap, Method, StatusCode, Uri,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// The canned response for one route.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: StatusCode,
    body: String,
    set_cookie: Option<&'static str>,
    required_cookie: Option<&'static str>,
}

impl Reply {
    pub(crate) fn json(body: Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub(crate) fn with_status(status: StatusCode, body: Value) -> Self {
        Self::raw(status, &body.to_string())
    }

    pub(crate) fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            set_cookie: None,
            required_cookie: None,
        }
    }

    /// Send `cookie` in a `Set-Cookie` header.
    pub(crate) fn set_cookie(mut self, cookie: &'static str) -> Self {
        self.set_cookie = Some(cookie);
        self
    }

    /// Answer 401 unless the request presents `cookie`.
    pub(crate) fn require_cookie(mut self, cookie: &'static str) -> Self {
        self.required_cookie = Some(cookie);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) content_type: Option<String>,
    pub(crate) body: String,
}

/// Answers each `(method, path)` with a fixed [Reply] and records every request it gets.
///
/// Unknown routes get a 404.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeBackend {
    routes: HashMap<(Method, String), Reply>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(mut self, method: Method, path: &str, reply: Reply) -> Self {
        self.routes.insert((method, path.to_owned()), reply);
        self
    }

    /// Start serving on 127.0.0.1 and return the origin to point a gateway at.
    pub(crate) async fn serve(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind test backend");
        let address = listener
            .local_addr()
            .expect("Could not get test backend address");
        let router = Router::new().fallback(respond).with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test backend stopped unexpectedly");
        });

        format!("http://{address}")
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("Could not acquire lock to recorded requests")
            .clone()
    }

    pub(crate) fn hits(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }
}

async fn respond(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_owned();

    backend
        .requests
        .lock()
        .expect("Could not acquire lock to recorded requests")
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            body,
        });

    let Some(reply) = backend.routes.get(&(method, path)) else {
        return json_response(StatusCode::NOT_FOUND, json!({"error": "not found"}).to_string());
    };

    if let Some(required_cookie) = reply.required_cookie {
        let presented = headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !presented.split("; ").any(|cookie| cookie == required_cookie) {
            return json_response(
                StatusCode::UNAUTHORIZED,
                json!({"error": "Access token not found"}).to_string(),
            );
        }
    }

    let mut response = json_response(reply.status, reply.body.clone());

    if let Some(cookie) = reply.set_cookie {
        response.headers_mut().insert(
            SET_COOKIE,
            cookie.parse().expect("Invalid test cookie header"),
        );
    }

    response
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

/// An origin that refuses connections.
pub(crate) async fn unreachable_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind throwaway listener");
    let address = listener
        .local_addr()
        .expect("Could not get throwaway listener address");
    drop(listener);

    format!("http://{address}")
}
