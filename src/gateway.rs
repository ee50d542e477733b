//! A thin JSON-over-HTTP wrapper around the backend API.
//!
//! Every request goes to the gateway's fixed origin with a `Content-Type: application/json`
//! header. Failures are logged here, once, and handed back to the caller as a
//! [GatewayError] so that each controller can decide what the user should see.

use std::{net::IpAddr, time::Duration};

use reqwest::{Method, Url, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// How long to wait for the backend before a request is treated as a transport failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The ways a request to the backend can fail.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The origin could not be parsed as a base URL.
    #[error("invalid origin \"{0}\"")]
    InvalidOrigin(String),

    /// The backend answered with a non-2xx status.
    ///
    /// `detail` holds the `error` field of the response body, if the backend sent one.
    #[error("Error: {status_text} ({status}){}", format_detail(.detail))]
    Remote {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase for `status`, e.g. "Unauthorized".
        status_text: String,
        /// The backend's own description of the error.
        detail: Option<String>,
    },

    /// The request could not be sent or the response could not be read.
    #[error("could not reach the backend: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("could not decode the response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized as JSON.
    #[error("could not encode the request body: {0}")]
    Encode(#[source] serde_json::Error),
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

/// Issues JSON requests to the backend at a fixed origin.
///
/// The gateway keeps a cookie store so that the session cookie set at log-in is sent with
/// every later request, the same way a browser would.
#[derive(Debug, Clone)]
pub struct Gateway {
    origin: String,
    client: reqwest::Client,
}

impl Gateway {
    /// Create a gateway for the backend at `origin`, e.g. `http://127.0.0.1:5000`.
    ///
    /// # Errors
    /// Returns [GatewayError::InvalidOrigin] if `origin` is not an absolute URL and
    /// [GatewayError::Transport] if the HTTP client could not be built.
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let url =
            Url::parse(origin).map_err(|_| GatewayError::InvalidOrigin(origin.to_owned()))?;

        if url.cannot_be_a_base() {
            return Err(GatewayError::InvalidOrigin(origin.to_owned()));
        }

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout);

        // Local backends are never reached through a proxy.
        if is_loopback(&url) {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(GatewayError::Transport)?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// The origin that every endpoint is appended to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Send a GET request without a body.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        self.request::<T, ()>(endpoint, Method::GET, None).await
    }

    /// Send a POST request without a body.
    pub async fn post<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        self.request::<T, ()>(endpoint, Method::POST, None).await
    }

    /// Send a POST request with `body` serialized as JSON.
    pub async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, Method::POST, Some(body)).await
    }

    async fn request<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!("Sending {method} {endpoint}");

        let result = self.send(endpoint, method.clone(), body).await;

        if let Err(error) = &result {
            tracing::error!("API request {method} {endpoint} failed: {error}");
        }

        result
    }

    async fn send<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{endpoint}", self.origin);
        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            let body_text = serde_json::to_string(body).map_err(GatewayError::Encode)?;
            request = request.body(body_text);
        }

        let response = request.send().await.map_err(GatewayError::Transport)?;
        let status = response.status();
        let body_text = response.text().await.map_err(GatewayError::Transport)?;

        if !status.is_success() {
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                detail: error_detail(&body_text),
            });
        }

        serde_json::from_str(&body_text).map_err(GatewayError::Decode)
    }
}

fn is_loopback(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        host == "localhost"
            || host
                .trim_matches(['[', ']'])
                .parse::<IpAddr>()
                .is_ok_and(|ip| ip.is_loopback())
    })
}

/// The error body the backend sends alongside non-2xx statuses.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

fn error_detail(body_text: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body_text)
        .ok()
        .and_then(|body| body.error)
}
