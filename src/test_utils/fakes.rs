use std::collections::VecDeque;

use axum::http::Method;
use serde_json::json;
use tokio::sync::oneshot;

use crate::{
    Client, Credentials, DEFAULT_TIMEOUT, Gateway, LinkEvent, LinkProvider, LinkSession,
    LinkToken, Notifier, SessionState, endpoints,
};

use super::{FakeBackend, Reply};

pub(crate) type TestClient = Client<ScriptedLinkProvider, RecordingNotifier>;

/// Keeps every notice instead of showing it.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) messages: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

/// Ends each session with the next scripted event.
///
/// `None` drops the session's sender without sending anything.
#[derive(Debug, Default)]
pub(crate) struct ScriptedLinkProvider {
    events: VecDeque<Option<LinkEvent>>,
    pub(crate) tokens: Vec<LinkToken>,
}

impl ScriptedLinkProvider {
    pub(crate) fn new(events: Vec<Option<LinkEvent>>) -> Self {
        Self {
            events: events.into(),
            tokens: Vec::new(),
        }
    }
}

impl LinkProvider for ScriptedLinkProvider {
    type Session = ScriptedLinkSession;

    fn create_session(&mut self, token: LinkToken) -> Self::Session {
        self.tokens.push(token);

        ScriptedLinkSession {
            event: self.events.pop_front().flatten(),
        }
    }
}

pub(crate) struct ScriptedLinkSession {
    event: Option<LinkEvent>,
}

impl LinkSession for ScriptedLinkSession {
    fn present(self) -> oneshot::Receiver<LinkEvent> {
        let (sender, receiver) = oneshot::channel();

        if let Some(event) = self.event {
            sender.send(event).expect("Link event receiver dropped");
        }

        receiver
    }
}

pub(crate) fn test_client(origin: &str, link_events: Vec<Option<LinkEvent>>) -> TestClient {
    let gateway = Gateway::new(origin, DEFAULT_TIMEOUT).expect("Could not create test gateway");

    Client::new(
        gateway,
        ScriptedLinkProvider::new(link_events),
        RecordingNotifier::default(),
    )
}

pub(crate) fn log_in_reply() -> Reply {
    Reply::json(json!({"message": "Login successful"}))
}

/// Serve `backend` and log a client in against it.
///
/// `backend` must answer [endpoints::LOG_IN] with a message.
pub(crate) async fn logged_in_client(
    backend: &FakeBackend,
    link_events: Vec<Option<LinkEvent>>,
) -> TestClient {
    let mut client = test_client(&backend.serve().await, link_events);
    let credentials =
        Credentials::new("user_good", "pass_good").expect("Could not create test credentials");

    let state = client
        .log_in(credentials)
        .await
        .expect("Could not log in test client");

    assert_eq!(state, SessionState::LoggedIn);
    assert_eq!(backend.hits(Method::POST, endpoints::LOG_IN), 1);

    client
}
