//! Logging in and out of the backend session.
//!
//! The session has exactly two states. The client moves to [SessionState::LoggedIn] only when
//! the backend acknowledges a log-in with a message, and back to [SessionState::LoggedOut] only
//! when it acknowledges a log-out the same way. Anything else leaves the state alone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error, client::Client, endpoints, link::LinkProvider, notice::Notifier,
    transaction::clear_transactions,
};

/// Whether the backend has acknowledged a log-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session, only the log-in form is shown.
    #[default]
    LoggedOut,
    /// A session exists, the log-out and link controls are shown.
    LoggedIn,
}

impl SessionState {
    /// Whether the control for `action` is shown in this state.
    pub fn allows(self, action: Action) -> bool {
        matches!(
            (self, action),
            (SessionState::LoggedOut, Action::LogIn)
                | (
                    SessionState::LoggedIn,
                    Action::LogOut | Action::LinkBankAccount | Action::FetchTransactions
                )
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::LoggedOut => write!(f, "logged out"),
            SessionState::LoggedIn => write!(f, "logged in"),
        }
    }
}

/// The user-triggered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Submit the log-in form.
    LogIn,
    /// Click the log-out button.
    LogOut,
    /// Click the link button to start the bank-link flow.
    LinkBankAccount,
    /// Refresh the transaction list.
    FetchTransactions,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::LogIn => write!(f, "log in"),
            Action::LogOut => write!(f, "log out"),
            Action::LinkBankAccount => write!(f, "link a bank account"),
            Action::FetchTransactions => write!(f, "fetch transactions"),
        }
    }
}

/// The username and password entered in the log-in form.
///
/// Credentials are consumed by [Client::log_in] and never stored.
#[derive(Clone, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from the raw form input.
    ///
    /// # Errors
    /// Returns [Error::EmptyField] if either field is empty or only whitespace.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, Error> {
        let username = username.into();
        let password = password.into();

        if username.trim().is_empty() {
            return Err(Error::EmptyField("username"));
        }

        if password.is_empty() {
            return Err(Error::EmptyField("password"));
        }

        Ok(Self { username, password })
    }

    /// The username entered in the form.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// The acknowledgement the backend sends for log-in and log-out.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

impl MessageResponse {
    fn into_message(self) -> Option<String> {
        self.message.filter(|message| !message.is_empty())
    }
}

impl<L, N> Client<L, N>
where
    L: LinkProvider,
    N: Notifier,
{
    /// Log in with `credentials`.
    ///
    /// On an acknowledged log-in the state becomes [SessionState::LoggedIn] and the backend's
    /// message is shown to the user. A response without a message leaves the state unchanged.
    ///
    /// # Errors
    /// - [Error::Unavailable] if already logged in.
    /// - [Error::Gateway] if the request failed. The user has been shown the generic error
    ///   notice and the state is unchanged.
    pub async fn log_in(&mut self, credentials: Credentials) -> Result<SessionState, Error> {
        self.ensure_available(Action::LogIn)?;
        tracing::debug!("Logging in as {}", credentials.username());

        let result = self.gateway.post_json(endpoints::LOG_IN, &credentials).await;
        let response: MessageResponse = match result {
            Ok(response) => response,
            Err(error) => return Err(self.report_failure(error)),
        };

        match response.into_message() {
            Some(message) => {
                self.state = SessionState::LoggedIn;
                tracing::info!("Logged in as {}", credentials.username());
                self.notifier.notify(&message);
            }
            None => tracing::warn!("Log-in response had no message, staying logged out"),
        }

        Ok(self.state)
    }

    /// Log out of the backend session.
    ///
    /// On an acknowledged log-out the state becomes [SessionState::LoggedOut], the transaction
    /// container is cleared and the backend's message is shown to the user.
    ///
    /// # Errors
    /// - [Error::Unavailable] if not logged in.
    /// - [Error::Gateway] if the request failed. The user has been shown the generic error
    ///   notice and the state is unchanged.
    pub async fn log_out(&mut self) -> Result<SessionState, Error> {
        self.ensure_available(Action::LogOut)?;

        let result = self.gateway.post(endpoints::LOG_OUT).await;
        let response: MessageResponse = match result {
            Ok(response) => response,
            Err(error) => return Err(self.report_failure(error)),
        };

        match response.into_message() {
            Some(message) => {
                self.state = SessionState::LoggedOut;
                clear_transactions(&mut self.transactions);
                tracing::info!("Logged out");
                self.notifier.notify(&message);
            }
            None => tracing::warn!("Log-out response had no message, staying logged in"),
        }

        Ok(self.state)
    }
}
