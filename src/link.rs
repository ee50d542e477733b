//! The bank-link flow.
//!
//! The backend issues a link token, a [LinkProvider] hosts the third-party widget with it and
//! reports back a single [LinkEvent]. A successful link yields a public token, which is
//! exchanged for an access token that the backend keeps.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::{
    Error,
    client::Client,
    endpoints,
    notice::{EXCHANGE_SUCCESS_NOTICE, Notifier},
    session::Action,
};

/// A single-use token that lets the widget open one link session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkToken(String);

impl LinkToken {
    /// Wrap a link token issued by the backend.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The token the widget hands back after the user linked an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicToken(String);

impl PublicToken {
    /// Wrap a public token produced by the widget.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The error the widget reports when the user leaves the flow because something went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkError {
    /// The broad category of the error, e.g. "ITEM_ERROR".
    pub error_type: Option<String>,
    /// The specific error code, e.g. "INVALID_CREDENTIALS".
    pub error_code: Option<String>,
    /// A developer-facing description.
    pub error_message: Option<String>,
    /// A user-facing description, if the widget provides one.
    pub display_message: Option<String>,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match (&self.error_type, &self.error_code) {
            (Some(error_type), Some(error_code)) => format!("{error_type}/{error_code}"),
            (Some(code), None) | (None, Some(code)) => code.clone(),
            (None, None) => "unknown error".to_owned(),
        };

        match &self.error_message {
            Some(message) => write!(f, "{code}: {message}"),
            None => write!(f, "{code}"),
        }
    }
}

/// How a link session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The user linked an account.
    Success {
        /// The token to exchange with the backend.
        public_token: PublicToken,
    },
    /// The user left the flow, possibly because of an error.
    Exit {
        /// Why the flow ended, if it ended because of an error.
        error: Option<LinkError>,
    },
}

/// Hosts bank-link widget sessions.
pub trait LinkProvider {
    /// The handle for one session.
    type Session: LinkSession;

    /// Set up a widget session for `token`. The session is not shown until
    /// [LinkSession::present] is called.
    fn create_session(&mut self, token: LinkToken) -> Self::Session;
}

/// A single widget session.
pub trait LinkSession {
    /// Show the widget to the user.
    ///
    /// The returned receiver resolves with the one event that ends the session. A session that
    /// drops the sender without sending is treated as an exit without an error.
    fn present(self) -> oneshot::Receiver<LinkEvent>;
}

/// The result of [Client::link_bank_account].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The public token was exchanged and the transactions were fetched.
    Linked,
    /// The backend did not return an access token for the public token.
    NotExchanged,
    /// The user left the widget without linking an account.
    Exited,
    /// The backend did not return a link token, so the widget was never shown.
    NoLinkToken,
}

#[derive(Deserialize)]
struct LinkTokenResponse {
    link_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    public_token: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
}

impl<L, N> Client<L, N>
where
    L: LinkProvider,
    N: Notifier,
{
    /// Run the whole bank-link flow: get a link token, present the widget and exchange the
    /// public token it returns.
    ///
    /// # Errors
    /// - [Error::Unavailable] if not logged in.
    /// - [Error::Gateway] if requesting the link token or exchanging the public token failed.
    ///   The user has been shown the generic error notice.
    pub async fn link_bank_account(&mut self) -> Result<LinkOutcome, Error> {
        let Some(link_token) = self.create_link_token().await? else {
            return Ok(LinkOutcome::NoLinkToken);
        };

        let events = self.link_provider.create_session(link_token).present();
        let event = events.await.unwrap_or_else(|_| {
            tracing::debug!("Link session closed without reporting an event");
            LinkEvent::Exit { error: None }
        });

        match event {
            LinkEvent::Success { public_token } => {
                if self.exchange_public_token(&public_token).await? {
                    Ok(LinkOutcome::Linked)
                } else {
                    Ok(LinkOutcome::NotExchanged)
                }
            }
            LinkEvent::Exit { error } => {
                match error {
                    Some(error) => tracing::error!("Bank link exited with an error: {error}"),
                    None => tracing::info!("Bank link closed by the user"),
                }

                Ok(LinkOutcome::Exited)
            }
        }
    }

    /// Ask the backend for a link token.
    ///
    /// Returns `None` if the backend's response has no link token.
    ///
    /// # Errors
    /// - [Error::Unavailable] if not logged in.
    /// - [Error::Gateway] if the request failed. The user has been shown the generic error
    ///   notice.
    pub async fn create_link_token(&mut self) -> Result<Option<LinkToken>, Error> {
        self.ensure_available(Action::LinkBankAccount)?;

        let result = self.gateway.post(endpoints::CREATE_LINK_TOKEN).await;
        let response: LinkTokenResponse = match result {
            Ok(response) => response,
            Err(error) => return Err(self.report_failure(error)),
        };

        let link_token = response
            .link_token
            .filter(|token| !token.is_empty())
            .map(LinkToken::new);

        if link_token.is_none() {
            tracing::warn!("Link token response had no link token");
        }

        Ok(link_token)
    }

    /// Exchange `public_token` for an access token held by the backend.
    ///
    /// On success the user is told and the transactions are fetched. Returns whether the
    /// backend reported an access token. A failed transaction fetch does not undo the exchange,
    /// it only shows the empty state and its own notice.
    ///
    /// # Errors
    /// - [Error::Unavailable] if not logged in.
    /// - [Error::Gateway] if the exchange request failed. The user has been shown the generic
    ///   error notice.
    pub async fn exchange_public_token(
        &mut self,
        public_token: &PublicToken,
    ) -> Result<bool, Error> {
        self.ensure_available(Action::LinkBankAccount)?;

        let request = ExchangeRequest {
            public_token: public_token.as_str(),
        };
        let result = self
            .gateway
            .post_json(endpoints::EXCHANGE_PUBLIC_TOKEN, &request)
            .await;
        let response: ExchangeResponse = match result {
            Ok(response) => response,
            Err(error) => return Err(self.report_failure(error)),
        };

        let has_access_token = response
            .access_token
            .is_some_and(|access_token| !access_token.is_empty());

        if !has_access_token {
            tracing::warn!("Exchange response had no access token");
            return Ok(false);
        }

        self.notifier.notify(EXCHANGE_SUCCESS_NOTICE);

        if let Err(error) = self.fetch_transactions().await {
            tracing::debug!("Fetching transactions after the exchange failed: {error}");
        }

        Ok(true)
    }
}
