//! A client for the Plaid bank-linking demo backend.
//!
//! The client logs a user in against the backend's session API, runs the bank-link flow
//! through a pluggable [LinkProvider], exchanges the resulting public token and renders the
//! linked account's transactions as HTML.
//!
//! All state lives in a single [Client]. The page shown to the user is a pure projection of
//! that state, see [view::page].

#![warn(missing_docs)]

mod client;
pub mod console;
pub mod endpoints;
mod gateway;
mod link;
mod notice;
mod session;
mod transaction;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use client::Client;
pub use gateway::{DEFAULT_TIMEOUT, Gateway, GatewayError};
pub use link::{
    LinkError, LinkEvent, LinkOutcome, LinkProvider, LinkSession, LinkToken, PublicToken,
};
pub use notice::{EXCHANGE_SUCCESS_NOTICE, GENERIC_ERROR_NOTICE, Notifier};
pub use session::{Action, Credentials, SessionState};
pub use transaction::{NO_TRANSACTIONS_NOTICE, Transaction, format_amount, render};

/// The errors that may occur while driving the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request to the backend failed.
    ///
    /// The failure has already been logged and the user has already been notified by the time
    /// the caller sees this error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A required input field was left empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The action's control is not shown in the current session state, e.g. logging out
    /// while logged out. No request is sent.
    #[error("cannot {action} while {state}")]
    Unavailable {
        /// The action that was attempted.
        action: Action,
        /// The session state at the time of the attempt.
        state: SessionState,
    },
}
