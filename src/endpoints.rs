//! The backend API endpoint URIs.
//!
//! All endpoints are relative to the gateway's origin.

/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/logout";
/// The route that issues a single-use link token for the bank-link widget.
pub const CREATE_LINK_TOKEN: &str = "/create_link_token";
/// The route that swaps a widget public token for a server-side access token.
pub const EXCHANGE_PUBLIC_TOKEN: &str = "/exchange_public_token";
/// The route for fetching the linked account's transactions.
pub const TRANSACTIONS: &str = "/transactions";
