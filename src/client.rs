//! The single owner of the client's state.

use maud::{Markup, PreEscaped};

use crate::{
    Error,
    gateway::{Gateway, GatewayError},
    link::LinkProvider,
    notice::{GENERIC_ERROR_NOTICE, Notifier},
    session::{Action, SessionState},
    view,
};

/// Drives the session, bank-link and transaction flows against the backend.
///
/// The session operations live in the session module, the bank-link flow in the link module
/// and the transaction fetch in the transaction module. Each one takes `&mut self`, so a
/// second action cannot start until the first one has finished.
pub struct Client<L, N> {
    pub(crate) gateway: Gateway,
    pub(crate) link_provider: L,
    pub(crate) notifier: N,
    pub(crate) state: SessionState,
    /// The current contents of the transaction container.
    pub(crate) transactions: Markup,
}

impl<L, N> Client<L, N>
where
    L: LinkProvider,
    N: Notifier,
{
    /// Create a logged-out client with an empty transaction container.
    pub fn new(gateway: Gateway, link_provider: L, notifier: N) -> Self {
        Self {
            gateway,
            link_provider,
            notifier,
            state: SessionState::LoggedOut,
            transactions: PreEscaped(String::new()),
        }
    }

    /// The last acknowledged session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The markup currently shown in the transaction container.
    pub fn transactions(&self) -> &Markup {
        &self.transactions
    }

    /// The full page for the current state.
    pub fn page(&self) -> Markup {
        view::page(self.state, &self.transactions)
    }

    /// The gateway used for every backend request.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The provider that hosts bank-link sessions.
    pub fn link_provider(&self) -> &L {
        &self.link_provider
    }

    /// The channel that user-facing notices are sent to.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub(crate) fn ensure_available(&self, action: Action) -> Result<(), Error> {
        if self.state.allows(action) {
            Ok(())
        } else {
            Err(Error::Unavailable {
                action,
                state: self.state,
            })
        }
    }

    /// Show the generic error notice for a failed request and wrap the failure.
    ///
    /// The gateway has already logged the failure.
    pub(crate) fn report_failure(&mut self, error: GatewayError) -> Error {
        self.notifier.notify(GENERIC_ERROR_NOTICE);
        Error::Gateway(error)
    }
}
