//! The page as a pure projection of the session state.
//!
//! Nothing here holds state. The same [SessionState] and transaction markup always produce
//! the same page.

use maud::{DOCTYPE, Markup, html};

use crate::session::{Action, SessionState};

/// The CSS `display` value of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Shown as a block, used for the log-in form.
    Block,
    /// Shown inline, used for buttons.
    InlineBlock,
    /// Hidden.
    None,
}

impl Display {
    /// The inline `style` attribute value for this display.
    pub fn as_style(self) -> &'static str {
        match self {
            Display::Block => "display: block",
            Display::InlineBlock => "display: inline-block",
            Display::None => "display: none",
        }
    }
}

/// The visibility of each session control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// The username/password form.
    pub log_in_form: Display,
    /// The button that logs the user out.
    pub log_out_button: Display,
    /// The button that starts the bank-link flow.
    pub link_button: Display,
}

impl From<SessionState> for Controls {
    fn from(state: SessionState) -> Self {
        let button = |action| {
            if state.allows(action) {
                Display::InlineBlock
            } else {
                Display::None
            }
        };

        Self {
            log_in_form: if state.allows(Action::LogIn) {
                Display::Block
            } else {
                Display::None
            },
            log_out_button: button(Action::LogOut),
            link_button: button(Action::LinkBankAccount),
        }
    }
}

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Render the whole page for `state` with `transactions` in the transaction container.
pub fn page(state: SessionState, transactions: &Markup) -> Markup {
    let controls = Controls::from(state);

    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Plaid Link Demo" }
                link href=(BOOTSTRAP_CSS) rel="stylesheet";
            }

            body class="container py-4"
            {
                h1 class="mb-4" { "Bank Transactions" }

                form id="login-form" style=(controls.log_in_form.as_style())
                {
                    div class="mb-3"
                    {
                        label for="username" class="form-label" { "Username" }
                        input type="text" id="username" name="username" class="form-control" required;
                    }

                    div class="mb-3"
                    {
                        label for="password" class="form-label" { "Password" }
                        input type="password" id="password" name="password" class="form-control" required;
                    }

                    button type="submit" class="btn btn-primary" { "Log in" }
                }

                button
                    id="logout-btn"
                    type="button"
                    class="btn btn-secondary me-2"
                    style=(controls.log_out_button.as_style())
                {
                    "Log out"
                }

                button
                    id="link-btn"
                    type="button"
                    class="btn btn-success"
                    style=(controls.link_button.as_style())
                {
                    "Link bank account"
                }

                div id="transactions-list" class="mt-4" { (transactions) }
            }
        }
    }
}
