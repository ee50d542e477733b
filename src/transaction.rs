//! Fetching and rendering the linked account's transactions.

use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error, client::Client, endpoints, link::LinkProvider, notice::Notifier, session::Action,
};

/// Shown in place of the transaction list when there is nothing to show.
pub const NO_TRANSACTIONS_NOTICE: &str =
    "No transactions found. Please ensure you connected a sandbox bank account with test data.";

/// A transaction as reported by the backend.
///
/// Fields the client does not display are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The cleaned-up merchant name, if the bank could identify one.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// The raw transaction description.
    pub name: String,
    /// The signed amount. Only the absolute value is displayed.
    pub amount: f64,
    /// The posting date, displayed as given.
    pub date: String,
    /// The category hierarchy, most general first.
    #[serde(default)]
    pub category: Option<Vec<String>>,
}

impl Transaction {
    /// The merchant name if there is one, otherwise the raw name.
    pub fn display_name(&self) -> &str {
        match self.merchant_name.as_deref() {
            Some(merchant_name) if !merchant_name.is_empty() => merchant_name,
            _ => &self.name,
        }
    }

}

/// Format the absolute value of `amount` as dollars with exactly two decimal places,
/// e.g. `-4.5` becomes `$4.50`.
///
/// Amounts exactly halfway between two cents round up, so `0.125` becomes `$0.13`.
pub fn format_amount(amount: f64) -> String {
    let amount = amount.abs();

    if is_half_cent(amount) {
        format!("${:.2}", (amount * 100.0).round() / 100.0)
    } else {
        format!("${:.2}", amount)
    }
}

/// Whether `amount` lies exactly halfway between two cents.
///
/// The only such binary fractions are odd multiples of 1/8.
fn is_half_cent(amount: f64) -> bool {
    let eighths = amount * 8.0;

    eighths.fract() == 0.0 && eighths % 2.0 == 1.0
}

/// Render `transactions` as a list of cards, in the order given.
///
/// A missing or empty list renders the [NO_TRANSACTIONS_NOTICE] placeholder instead. The same
/// input always renders the same markup.
pub fn render(transactions: Option<&[Transaction]>) -> Markup {
    match transactions {
        Some(transactions) if !transactions.is_empty() => html! {
            @for transaction in transactions {
                (transaction_card(transaction))
            }
        },
        _ => empty_state_view(),
    }
}

fn empty_state_view() -> Markup {
    html! {
        div class="alert alert-info" { (NO_TRANSACTIONS_NOTICE) }
    }
}

fn transaction_card(transaction: &Transaction) -> Markup {
    html! {
        div class="card mb-2"
        {
            div class="card-body"
            {
                h5 class="card-title"
                {
                    (transaction.display_name())
                }

                p class="card-text"
                {
                    "Amount: " (format_amount(transaction.amount))
                    br;
                    "Date: " (transaction.date)
                    br;

                    @if let Some(category) = &transaction.category {
                        "Category: " (category.join(", "))
                    }
                }
            }
        }
    }
}

pub(crate) fn clear_transactions(container: &mut Markup) {
    *container = PreEscaped(String::new());
}

impl<L, N> Client<L, N>
where
    L: LinkProvider,
    N: Notifier,
{
    /// Fetch the transactions and replace the transaction container with them.
    ///
    /// If the request fails the container shows the empty-state placeholder. Returns the
    /// number of transactions rendered.
    ///
    /// # Errors
    /// - [Error::Unavailable] if not logged in.
    /// - [Error::Gateway] if the request failed. The user has been shown the generic error
    ///   notice.
    pub async fn fetch_transactions(&mut self) -> Result<usize, Error> {
        self.ensure_available(Action::FetchTransactions)?;
        tracing::info!("Fetching transactions...");

        let result = self
            .gateway
            .get::<Vec<Transaction>>(endpoints::TRANSACTIONS)
            .await;

        match result {
            Ok(transactions) => {
                tracing::info!("Received {} transactions", transactions.len());
                self.transactions = render(Some(transactions.as_slice()));
                Ok(transactions.len())
            }
            Err(error) => {
                self.transactions = render(None);
                Err(self.report_failure(error))
            }
        }
    }
}
