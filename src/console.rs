//! Terminal implementations of the notice channel and the bank-link widget.
//!
//! The hosted bank-link widget cannot run in a terminal, so [ConsoleLinkProvider] prints the
//! link token for the user to open the widget with elsewhere and waits for the public token
//! to be pasted back.

use std::io::{self, BufRead, Write};

use tokio::sync::oneshot;

use crate::{
    link::{LinkError, LinkEvent, LinkProvider, LinkSession, LinkToken, PublicToken},
    notice::Notifier,
};

/// Prints notices to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        println!("[notice] {message}");
    }
}

/// Hosts link sessions in the terminal.
#[derive(Debug, Default)]
pub struct ConsoleLinkProvider;

impl LinkProvider for ConsoleLinkProvider {
    type Session = ConsoleLinkSession;

    fn create_session(&mut self, token: LinkToken) -> Self::Session {
        ConsoleLinkSession { token }
    }
}

/// A link session waiting for a public token on stdin.
#[derive(Debug)]
pub struct ConsoleLinkSession {
    token: LinkToken,
}

impl LinkSession for ConsoleLinkSession {
    fn present(self) -> oneshot::Receiver<LinkEvent> {
        let (sender, receiver) = oneshot::channel();

        println!("Open the bank-link widget with this link token:\n");
        println!("    {}\n", self.token.as_str());
        println!("Paste the public token from the widget (leave empty to cancel):");

        tokio::task::spawn_blocking(move || {
            let event = read_link_event(&mut io::stdin().lock());

            if sender.send(event).is_err() {
                tracing::debug!("Link session was abandoned before the user answered");
            }
        });

        receiver
    }
}

/// Read the user's answer to a link session from `reader`.
///
/// A pasted public token is a success, an empty line or end of input is an exit without an
/// error, and a read failure is an exit with a `TERMINAL_ERROR`.
fn read_link_event(reader: &mut impl BufRead) -> LinkEvent {
    match read_line_from(reader) {
        Ok(Some(line)) if !line.is_empty() => LinkEvent::Success {
            public_token: PublicToken::new(line),
        },
        Ok(_) => LinkEvent::Exit { error: None },
        Err(error) => LinkEvent::Exit {
            error: Some(LinkError {
                error_type: Some("TERMINAL_ERROR".to_owned()),
                error_message: Some(error.to_string()),
                ..Default::default()
            }),
        },
    }
}

/// Read one trimmed line from stdin, or `None` at end of input.
pub fn read_line() -> io::Result<Option<String>> {
    read_line_from(&mut io::stdin().lock())
}

fn read_line_from(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();

    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_owned()))
}

/// Print `label` and read the user's answer without blocking the runtime.
pub async fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    tokio::task::spawn_blocking(read_line)
        .await
        .map_err(io::Error::other)?
}

/// Print `label` and read a password without echoing it.
pub async fn prompt_password(label: &str) -> io::Result<String> {
    let label = label.to_owned();

    tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
        .await
        .map_err(io::Error::other)?
}
