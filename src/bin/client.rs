use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use plaid_link_client::{
    Client, Credentials, Error, Gateway, LinkOutcome,
    console::{self, ConsoleLinkProvider, ConsoleNotifier},
};

/// A terminal client for the Plaid bank-linking demo backend.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The origin of the backend API.
    #[arg(long, env = "PLAID_CLIENT_ORIGIN", default_value = "http://127.0.0.1:5000")]
    origin: String,

    /// How many seconds to wait for a backend response.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// File path that debug logs are appended to.
    #[arg(long, default_value = "client.log")]
    log_file: PathBuf,

    /// File path that the `page` command writes the rendered page to.
    #[arg(long, default_value = "page.html")]
    page_out: PathBuf,
}

type ConsoleClient = Client<ConsoleLinkProvider, ConsoleNotifier>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    LogIn,
    LogOut,
    Link,
    Transactions,
    Page,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "login" => Ok(Command::LogIn),
            "logout" => Ok(Command::LogOut),
            "link" => Ok(Command::Link),
            "transactions" => Ok(Command::Transactions),
            "page" => Ok(Command::Page),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command \"{other}\", type \"help\" for a list")),
        }
    }
}

const HELP: &str = "\
Commands:
  login         log in with a username and password
  logout        log out of the current session
  link          link a bank account and show its transactions
  transactions  fetch the transactions again
  page          write the current page to the --page-out file
  help          show this message
  quit          exit";

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_file);

    let gateway = match Gateway::new(&args.origin, Duration::from_secs(args.timeout_secs)) {
        Ok(gateway) => gateway,
        Err(error) => {
            tracing::error!("Could not set up the backend gateway: {error}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Using backend at {}", gateway.origin());
    let mut client = Client::new(gateway, ConsoleLinkProvider, ConsoleNotifier);
    println!("{HELP}");

    loop {
        let line = match console::prompt(&format!("({})> ", client.state())).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!("Could not read from the terminal: {error}");
                return ExitCode::FAILURE;
            }
        };

        if line.is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        if let Err(error) = run(command, &mut client, &args.page_out).await {
            report(&error);
        }
    }

    ExitCode::SUCCESS
}

async fn run(command: Command, client: &mut ConsoleClient, page_out: &Path) -> Result<(), Error> {
    match command {
        Command::LogIn => {
            let Some(credentials) = read_credentials().await? else {
                return Ok(());
            };
            client.log_in(credentials).await?;
        }
        Command::LogOut => {
            client.log_out().await?;
        }
        Command::Link => match client.link_bank_account().await? {
            LinkOutcome::Linked => print_transactions(client),
            LinkOutcome::NotExchanged => println!("The backend did not accept the public token."),
            LinkOutcome::Exited => println!("Bank link closed."),
            LinkOutcome::NoLinkToken => println!("The backend did not issue a link token."),
        },
        Command::Transactions => {
            let result = client.fetch_transactions().await;
            print_transactions(client);
            result?;
        }
        Command::Page => match tokio::fs::write(page_out, client.page().into_string()).await {
            Ok(()) => println!("Wrote the page to {}", page_out.display()),
            Err(error) => {
                tracing::error!("Could not write the page to {}: {error}", page_out.display())
            }
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }

    Ok(())
}

/// Ask for a username and password, returning `None` if the terminal could not be read.
async fn read_credentials() -> Result<Option<Credentials>, Error> {
    let username = match console::prompt("Username: ").await {
        Ok(Some(username)) => username,
        Ok(None) => return Ok(None),
        Err(error) => {
            tracing::error!("Could not read the username: {error}");
            return Ok(None);
        }
    };

    let password = match console::prompt_password("Password: ").await {
        Ok(password) => password,
        Err(error) => {
            tracing::error!("Could not read the password: {error}");
            return Ok(None);
        }
    };

    Credentials::new(username, password).map(Some)
}

fn print_transactions(client: &ConsoleClient) {
    println!("{}", client.transactions().0);
}

fn report(error: &Error) {
    match error {
        // Already logged by the gateway and shown as a notice.
        Error::Gateway(error) => tracing::debug!("Command failed: {error}"),
        error => println!("{error}"),
    }
}

/// Log to stdout at the level set by `RUST_LOG` (INFO by default) and to `log_file` at DEBUG.
fn setup_logging(log_file: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(stdout_filter)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
