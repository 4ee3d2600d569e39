//! Debtbook command-line front end.
//!
//! Each invocation restores the stored session, runs one command against the
//! hosted ledger and exits.

mod cli;
mod output;
mod prompt;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use debtbook_client::{RestAuthProvider, RestLedgerStore, SessionFile};
use debtbook_core::ledger::{
    ControllerSettings, Direction, LedgerController, LedgerError, parse_amount,
};
use debtbook_shared::{AppConfig, AppResult};

const DEFAULT_SESSION_FILE: &str = ".debtbook/session.json";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debtbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.error_code());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load()?;
    let session_file = SessionFile::new(session_path(
        config.auth.session_file.as_deref(),
        std::env::var_os("HOME").map(PathBuf::from).as_deref(),
    ));

    let auth =
        RestAuthProvider::new(&config.store, Some(session_file)).map_err(LedgerError::from)?;
    let store = Arc::new(RestLedgerStore::new(&config.store).map_err(LedgerError::from)?);
    let controller = LedgerController::new(store, ControllerSettings::from_config(&config));
    let _subscription = controller.bind(&auth);

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt::password()?,
            };
            let session = controller.sign_in(&auth, &email, &password).await?;
            info!(owner = %session.owner, "Signed in");
            println!(
                "Signed in as {} ({} entries)",
                session.email.as_deref().unwrap_or(&email),
                controller.entries().len()
            );
        }
        Command::Logout => {
            if let Err(e) = controller.restore(&auth).await {
                warn!(error = %e, "Could not restore session before sign-out");
            }
            controller.sign_out(&auth).await?;
            println!("Signed out");
        }
        command => {
            if controller.restore(&auth).await?.is_none() {
                return Err(LedgerError::Unauthenticated.into());
            }
            execute(&controller, command).await?;
        }
    }
    Ok(())
}

/// Runs a command that needs an authenticated controller.
async fn execute(controller: &LedgerController, command: Command) -> Result<(), LedgerError> {
    match command {
        Command::List => {
            println!("{}", output::ledger(&controller.entries(), &controller.totals()));
        }
        Command::Add {
            counterparty,
            amount,
            i_owe,
        } => {
            let direction = if i_owe {
                Direction::OwedByUser
            } else {
                Direction::OwedToUser
            };
            let entry = controller
                .add_entry(&counterparty, parse_amount(&amount)?, direction)
                .await?;
            println!("Added {}", output::entry_line(&entry));
        }
        Command::Pay { id, amount } => {
            let entry = controller.add_payment(id, parse_amount(&amount)?).await?;
            println!("Updated {}", output::entry_line(&entry));
        }
        Command::Settle { id } => {
            let entry = controller.mark_paid(id).await?;
            println!("Settled {}", output::entry_line(&entry));
        }
        Command::Delete { id } => {
            controller.delete_entry(id).await?;
            println!("Deleted {id}");
        }
        Command::Totals => {
            println!("{}", output::totals_block(&controller.totals()));
        }
        Command::Login { .. } | Command::Logout => {}
    }
    Ok(())
}

/// Resolves the session file: configured path with `~/` expanded, else a
/// file under the home directory, else the working directory.
fn session_path(configured: Option<&Path>, home: Option<&Path>) -> PathBuf {
    match (configured, home) {
        (Some(path), Some(home)) => match path.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => path.to_path_buf(),
        },
        (Some(path), None) => path.to_path_buf(),
        (None, Some(home)) => home.join(DEFAULT_SESSION_FILE),
        (None, None) => PathBuf::from(DEFAULT_SESSION_FILE),
    }
}
