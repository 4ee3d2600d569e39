//! Command-line arguments.

use clap::{Parser, Subcommand};
use debtbook_shared::types::EntryId;

/// Track who owes you and whom you owe.
#[derive(Parser, Debug)]
#[command(name = "debtbook")]
#[command(version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (prompted for without echo when omitted)
        #[arg(long, env = "DEBTBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// List entries, newest first, followed by totals
    List,
    /// Record a new debt
    Add {
        /// Who the debt is with
        counterparty: String,

        /// Amount, e.g. `12.50` or `12,50`
        amount: String,

        /// You owe them (default: they owe you)
        #[arg(long)]
        i_owe: bool,
    },
    /// Record a partial payment
    Pay {
        /// Entry ID
        id: EntryId,

        /// Amount paid
        amount: String,
    },
    /// Mark an entry as fully paid
    Settle {
        /// Entry ID
        id: EntryId,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: EntryId,
    },
    /// Show outstanding totals
    Totals,
}
