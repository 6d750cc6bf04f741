pub mod demo;
pub mod export;
pub mod issues;
pub mod review;
pub mod summary;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Result, WalterError};
use crate::issues::IssueKind;
use crate::store;

pub(crate) fn parse_issue_kind(kind: &str) -> Result<IssueKind> {
    match kind.to_ascii_lowercase().as_str() {
        "token" | "symbol" => Ok(IssueKind::UnknownToken),
        "market" => Ok(IssueKind::UnknownMarket),
        other => Err(WalterError::UnknownIssueKind(other.to_string())),
    }
}

pub(crate) fn store_path(store: &Option<String>) -> PathBuf {
    store
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(store::default_store_path)
}

#[derive(Parser)]
#[command(
    name = "walter",
    about = "Review and correct classified wallet transactions before export."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactively review transactions: edit fields, filter, undo, jump.
    Review {
        /// Path to a JSON file of classified rows
        file: String,
        /// Override store path (default: ~/.config/walter/overrides.json)
        #[arg(long)]
        store: Option<String>,
    },
    /// List or resolve unknown tokens and markets.
    Issues {
        /// Path to a JSON file of classified rows
        file: String,
        #[arg(long)]
        store: Option<String>,
        #[command(subcommand)]
        command: Option<IssuesCommands>,
    },
    /// Per-currency totals by transaction type, with market breakdowns.
    Summary {
        /// Path to a JSON file of classified rows
        file: String,
        #[arg(long)]
        store: Option<String>,
    },
    /// Write the corrected rows out as CSV.
    Export {
        /// Path to a JSON file of classified rows
        file: String,
        /// Destination CSV path
        #[arg(short, long)]
        output: String,
        /// Export even when unresolved issues remain
        #[arg(long)]
        force: bool,
        #[arg(long)]
        store: Option<String>,
    },
    /// Generate a sample row file to try the tool with.
    Demo {
        /// Where to write the sample rows
        #[arg(default_value = "demo-rows.json")]
        output: String,
        /// How many rows to generate
        #[arg(long, default_value_t = 120)]
        count: usize,
    },
}

#[derive(Subcommand)]
pub enum IssuesCommands {
    /// List unresolved and resolved issues (the default).
    List,
    /// Assign a replacement name for a placeholder token or unknown market.
    Rename {
        /// 'token' or 'market'
        kind: String,
        /// The placeholder mint or unknown market address
        key: String,
        /// Replacement name
        value: String,
    },
    /// Toggle an issue in or out of the ignored set.
    Ignore {
        /// 'token' or 'market'
        kind: String,
        key: String,
    },
    /// Ignore every currently pending issue.
    IgnoreAll,
}
