//! CLI interface for storecast.
//!
//! Each subcommand is non-interactive: arguments in, output on stdout.
//! Logs and warnings go to stderr.
//!
//! Commands split into two groups:
//!
//! - `verify`, `create`, `list`, `status`, `delete`, `import` talk to
//!   Staffbase and need the settings from `~/.storecast/config.toml` or the
//!   environment.
//! - `label`, `debug`, and `list --local` only read local state.

mod channel;
mod format;
mod inspect;
mod users;

use std::{fs, path::Path, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::warn;

use crate::{
    config::Config,
    model::Warning,
    staffbase::{HttpStaffbase, RequestKind},
    storage::Storage,
};

/// Storecast: news channels and store task lists on Staffbase.
#[derive(Debug, Parser)]
#[command(name = "storecast", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: announcing a store refit
  1. storecast verify stores.csv
     → shows which store ids match a user
  2. storecast create --stores stores.csv --tasks tasks.csv \
       --title 'Spring refit' --department Operations
  3. storecast list --status
  4. storecast delete <channel-id>

Task CSV rows are `title;description;due date`, e.g.
  Fix shelf;Shelf broken;25.12.2024";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match a store CSV against the user directory without creating anything.
    Verify {
        /// One store id per line.
        stores: PathBuf,
    },

    /// Create a news channel and post for the matched users.
    ///
    /// With `--tasks`, a task list is also created in every store's project.
    Create {
        /// One store id per line.
        #[arg(long)]
        stores: PathBuf,

        /// Task rows: `title;description;due date`.
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Post title.
        #[arg(long)]
        title: String,

        /// One of the configured departments.
        #[arg(long)]
        department: String,
    },

    /// List managed channels, newest first.
    List {
        /// Look up each post's status and sort drafts first.
        #[arg(long)]
        status: bool,

        /// Read the local registry instead of Staffbase.
        #[arg(long)]
        local: bool,

        /// Print JSON instead of one line per channel.
        #[arg(long)]
        json: bool,
    },

    /// Print a post's status: draft, scheduled, or published.
    Status {
        post_id: String,
    },

    /// Delete a channel and its task lists.
    Delete {
        channel_id: String,
    },

    /// Rebuild the local registry from the channels on Staffbase.
    Import,

    /// Decode a channel label and print its fields as JSON.
    Label {
        text: String,
    },

    /// Print the most recent recorded Staffbase request.
    Debug {
        #[arg(long, value_enum, default_value_t = KindArg::Any)]
        kind: KindArg,
    },
}

/// CLI-facing request kind, mapped to the domain `RequestKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Any request.
    Any,
    /// Task-list creation or deletion.
    TaskList,
    /// Task creation.
    Task,
}

impl KindArg {
    fn to_domain(self) -> Option<RequestKind> {
        match self {
            Self::Any => None,
            Self::TaskList => Some(RequestKind::TaskList),
            Self::Task => Some(RequestKind::Task),
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli, storage: &Storage) -> Result<(), String> {
    match cli.command {
        Command::Verify { stores } => users::cmd_verify(storage, &stores),
        Command::Create {
            stores,
            tasks,
            title,
            department,
        } => channel::cmd_create(
            storage,
            &stores,
            tasks.as_deref(),
            &title,
            &department,
        ),
        Command::List {
            status,
            local,
            json,
        } => channel::cmd_list(storage, status, local, json),
        Command::Status { post_id } => channel::cmd_status(storage, &post_id),
        Command::Delete { channel_id } => channel::cmd_delete(storage, &channel_id),
        Command::Import => channel::cmd_import(storage),
        Command::Label { text } => inspect::cmd_label(&text),
        Command::Debug { kind } => inspect::cmd_debug(storage, kind.to_domain()),
    }
}

/// Load the config and build a client for it.
fn connect() -> Result<(Config, HttpStaffbase), String> {
    let config = Config::load()?;
    let api = HttpStaffbase::new(&config).map_err(|e| format!("failed to build client: {e}"))?;
    Ok((config, api))
}

/// Run `f` against Staffbase, then persist the requests it made.
fn with_api<T>(
    storage: &Storage,
    f: impl FnOnce(&Config, &HttpStaffbase) -> Result<T, String>,
) -> Result<T, String> {
    let (config, api) = connect()?;
    let result = f(&config, &api);
    if let Err(e) = storage.append_requests(&api.take_recorded(), config.request_log_capacity) {
        warn!(error = %e, "could not persist request log");
    }
    result
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode: {e}"))?;
    println!("{json}");
    Ok(())
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
