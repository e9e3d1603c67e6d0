// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use args::{PayloadArgs, UserArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Job status filter for `clear`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Failed,
}

#[derive(Parser, Debug)]
#[command(name = "liftsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Durable offline queue for workout mutations")]
#[command(
    long_about = "Durable offline queue for workout mutations.\n\n\
    Finished workouts are queued locally and delivered to the API server with \
    retries, so nothing is lost to a flaky connection or a force-quit."
)]
#[command(after_help = "\
Quickstart:
  liftsync init                                   Create the data directory
  liftsync enqueue -u u1 --payload '{\"sets\":12}'   Queue a finished workout
  liftsync flush                                  Deliver due jobs
  liftsync status -u u1                           Show the pending-sync summary
  liftsync watch                                  Flush periodically and on reconnect")]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "LIFTSYNC_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Treat the device as offline
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the data directory and default config
    Init,

    /// Queue a mutation for delivery
    #[command(after_help = "\
Examples:
  liftsync enqueue -u u1 --payload '{\"sets\":12}'      Queue a finished workout
  liftsync enqueue -u u1 --file workout.json --key k1  Queue with a fixed idempotency key
  liftsync enqueue -u u1 -t template_save --file t.json Queue another mutation type")]
    Enqueue {
        #[command(flatten)]
        user: UserArgs,

        /// Mutation type
        #[arg(long = "type", short = 't', default_value = liftsync_core::WORKOUT_FINISH)]
        job_type: String,

        /// Idempotency key (generated when omitted)
        #[arg(long, short)]
        key: Option<String>,

        #[command(flatten)]
        input: PayloadArgs,
    },

    /// Attempt delivery of due jobs
    Flush {
        /// Maximum jobs to attempt (clamped to the configured batch bounds)
        #[arg(long, short = 'n')]
        max: Option<usize>,

        /// Ignore backoff gates and the offline flag
        #[arg(long)]
        force: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the pending-sync summary for a user
    Status {
        #[command(flatten)]
        user: UserArgs,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List a user's queued jobs, newest first
    List {
        #[command(flatten)]
        user: UserArgs,

        /// Hide failed jobs
        #[arg(long)]
        pending_only: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Make a job eligible for the next flush
    #[command(arg_required_else_help = true)]
    Bump {
        /// Job id
        #[arg(value_parser = non_empty_string)]
        id: String,
    },

    /// Delete a user's queued jobs
    Clear {
        #[command(flatten)]
        user: UserArgs,

        /// Only delete jobs with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Delete expired and malformed jobs
    Gc,

    /// Per-user list caches
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Flush periodically and whenever the network comes back
    Watch {
        /// Seconds between ticks (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Store a list (a JSON array) for a user
    Set {
        #[command(flatten)]
        user: UserArgs,

        /// Cache name, e.g. workouts or templates
        #[arg(long, value_parser = non_empty_string)]
        name: String,

        #[command(flatten)]
        input: PayloadArgs,
    },

    /// Print a user's cached list
    Get {
        #[command(flatten)]
        user: UserArgs,

        /// Cache name, e.g. workouts or templates
        #[arg(long, value_parser = non_empty_string)]
        name: String,
    },
}

impl Command {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Command::Watch { .. } => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
