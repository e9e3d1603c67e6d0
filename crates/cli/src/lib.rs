// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! liftsync - a durable offline queue for workout mutations.
//!
//! Finished workouts are written to local storage first and delivered to the
//! API server later, with retries and backoff, so nothing is lost to a flaky
//! connection or a killed process.
//!
//! # Main Components
//!
//! - [`SyncEngine`] - enqueue, flush, expiry, and inspection
//! - [`Config`] - data-directory configuration (`config.toml`)
//! - [`sync`] - transport, connectivity flag, and queue events
//! - [`Error`] - Error types for all operations
//!
//! Storage backends, the job model, and the retry policy live in
//! `liftsync-core`.

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{CacheCommand, Cli, Command, OutputFormat, PayloadArgs, StatusArg, UserArgs};
pub use config::{init_data_dir, require_data_dir, resolve_data_dir, Config};
pub use error::{Error, Result};
pub use sync::{FlushOptions, FlushReport, SyncEngine};

use clap::CommandFactory;
use clap_complete::generate;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let Cli { data_dir, offline, command } = cli;

    if let Command::Completion { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "liftsync", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir(data_dir.as_deref())?;
    if let Command::Init = command {
        return commands::init::run(&data_dir);
    }

    let ctx = commands::open(&data_dir, offline)?;
    match command {
        Command::Enqueue { user, job_type, key, input } => {
            commands::enqueue::run(&ctx, &user.user, &job_type, key, &input)
        }
        Command::Flush { max, force, output } => commands::flush::run(&ctx, max, force, output),
        Command::Status { user, output } => commands::status::run(&ctx, &user.user, output),
        Command::List { user, pending_only, output } => {
            commands::list::run(&ctx, &user.user, pending_only, output)
        }
        Command::Bump { id } => commands::bump::run(&ctx, &id),
        Command::Clear { user, status } => commands::clear::run(&ctx, &user.user, status),
        Command::Gc => commands::gc::run(&ctx),
        Command::Cache(CacheCommand::Set { user, name, input }) => {
            commands::cache::set(&ctx, &user.user, &name, &input)
        }
        Command::Cache(CacheCommand::Get { user, name }) => {
            commands::cache::get(&ctx, &user.user, &name)
        }
        Command::Watch { interval } => commands::watch::run(&ctx, interval),
        Command::Init | Command::Completion { .. } => Ok(()),
    }
}
