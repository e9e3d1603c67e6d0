// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` to reduce duplication
//! across commands that take the same inputs.

use std::path::PathBuf;

use clap::Args;

use super::non_empty_string;

/// Owner of the jobs or caches being operated on.
#[derive(Args, Clone, Debug)]
pub struct UserArgs {
    /// User id
    #[arg(long, short, value_parser = non_empty_string)]
    pub user: String,
}

/// JSON input, inline or from a file.
#[derive(Args, Clone, Debug, Default)]
pub struct PayloadArgs {
    /// Inline JSON
    #[arg(long, conflicts_with = "file")]
    pub payload: Option<String>,

    /// Read JSON from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}
