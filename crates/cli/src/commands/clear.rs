// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use liftsync_core::JobStatus;

use super::Context;
use crate::cli::StatusArg;
use crate::error::Result;

pub fn run(ctx: &Context, user: &str, status: Option<StatusArg>) -> Result<()> {
    let status = status.map(|s| match s {
        StatusArg::Pending => JobStatus::Pending,
        StatusArg::Failed => JobStatus::Failed,
    });
    let removed = ctx.engine.clear(user, status)?;
    println!("Cleared {} job(s)", removed);
    Ok(())
}
