// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;

pub fn run(ctx: &Context, id: &str) -> Result<()> {
    let job = ctx.engine.bump(id)?;
    println!("Bumped {} (attempts {}/{})", job.id, job.attempts, job.max_attempts);
    Ok(())
}
