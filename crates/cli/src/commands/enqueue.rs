// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{read_payload, Context};
use crate::cli::PayloadArgs;
use crate::error::Result;

pub fn run(
    ctx: &Context,
    user: &str,
    job_type: &str,
    key: Option<String>,
    input: &PayloadArgs,
) -> Result<()> {
    let payload = read_payload(input)?;
    let job = ctx.engine.enqueue(user, job_type, payload, key)?;
    println!("{}", job.id);
    Ok(())
}
