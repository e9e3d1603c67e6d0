// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use liftsync_core::{ClockSource, SystemClock};

use super::Context;
use crate::cli::OutputFormat;
use crate::display::format_job_line;
use crate::error::Result;

pub fn run(ctx: &Context, user: &str, pending_only: bool, output: OutputFormat) -> Result<()> {
    let jobs = ctx.engine.list_jobs(user, !pending_only);
    match output {
        OutputFormat::Text => {
            if jobs.is_empty() {
                println!("No queued jobs for {}", user);
            }
            let now = SystemClock.now_ms();
            for job in &jobs {
                println!("{}", format_job_line(job, now));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&jobs)?),
    }
    Ok(())
}
