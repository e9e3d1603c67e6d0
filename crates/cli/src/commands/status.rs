// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use liftsync_core::{ClockSource, SystemClock};

use super::Context;
use crate::cli::OutputFormat;
use crate::display::format_summary;
use crate::error::Result;

pub fn run(ctx: &Context, user: &str, output: OutputFormat) -> Result<()> {
    let summary = ctx.engine.summary(user);
    match output {
        OutputFormat::Text => println!("{}", format_summary(&summary, SystemClock.now_ms())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
