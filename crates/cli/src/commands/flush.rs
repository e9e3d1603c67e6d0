// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{block_on, Context};
use crate::cli::OutputFormat;
use crate::display::format_flush_report;
use crate::error::Result;
use crate::sync::FlushOptions;

pub fn run(ctx: &Context, max: Option<usize>, force: bool, output: OutputFormat) -> Result<()> {
    let report = block_on(ctx.engine.flush(FlushOptions { max, force }))?;
    match output {
        OutputFormat::Text => println!("{}", format_flush_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
