// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::display::format_gc_report;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let report = ctx.engine.gc();
    println!("{}", format_gc_report(&report));
    Ok(())
}
