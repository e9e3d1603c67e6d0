// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use liftsync_core::select_backend;

use crate::config::init_data_dir;
use crate::error::Result;

pub fn run(data_dir: &Path) -> Result<()> {
    let config = init_data_dir(data_dir)?;

    // Create the store now so the first enqueue does not pay for it.
    let backend = select_backend(data_dir, config.storage.preference()?)?;

    println!("Initialized liftsync at {}", data_dir.display());
    println!("Storage: {}", backend.name());
    println!("Server: {}", config.server.base_url);
    Ok(())
}
