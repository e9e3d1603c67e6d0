// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so connections are refused quickly.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// A `liftsync` command with logging quiet and `LIFTSYNC_DIR` cleared.
pub fn liftsync() -> Command {
    let mut cmd = cargo_bin_cmd!("liftsync");
    cmd.env_remove("LIFTSYNC_DIR").env_remove("RUST_LOG");
    cmd
}

/// A `liftsync` command pointed at `dir`.
pub fn liftsync_in(dir: &Path) -> Command {
    let mut cmd = liftsync();
    cmd.arg("--data-dir").arg(dir);
    cmd
}

/// Helper to create an initialized data directory whose server is unreachable.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    liftsync_in(temp.path()).arg("init").assert().success();
    set_base_url(temp.path(), UNREACHABLE_URL);
    temp
}

/// Rewrites the configured server URL.
pub fn set_base_url(dir: &Path, url: &str) {
    let path = dir.join("config.toml");
    let content = std::fs::read_to_string(&path).unwrap();
    let content = content.replace("http://localhost:3000", url);
    std::fs::write(&path, content).unwrap();
}

/// Helper to enqueue a job and return its id.
pub fn enqueue(dir: &Path, user: &str, payload: &str) -> String {
    let output = liftsync_in(dir)
        .args(["enqueue", "-u", user, "--payload", payload])
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Runs a command with `-o json` and parses stdout.
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.args(["-o", "json"]).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
