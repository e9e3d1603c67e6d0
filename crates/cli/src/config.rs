// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Data directory and configuration management.
//!
//! Configuration is stored in `<data dir>/config.toml`. Every field has a
//! default, so a missing file or a partial file is always valid:
//! - `[server]`: API base URL, health path, request timeout, endpoint per job type
//! - `[queue]`: retry, backoff, and expiry tuning
//! - `[storage]`: which persistence backend to use
//! - `[mirror]`: snapshot mirror location
//! - `[watch]`: watcher tick interval

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use liftsync_core::clock::DAY_MS;
use liftsync_core::{BackendPreference, RetryPolicy, WORKOUT_FINISH};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_DIR_NAME: &str = "liftsync";

/// Configuration stored in `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// API server the queue submits to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, e.g. `https://api.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path probed to detect reconnection.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Endpoint path per job type. Jobs of unlisted types are never submitted.
    #[serde(default = "default_endpoints")]
    pub endpoints: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_endpoints() -> BTreeMap<String, String> {
    BTreeMap::from([(WORKOUT_FINISH.to_string(), "/api/workouts/finish".to_string())])
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: default_base_url(),
            health_path: default_health_path(),
            timeout_secs: default_timeout_secs(),
            endpoints: default_endpoints(),
        }
    }
}

/// Retry, batching, and expiry tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Jobs attempted per flush when no `--max` is given.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upper bound on jobs attempted per flush.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    #[serde(default = "default_job_ttl_days")]
    pub job_ttl_days: u32,
    /// Extra retention for failed jobs, on top of the TTL.
    #[serde(default = "default_failed_grace_days")]
    pub failed_grace_days: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: i64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: i64,
    /// Relative jitter applied to each delay, 0.0 to 1.0.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: i64,
}

fn default_max_attempts() -> u32 {
    7
}

fn default_batch_size() -> usize {
    6
}

fn default_max_batch() -> usize {
    30
}

fn default_job_ttl_days() -> u32 {
    14
}

fn default_failed_grace_days() -> u32 {
    7
}

fn default_backoff_base_ms() -> i64 {
    5_000
}

fn default_backoff_max_ms() -> i64 {
    300_000
}

fn default_jitter() -> f64 {
    0.15
}

fn default_min_delay_ms() -> i64 {
    1_000
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_attempts: default_max_attempts(),
            batch_size: default_batch_size(),
            max_batch: default_max_batch(),
            job_ttl_days: default_job_ttl_days(),
            failed_grace_days: default_failed_grace_days(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            jitter: default_jitter(),
            min_delay_ms: default_min_delay_ms(),
        }
    }
}

impl QueueConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff_base_ms: self.backoff_base_ms.max(0),
            backoff_max_ms: self.backoff_max_ms.max(self.backoff_base_ms),
            jitter: self.jitter.clamp(0.0, 1.0),
            min_delay_ms: self.min_delay_ms.max(0),
            job_ttl_ms: i64::from(self.job_ttl_days) * DAY_MS,
            failed_grace_ms: i64::from(self.failed_grace_days) * DAY_MS,
        }
    }
}

/// Persistence backend selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `auto`, `sqlite`, or `file`.
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_backend() -> String {
    BackendPreference::Auto.to_string()
}

impl StorageConfig {
    pub fn preference(&self) -> Result<BackendPreference> {
        if self.backend.is_empty() {
            return Ok(BackendPreference::Auto);
        }
        Ok(self.backend.parse()?)
    }
}

/// Snapshot mirror location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Relative paths resolve against the data directory.
    #[serde(default = "default_mirror_dir")]
    pub dir: String,
}

fn default_true() -> bool {
    true
}

fn default_mirror_dir() -> String {
    "mirror".to_string()
}

impl Default for MirrorConfig {
    fn default() -> Self {
        MirrorConfig { enabled: default_true(), dir: default_mirror_dir() }
    }
}

impl MirrorConfig {
    pub fn resolve_dir(&self, data_dir: &Path) -> PathBuf {
        let dir = Path::new(&self.dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            data_dir.join(dir)
        }
    }
}

/// Watcher timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    15
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig { interval_secs: default_interval_secs() }
    }
}

impl Config {
    /// Loads configuration from `data_dir`, using defaults when no file exists.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Resolves the data directory: explicit path (flag or `LIFTSYNC_DIR`), then
/// the platform data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    dirs::data_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .ok_or_else(|| Error::Config("cannot determine a data directory; pass --data-dir".to_string()))
}

/// Returns the data directory if it has been initialized.
pub fn require_data_dir(data_dir: &Path) -> Result<()> {
    if data_dir.is_dir() {
        Ok(())
    } else {
        Err(Error::NotInitialized(data_dir.display().to_string()))
    }
}

/// Creates the data directory and a default `config.toml`.
pub fn init_data_dir(data_dir: &Path) -> Result<Config> {
    let config_path = data_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Err(Error::AlreadyInitialized(data_dir.display().to_string()));
    }

    fs::create_dir_all(data_dir)?;
    let config = Config::default();
    config.save(data_dir)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
