// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user list caches (`workoutsCache.v1.<user>` and friends).

use liftsync_core::{CachedList, KvStore, ListCache};
use serde_json::Value;

use super::{read_payload, Context};
use crate::cli::PayloadArgs;
use crate::error::{Error, Result};

pub fn set(ctx: &Context, user: &str, name: &str, input: &PayloadArgs) -> Result<()> {
    let items = read_payload(input)?;
    let count = store(&ctx.kv(), user, name, items)?;
    println!("Cached {} {} item(s) for {}", count, name, user);
    Ok(())
}

pub fn get(ctx: &Context, user: &str, name: &str) -> Result<()> {
    match load(&ctx.kv(), user, name) {
        Some(list) => println!("{}", serde_json::to_string_pretty(&list)?),
        None => println!("No cached {} for {}", name, user),
    }
    Ok(())
}

/// Stores `items`, which must be a JSON array. Returns the item count.
pub fn store(kv: &KvStore, user: &str, name: &str, items: Value) -> Result<usize> {
    let Value::Array(items) = items else {
        return Err(Error::InvalidPayload("cache lists must be JSON arrays".to_string()));
    };
    if user.trim().is_empty() {
        return Err(Error::MissingUser);
    }
    let count = items.len();
    let cache = ListCache::new(name, kv.clone());
    if !cache.set(user, items) {
        return Err(Error::Storage(format!("could not write {}", cache.key(user))));
    }
    Ok(count)
}

pub fn load(kv: &KvStore, user: &str, name: &str) -> Option<CachedList> {
    ListCache::new(name, kv.clone()).get(user)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
