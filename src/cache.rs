//! Time-bounded in-memory caches
//!
//! Two instances back the addon: one for search result sets (30 minutes)
//! and one mapping subtitle ids to their upstream download URLs (24 hours,
//! so the proxy endpoint keeps working after the result cache expires).
//!
//! Entries past their TTL are treated as misses and overwritten by the next
//! store; nothing is ever evicted, so the maps grow for the process
//! lifetime. That is an accepted limitation, not a goal.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A shared map from string keys to values with a fixed time-to-live
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, (Instant, V)>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a value; expired entries are reported as misses
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(value.clone())
    }

    /// Store a value, resetting the TTL clock for this key
    pub fn put(&self, key: impl Into<String>, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), (Instant::now(), value));
        }
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        let mut entries = self.entries.lock().unwrap();
        if let Some((stored_at, _)) = entries.get_mut(key) {
            *stored_at = Instant::now() - age;
        }
    }
}
