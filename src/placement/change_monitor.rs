//! Change Monitor
//!
//! Remembers the last value seen for each scope key so callers can log only
//! when a resolved value actually changes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Last-seen value per scope key
#[derive(Debug)]
pub struct ChangeMonitor<T> {
    last_seen: Mutex<HashMap<String, T>>,
}

impl<T> Default for ChangeMonitor<T> {
    fn default() -> Self {
        Self {
            last_seen: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: PartialEq + Clone> ChangeMonitor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `value` when `key` is unseen or its last value
    /// differs. Returns false and leaves the record alone otherwise.
    pub fn has_changed(&self, key: &str, value: &T) -> bool {
        let mut last_seen = self.lock();
        match last_seen.get(key) {
            Some(previous) if previous == value => false,
            _ => {
                last_seen.insert(key.to_string(), value.clone());
                true
            }
        }
    }

    /// Forget every recorded value
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Number of scope keys currently tracked
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, T>> {
        // The map is always left consistent, so a poisoned lock is still usable
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
