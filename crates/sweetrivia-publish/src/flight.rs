//! At-most-one in-progress operation per key.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks which keys have an operation running.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    running: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `None` while another claim is held.
    pub fn try_begin(&self, key: &str) -> Option<FlightGuard> {
        let mut running = self.running();
        if !running.insert(key.to_string()) {
            return None;
        }
        Some(FlightGuard {
            running: Arc::clone(&self.running),
            key: key.to_string(),
        })
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.running().contains(key)
    }

    fn running(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    running: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running.remove(&self.key);
    }
}
