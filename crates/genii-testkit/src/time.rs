//! Deterministic time source

use std::sync::atomic::{AtomicU64, Ordering};

use genii_core::TimeSource;

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    now: AtomicU64,
}

impl FixedTimeSource {
    /// Start at `ms`
    pub fn at(ms: u64) -> Self {
        Self {
            now: AtomicU64::new(ms),
        }
    }

    /// Set the current time, possibly backwards
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
