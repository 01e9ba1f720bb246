//! Timestamps and per-tenant clocks
//!
//! Entry timestamps are Unix milliseconds and strictly increase within a
//! tenant, even if the wall clock stalls or steps backwards.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Unix time in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create from milliseconds since the epoch
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the epoch
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of wall-clock time
pub trait TimeSource: Send + Sync {
    /// Current Unix time in milliseconds
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`std::time::SystemTime`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// Issues strictly increasing timestamps for one tenant
pub struct TenantClock {
    source: Arc<dyn TimeSource>,
    last: Mutex<u64>,
}

impl TenantClock {
    /// Clock over an arbitrary time source
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        Self {
            source,
            last: Mutex::new(0),
        }
    }

    /// Clock over the system wall clock
    pub fn system() -> Self {
        Self::new(Arc::new(SystemTimeSource))
    }

    /// Resume after a known timestamp, e.g. the newest persisted entry
    pub fn resume_after(self, last: Timestamp) -> Self {
        *self.last.lock() = last.0;
        self
    }

    /// Next timestamp: `max(now, last + 1)`
    pub fn next(&self) -> Timestamp {
        let now = self.source.now_ms();
        let mut last = self.last.lock();
        let next = now.max(last.saturating_add(1));
        if now < *last {
            debug!(now, last = *last, "wall clock behind last timestamp");
        }
        *last = next;
        Timestamp(next)
    }
}

impl fmt::Debug for TenantClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantClock")
            .field("last", &*self.last.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Stalled(AtomicU64);

    impl TimeSource for Stalled {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_strictly_increasing_when_clock_stalls() {
        let clock = TenantClock::new(Arc::new(Stalled(AtomicU64::new(1_000))));
        let a = clock.next();
        let b = clock.next();
        let c = clock.next();
        assert_eq!(a, Timestamp(1_000));
        assert!(a < b && b < c);
    }

    #[test]
    fn test_clock_stepping_backwards() {
        let source = Arc::new(Stalled(AtomicU64::new(5_000)));
        let clock = TenantClock::new(source.clone());
        let first = clock.next();
        source.0.store(10, Ordering::SeqCst);
        assert!(clock.next() > first);
    }

    #[test]
    fn test_resume_after() {
        let clock = TenantClock::new(Arc::new(Stalled(AtomicU64::new(1))))
            .resume_after(Timestamp(500));
        assert_eq!(clock.next(), Timestamp(501));
    }

    #[test]
    fn test_concurrent_callers_get_unique_timestamps() {
        let clock = Arc::new(TenantClock::new(Arc::new(Stalled(AtomicU64::new(0)))));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || (0..100).map(|_| clock.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<Timestamp> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
