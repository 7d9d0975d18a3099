use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_sec(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_sec(&self) -> u64 {
        now_sec()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_sec: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now_sec)),
        }
    }

    pub fn set(&self, now_sec: u64) {
        self.now.store(now_sec, Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_secs(), Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_sec(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

pub(crate) fn now_sec() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub(crate) fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
