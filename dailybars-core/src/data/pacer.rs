//! Minimum spacing between provider requests, shared by all workers.
//!
//! Hyperliquid allows 1200 request weight per minute and a `candleSnapshot`
//! costs 20, so one request every 1.2s stays under the limit no matter how
//! many workers are fetching.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until a request slot is free and claim it.
    ///
    /// The lock is held while sleeping so concurrent callers queue up in turn.
    pub fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last.lock().unwrap();
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1200))
    }
}
