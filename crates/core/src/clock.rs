// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Clock abstraction so reaper/TTL logic can be driven by a fake clock in tests.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of "now", injected everywhere the registry/reaper need a
/// timestamp so tests can fast-forward idle resources past their TTL
/// without a real sleep.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> SystemTime;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Seconds since the Unix epoch, saturating to 0 on clock errors.
pub fn unix_seconds(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs()
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A clock that only advances when told to. Shared via `Arc` so the
    /// test and the code under test see the same time.
    #[derive(Clone)]
    pub struct FakeClock(Arc<Mutex<SystemTime>>);

    impl FakeClock {
        pub fn new() -> Self {
            Self(Arc::new(Mutex::new(SystemTime::now())))
        }

        pub fn advance(&self, by: Duration) {
            let mut guard = self.0.lock();
            *guard += by;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> SystemTime {
            *self.0.lock()
        }
    }
}
