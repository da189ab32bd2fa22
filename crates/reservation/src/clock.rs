// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rifa_types::time::MillisSinceEpoch;

/// Source of the current wall-clock time. Deadlines and expiry checks go
/// through this seam so tests can drive time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> MillisSinceEpoch;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> MillisSinceEpoch {
        MillisSinceEpoch::now()
    }
}

/// A clock that only moves when told to. For tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now: MillisSinceEpoch) -> Self {
        Self {
            now_millis: Arc::new(AtomicU64::new(now.as_u64())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now_millis
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, now: MillisSinceEpoch) {
        self.now_millis.store(now.as_u64(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> MillisSinceEpoch {
        MillisSinceEpoch::new(self.now_millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new(MillisSinceEpoch::new(1_000));
        assert_eq!(clock.now(), MillisSinceEpoch::new(1_000));

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), MillisSinceEpoch::new(2_000));

        let view = clock.clone();
        view.set(MillisSinceEpoch::new(10));
        assert_eq!(clock.now(), MillisSinceEpoch::new(10));
    }
}
