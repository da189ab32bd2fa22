// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// # Reservation options
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, derive_builder::Builder)]
#[serde(rename_all = "kebab-case")]
#[builder(default)]
pub struct ReservationOptions {
    /// # Reserve window
    ///
    /// How long allocated quotas are held for an order before the sweeper
    /// releases them back into the pool.
    ///
    /// Can be configured using the [`humantime`](https://docs.rs/humantime/latest/humantime/fn.parse_duration.html) format.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub reserve_window: humantime::Duration,

    /// # Sweep interval
    ///
    /// How often the expiry sweeper scans for reservations past their
    /// deadline.
    ///
    /// Can be configured using the [`humantime`](https://docs.rs/humantime/latest/humantime/fn.parse_duration.html) format.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub sweep_interval: humantime::Duration,

    /// # Candidate scan cap
    ///
    /// Upper bound on the number of available quota numbers loaded as
    /// sampling candidates for a single allocation. Pools larger than the
    /// cap are sampled from their first `max_candidate_scan` numbers in
    /// ascending order; this is a documented fairness boundary for very
    /// large pools, traded for bounded memory and latency.
    pub max_candidate_scan: usize,
}

impl ReservationOptions {
    pub fn reserve_window(&self) -> Duration {
        *self.reserve_window
    }

    pub fn sweep_interval(&self) -> Duration {
        *self.sweep_interval
    }
}

impl Default for ReservationOptions {
    fn default() -> Self {
        Self {
            reserve_window: Duration::from_secs(15 * 60).into(),
            sweep_interval: Duration::from_secs(5 * 60).into(),
            max_candidate_scan: 10_000,
        }
    }
}
