// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use rifa_storage_api::{ProductLock, Storage};
use rifa_types::audit::Actor;

use crate::clock::Clock;
use crate::engine::ReservationEngine;

/// Periodic actor that reclaims expired reservations. Runs
/// [`ReservationEngine::sweep`] on a fixed interval until cancelled; a
/// failed pass commits nothing and is simply retried on the next tick.
pub struct Sweeper<S, L, C> {
    engine: ReservationEngine<S, L, C>,
}

impl<S, L, C> Sweeper<S, L, C>
where
    S: Storage + Clone + Send + Sync,
    L: ProductLock + Send + Sync,
    C: Clock,
{
    pub fn new(engine: ReservationEngine<S, L, C>) -> Self {
        Self { engine }
    }

    pub async fn run(self, cancellation: CancellationToken) -> anyhow::Result<()> {
        debug!("Running sweeper");

        let mut interval = tokio::time::interval(self.engine.options().sweep_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    debug!("Stopping sweeper");
                    break;
                }
                _ = interval.tick() => {
                    match self.engine.sweep(Actor::System).await {
                        Ok(outcome) if !outcome.is_empty() => {
                            info!(
                                released_quotas = outcome.released_quotas,
                                expired_orders = outcome.expired_orders,
                                "released expired reservations"
                            );
                        }
                        Ok(_) => {}
                        Err(err) => {
                            warn!(%err, "sweep pass failed, retrying on next tick");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
