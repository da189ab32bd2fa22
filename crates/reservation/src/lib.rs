// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The inventory reservation engine: random allocation of quota numbers
//! against a fixed-size per-product pool, time-limited soft reservations,
//! and confirm/cancel/expire reconciliation, without double-selling or
//! losing quotas.
//!
//! The engine coordinates through the storage layer's transaction and
//! product-lock primitives only; see [`rifa_storage_api`] for the seams a
//! backing store has to provide.

mod allocator;
mod clock;
mod engine;
mod error;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{DrawOutcome, PoolStats, ReservationEngine, SweepOutcome};
pub use error::ReservationError;
pub use sweeper::Sweeper;
