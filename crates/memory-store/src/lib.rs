// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! In-memory implementation of the rifa storage API. The reference backend
//! for tests and single-node deployments without an external store.
//!
//! A transaction takes the table lock for its lifetime and mutates a
//! scratch copy of the tables, which is swapped in wholesale on commit.
//! Dropping a transaction without committing therefore discards every
//! buffered mutation. Mutual exclusion at the table level means row-level
//! skip-locked acquisition degenerates to serialized transactions here;
//! per-product allocation ordering is provided by [`ProductLockMap`].

mod lock;
mod storage;

pub use lock::ProductLockMap;
pub use storage::{MemoryStorage, MemoryTransaction};
