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

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use rifa_storage_api::ProductLock;
use rifa_types::identifiers::ProductId;

/// Mutex-per-product map. Locks for different products are independent;
/// allocations against the same product queue up on its mutex. Entries are
/// created lazily and never removed — the map grows with the number of
/// products ever locked, which stays small.
#[derive(Debug, Clone, Default)]
pub struct ProductLockMap {
    locks: Arc<DashMap<ProductId, Arc<Mutex<()>>>>,
}

impl ProductLockMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductLock for ProductLockMap {
    type Guard = OwnedMutexGuard<()>;

    async fn lock_product(&self, product_id: ProductId) -> Self::Guard {
        let mutex = self
            .locks
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test_log::test(tokio::test)]
    async fn different_products_lock_independently() {
        let locks = ProductLockMap::new();
        let _held = locks.lock_product(ProductId::new(1)).await;

        // locking another product must not block on the held guard
        tokio::time::timeout(
            Duration::from_secs(1),
            locks.lock_product(ProductId::new(2)),
        )
        .await
        .expect("independent product lock should be immediate");
    }

    #[test_log::test(tokio::test)]
    async fn same_product_serializes() {
        let locks = ProductLockMap::new();
        let held = locks.lock_product(ProductId::new(1)).await;

        let contended = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock_product(ProductId::new(1)),
        )
        .await;
        assert!(contended.is_err(), "same-product lock should block");

        drop(held);
        tokio::time::timeout(
            Duration::from_secs(1),
            locks.lock_product(ProductId::new(1)),
        )
        .await
        .expect("lock should be available after release");
    }
}
