// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use rifa_storage_api::audit_table::AuditTable;
use rifa_storage_api::order_table::{Order, ReadOrderTable, WriteOrderTable};
use rifa_storage_api::product_table::{Product, ReadProductTable, WriteProductTable};
use rifa_storage_api::quota_table::{
    Quota, QuotaCounts, QuotaStatus, ReadQuotaTable, WriteQuotaTable,
};
use rifa_storage_api::{Result, Storage, StorageError, Transaction};
use rifa_types::audit::AuditEntry;
use rifa_types::identifiers::{OrderId, ProductId, QuotaNumber};
use rifa_types::time::MillisSinceEpoch;

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    // BTreeMap keeps quota rows in (product, number) order, which gives the
    // available-quota scan its stable ascending order for free.
    quotas: BTreeMap<(ProductId, QuotaNumber), Quota>,
    orders: HashMap<OrderId, Order>,
    audit_log: Vec<AuditEntry>,
}

impl Tables {
    fn product_range(
        &self,
        product_id: ProductId,
    ) -> impl Iterator<Item = (&(ProductId, QuotaNumber), &Quota)> {
        self.quotas.range(
            (product_id, QuotaNumber::new(u32::MIN))..=(product_id, QuotaNumber::new(u32::MAX)),
        )
    }
}

/// Cloneable handle to an in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test support: number of audit entries recorded so far.
    pub async fn audit_entry_count(&self) -> usize {
        self.tables.lock().await.audit_log.len()
    }

    /// Test support: a copy of the recorded audit log.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.tables.lock().await.audit_log.clone()
    }
}

impl Storage for MemoryStorage {
    type TransactionType<'a> = MemoryTransaction;

    async fn transaction(&mut self) -> MemoryTransaction {
        let guard = self.tables.clone().lock_owned().await;
        let scratch = guard.clone();
        MemoryTransaction { guard, scratch }
    }
}

/// A transaction over [`MemoryStorage`]. Reads and writes go to a scratch
/// copy of the tables; [`Transaction::commit`] swaps the scratch in. The
/// table lock is held until the transaction is committed or dropped.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    scratch: Tables,
}

impl Transaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let MemoryTransaction { mut guard, scratch } = self;
        *guard = scratch;
        Ok(())
    }
}

impl ReadProductTable for MemoryTransaction {
    async fn get_product(&mut self, product_id: ProductId) -> Result<Option<Product>> {
        Ok(self.scratch.products.get(&product_id).cloned())
    }
}

impl WriteProductTable for MemoryTransaction {
    async fn put_product(&mut self, product: Product) -> Result<()> {
        self.scratch.products.insert(product.id, product);
        Ok(())
    }
}

impl ReadQuotaTable for MemoryTransaction {
    async fn get_quota(
        &mut self,
        product_id: ProductId,
        number: QuotaNumber,
    ) -> Result<Option<Quota>> {
        Ok(self.scratch.quotas.get(&(product_id, number)).cloned())
    }

    async fn quota_counts(&mut self, product_id: ProductId) -> Result<QuotaCounts> {
        let mut counts = QuotaCounts::default();
        for (_, quota) in self.scratch.product_range(product_id) {
            match quota.status {
                QuotaStatus::Available => counts.available += 1,
                QuotaStatus::Reserved => counts.reserved += 1,
                QuotaStatus::Sold => counts.sold += 1,
            }
        }
        Ok(counts)
    }

    async fn available_quotas(
        &mut self,
        product_id: ProductId,
        limit: usize,
    ) -> Result<Vec<QuotaNumber>> {
        Ok(self
            .scratch
            .product_range(product_id)
            .filter(|(_, quota)| quota.status == QuotaStatus::Available)
            .take(limit)
            .map(|(&(_, number), _)| number)
            .collect())
    }

    async fn sold_quotas(&mut self, product_id: ProductId) -> Result<Vec<Quota>> {
        Ok(self
            .scratch
            .product_range(product_id)
            .filter(|(_, quota)| quota.status == QuotaStatus::Sold)
            .map(|(_, quota)| quota.clone())
            .collect())
    }
}

impl WriteQuotaTable for MemoryTransaction {
    async fn insert_quotas(&mut self, quotas: Vec<Quota>) -> Result<()> {
        for quota in &quotas {
            if self
                .scratch
                .quotas
                .contains_key(&(quota.product_id, quota.number))
            {
                return Err(StorageError::AlreadyExists);
            }
        }
        for quota in quotas {
            self.scratch
                .quotas
                .insert((quota.product_id, quota.number), quota);
        }
        Ok(())
    }

    async fn reserve_quotas(
        &mut self,
        product_id: ProductId,
        numbers: &[QuotaNumber],
        order_id: OrderId,
        reserved_until: MillisSinceEpoch,
    ) -> Result<()> {
        for &number in numbers {
            let quota = self
                .scratch
                .quotas
                .get_mut(&(product_id, number))
                .ok_or(StorageError::DataIntegrityError)?;
            if quota.status != QuotaStatus::Available {
                return Err(StorageError::DataIntegrityError);
            }
            quota.status = QuotaStatus::Reserved;
            quota.order_id = Some(order_id);
            quota.reserved_until = Some(reserved_until);
        }
        Ok(())
    }

    async fn mark_order_quotas_sold(&mut self, order_id: OrderId) -> Result<u32> {
        let mut updated = 0;
        for quota in self.scratch.quotas.values_mut() {
            if quota.order_id == Some(order_id) && quota.status == QuotaStatus::Reserved {
                quota.status = QuotaStatus::Sold;
                quota.reserved_until = None;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn release_order_quotas(&mut self, order_id: OrderId) -> Result<u32> {
        let mut released = 0;
        for quota in self.scratch.quotas.values_mut() {
            if quota.order_id == Some(order_id) && quota.status == QuotaStatus::Reserved {
                quota.status = QuotaStatus::Available;
                quota.order_id = None;
                quota.reserved_until = None;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn release_expired_quotas(&mut self, now: MillisSinceEpoch) -> Result<u32> {
        let mut released = 0;
        for quota in self.scratch.quotas.values_mut() {
            if quota.status == QuotaStatus::Reserved
                && quota.reserved_until.is_some_and(|deadline| deadline < now)
            {
                quota.status = QuotaStatus::Available;
                quota.order_id = None;
                quota.reserved_until = None;
                released += 1;
            }
        }
        Ok(released)
    }
}

impl ReadOrderTable for MemoryTransaction {
    async fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.scratch.orders.get(&order_id).cloned())
    }
}

impl WriteOrderTable for MemoryTransaction {
    async fn put_order(&mut self, order: Order) -> Result<()> {
        self.scratch.orders.insert(order.id, order);
        Ok(())
    }

    async fn expire_pending_orders(&mut self, now: MillisSinceEpoch) -> Result<u32> {
        let mut expired = 0;
        for order in self.scratch.orders.values_mut() {
            if order.status.is_expirable()
                && order
                    .reserve_expires_at
                    .is_some_and(|deadline| deadline < now)
            {
                order.status = rifa_storage_api::order_table::OrderStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

impl AuditTable for MemoryTransaction {
    async fn append_audit_entry(&mut self, entry: AuditEntry) -> Result<()> {
        self.scratch.audit_log.push(entry);
        Ok(())
    }
}
