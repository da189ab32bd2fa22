// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::{debug, info};

use rifa_storage_api::audit_table::AuditTable;
use rifa_storage_api::order_table::{Order, OrderStatus, ReadOrderTable, WriteOrderTable};
use rifa_storage_api::product_table::{ProductStatus, ReadProductTable, WriteProductTable};
use rifa_storage_api::quota_table::{Quota, ReadQuotaTable, WriteQuotaTable};
use rifa_storage_api::{ProductLock, Storage, StorageError, Transaction};
use rifa_types::audit::{Actor, AuditAction, AuditEntry};
use rifa_types::config::ReservationOptions;
use rifa_types::identifiers::{OrderId, ProductId, QuotaNumber};

use crate::allocator;
use crate::clock::{Clock, SystemClock};
use crate::error::ReservationError;

/// Read-only view of a product's pool, per [`ReservationEngine::pool_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total: u32,
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
}

/// What one sweep pass reclaimed. Zero counts are a normal outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub released_quotas: u32,
    pub expired_orders: u32,
}

impl SweepOutcome {
    pub fn is_empty(&self) -> bool {
        self.released_quotas == 0 && self.expired_orders == 0
    }
}

/// Result of a completed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub drawn_number: QuotaNumber,
    pub winning_order_id: OrderId,
    pub total_sold: u32,
}

/// Orchestrates allocate → reserve → (confirm | cancel | expire) against
/// the quota ledger. Allocations for one product are serialized through
/// the [`ProductLock`]; all mutations of one operation happen in a single
/// storage transaction.
#[derive(Debug, Clone)]
pub struct ReservationEngine<S, L, C = SystemClock> {
    storage: S,
    locks: L,
    clock: C,
    options: ReservationOptions,
}

impl<S, L> ReservationEngine<S, L> {
    pub fn new(storage: S, locks: L, options: ReservationOptions) -> Self {
        Self {
            storage,
            locks,
            clock: SystemClock,
            options,
        }
    }
}

impl<S, L, C> ReservationEngine<S, L, C> {
    pub fn with_clock(storage: S, locks: L, options: ReservationOptions, clock: C) -> Self {
        Self {
            storage,
            locks,
            clock,
            options,
        }
    }

    pub fn options(&self) -> &ReservationOptions {
        &self.options
    }
}

impl<S, L, C> ReservationEngine<S, L, C>
where
    S: Storage + Clone + Send + Sync,
    L: ProductLock + Send + Sync,
    C: Clock,
{
    /// Creates the quota rows `1..=total_quotas` for a product, all
    /// Available. Idempotent: if the product already has quota rows (or a
    /// concurrent creation wins the race), nothing is written and 0 is
    /// returned. The surrounding application calls this when it marks a
    /// product Active.
    pub async fn create_quota_pool(
        &self,
        product_id: ProductId,
        total_quotas: u32,
        actor: Actor,
    ) -> Result<u32, ReservationError> {
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let product = txn
            .get_product(product_id)
            .await?
            .ok_or(ReservationError::ProductNotFound(product_id))?;
        if product.total_quotas != total_quotas {
            return Err(StorageError::DataIntegrityError.into());
        }

        if txn.quota_counts(product_id).await?.total() > 0 {
            debug!(%product_id, "quota pool already exists, nothing to create");
            return Ok(0);
        }

        let rows = (1..=total_quotas)
            .map(|number| Quota::available(product_id, QuotaNumber::new(number)))
            .collect();
        match txn.insert_quotas(rows).await {
            Ok(()) => {}
            Err(StorageError::AlreadyExists) => {
                // lost a creation race; the pool exists, which is all the
                // caller asked for
                debug!(%product_id, "quota pool created concurrently");
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        }

        txn.append_audit_entry(AuditEntry::new(
            actor,
            self.clock.now(),
            AuditAction::QuotaPoolCreated {
                product_id,
                created: total_quotas,
            },
        ))
        .await?;
        txn.commit().await?;

        info!(%product_id, created = total_quotas, "created quota pool");
        Ok(total_quotas)
    }

    /// Allocates `quantity` random quota numbers from the product's pool to
    /// the order, holding them as a soft reservation until the reserve
    /// window elapses. Returns the allocated numbers in ascending order.
    ///
    /// The whole operation runs under the product lock and commits
    /// atomically; a failure leaves the ledger untouched (the caller is
    /// responsible for cancelling the order it created).
    pub async fn allocate(
        &self,
        product_id: ProductId,
        quantity: u32,
        order_id: OrderId,
        actor: Actor,
    ) -> Result<Vec<QuotaNumber>, ReservationError> {
        let _product_guard = self.locks.lock_product(product_id).await;
        let now = self.clock.now();

        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let product = txn
            .get_product(product_id)
            .await?
            .ok_or(ReservationError::ProductNotFound(product_id))?;
        if product.status != ProductStatus::Active {
            return Err(ReservationError::ProductNotActive(product_id));
        }

        let mut order = txn
            .get_order(order_id)
            .await?
            .ok_or(ReservationError::OrderNotFound(order_id))?;
        if order.product_id != product_id {
            return Err(StorageError::DataIntegrityError.into());
        }

        let available = txn.quota_counts(product_id).await?.available;
        if available < quantity {
            return Err(ReservationError::InsufficientInventory {
                requested: quantity,
                available,
            });
        }

        let candidates = txn
            .available_quotas(product_id, self.options.max_candidate_scan)
            .await?;
        let mut picked = {
            let mut rng = rand::rng();
            allocator::pick_random(candidates, quantity as usize, &mut rng)?
        };

        let deadline = now + self.options.reserve_window();
        txn.reserve_quotas(product_id, &picked, order_id, deadline)
            .await?;

        order.status = OrderStatus::WaitingConfirm;
        order.reserve_expires_at = Some(deadline);
        txn.put_order(order).await?;

        txn.append_audit_entry(AuditEntry::new(
            actor,
            now,
            AuditAction::QuotasAllocated {
                product_id,
                order_id,
                quota_count: quantity,
            },
        ))
        .await?;
        txn.commit().await?;

        picked.sort_unstable();
        info!(
            %product_id,
            %order_id,
            count = picked.len(),
            "allocated quotas"
        );
        Ok(picked)
    }

    /// Confirms an order: the order becomes Confirmed and every quota it
    /// holds becomes Sold. Only orders that are Reserved or WaitingConfirm
    /// and not past their deadline can be confirmed; in particular,
    /// confirming an already-Confirmed order is an error, not a no-op.
    pub async fn confirm(&self, order_id: OrderId, actor: Actor) -> Result<(), ReservationError> {
        let now = self.clock.now();
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let mut order = txn
            .get_order(order_id)
            .await?
            .ok_or(ReservationError::OrderNotFound(order_id))?;
        if !matches!(
            order.status,
            OrderStatus::Reserved | OrderStatus::WaitingConfirm
        ) {
            return Err(ReservationError::InvalidStateTransition {
                order_id,
                from: order.status,
                attempted: OrderStatus::Confirmed,
            });
        }
        if order.is_expired(now) {
            return Err(ReservationError::OrderExpired(order_id));
        }

        order.status = OrderStatus::Confirmed;
        let product_id = order.product_id;
        txn.put_order(order).await?;

        let quotas_updated = txn.mark_order_quotas_sold(order_id).await?;
        txn.append_audit_entry(AuditEntry::new(
            actor,
            now,
            AuditAction::OrderConfirmed {
                order_id,
                product_id,
                quotas_updated,
            },
        ))
        .await?;
        txn.commit().await?;

        info!(%order_id, quotas_updated, "confirmed order");
        Ok(())
    }

    /// Cancels an order and releases its reserved quotas back to the pool.
    /// Cancelling an already-Canceled order is a successful no-op with
    /// zero mutations. Cancel is legal from every live state including
    /// Confirmed (the refund path; quotas already Sold stay Sold), but not
    /// from Expired, which is terminal.
    pub async fn cancel(&self, order_id: OrderId, actor: Actor) -> Result<(), ReservationError> {
        let now = self.clock.now();
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let mut order = txn
            .get_order(order_id)
            .await?
            .ok_or(ReservationError::OrderNotFound(order_id))?;
        if order.status == OrderStatus::Canceled {
            debug!(%order_id, "order already canceled");
            return Ok(());
        }
        if !order.status.can_transition_to(OrderStatus::Canceled) {
            return Err(ReservationError::InvalidStateTransition {
                order_id,
                from: order.status,
                attempted: OrderStatus::Canceled,
            });
        }

        order.status = OrderStatus::Canceled;
        let product_id = order.product_id;
        txn.put_order(order).await?;

        let quotas_released = txn.release_order_quotas(order_id).await?;
        txn.append_audit_entry(AuditEntry::new(
            actor,
            now,
            AuditAction::OrderCanceled {
                order_id,
                product_id,
                quotas_released,
            },
        ))
        .await?;
        txn.commit().await?;

        info!(%order_id, quotas_released, "canceled order");
        Ok(())
    }

    /// One reclamation pass: releases Reserved quotas whose deadline is
    /// strictly past and expires pending orders whose deadline is strictly
    /// past. The two set-based updates are independent and commit together.
    pub async fn sweep(&self, actor: Actor) -> Result<SweepOutcome, ReservationError> {
        let now = self.clock.now();
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let released_quotas = txn.release_expired_quotas(now).await?;
        let expired_orders = txn.expire_pending_orders(now).await?;

        let outcome = SweepOutcome {
            released_quotas,
            expired_orders,
        };
        if !outcome.is_empty() {
            txn.append_audit_entry(AuditEntry::new(
                actor,
                now,
                AuditAction::ReservationsExpired {
                    released_quotas,
                    expired_orders,
                },
            ))
            .await?;
        }
        txn.commit().await?;

        debug!(released_quotas, expired_orders, "sweep pass completed");
        Ok(outcome)
    }

    /// Draws the winning quota for a product, uniformly at random among its
    /// Sold quotas, and closes the product. Can be performed once.
    pub async fn draw(
        &self,
        product_id: ProductId,
        draw_source: String,
        actor: Actor,
    ) -> Result<DrawOutcome, ReservationError> {
        let _product_guard = self.locks.lock_product(product_id).await;
        let now = self.clock.now();

        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let mut product = txn
            .get_product(product_id)
            .await?
            .ok_or(ReservationError::ProductNotFound(product_id))?;
        if product.status != ProductStatus::Active {
            return Err(ReservationError::ProductNotActive(product_id));
        }
        if product.drawn_number.is_some() {
            return Err(ReservationError::DrawAlreadyCompleted(product_id));
        }

        let sold = txn.sold_quotas(product_id).await?;
        let winner = {
            let mut rng = rand::rng();
            allocator::pick_one(&sold, &mut rng)
                .cloned()
                .ok_or(ReservationError::NoSoldQuotas(product_id))?
        };
        let winning_order_id = winner.order_id.ok_or(StorageError::DataIntegrityError)?;

        product.drawn_number = Some(winner.number);
        product.draw_source = Some(draw_source);
        product.status = ProductStatus::Closed;
        txn.put_product(product).await?;

        let outcome = DrawOutcome {
            drawn_number: winner.number,
            winning_order_id,
            total_sold: sold.len() as u32,
        };
        txn.append_audit_entry(AuditEntry::new(
            actor,
            now,
            AuditAction::DrawCompleted {
                product_id,
                drawn_number: outcome.drawn_number,
                winning_order_id,
                total_sold: outcome.total_sold,
            },
        ))
        .await?;
        txn.commit().await?;

        info!(
            %product_id,
            drawn_number = %outcome.drawn_number,
            %winning_order_id,
            "draw completed"
        );
        Ok(outcome)
    }

    /// Read-only pool tally for a product.
    pub async fn pool_stats(&self, product_id: ProductId) -> Result<PoolStats, ReservationError> {
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;

        let product = txn
            .get_product(product_id)
            .await?
            .ok_or(ReservationError::ProductNotFound(product_id))?;
        let counts = txn.quota_counts(product_id).await?;

        Ok(PoolStats {
            total: product.total_quotas,
            available: counts.available,
            reserved: counts.reserved,
            sold: counts.sold,
        })
    }

    /// Fetches an order row. Read-only convenience for callers
    /// reconciling reservation outcomes.
    pub async fn order(&self, order_id: OrderId) -> Result<Order, ReservationError> {
        let mut storage = self.storage.clone();
        let mut txn = storage.transaction().await;
        txn.get_order(order_id)
            .await?
            .ok_or(ReservationError::OrderNotFound(order_id))
    }
}
