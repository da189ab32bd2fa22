// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::future::Future;

use rifa_types::identifiers::{OrderId, ProductId, QuotaNumber};
use rifa_types::time::MillisSinceEpoch;

use crate::Result;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum QuotaStatus {
    Available,
    Reserved,
    Sold,
}

/// A single numbered, sellable unit of a product's inventory.
///
/// # Invariants
/// `(product_id, number)` is unique. Reserved rows carry an owning order
/// and a deadline; Sold rows carry an owning order and no deadline;
/// Available rows carry neither. Rows are created once per product and only
/// transition status afterwards: `Available → Reserved → {Sold, Available}`,
/// with Sold terminal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quota {
    pub product_id: ProductId,
    pub number: QuotaNumber,
    pub status: QuotaStatus,
    pub order_id: Option<OrderId>,
    pub reserved_until: Option<MillisSinceEpoch>,
}

impl Quota {
    /// A freshly created, unowned quota.
    pub fn available(product_id: ProductId, number: QuotaNumber) -> Self {
        Self {
            product_id,
            number,
            status: QuotaStatus::Available,
            order_id: None,
            reserved_until: None,
        }
    }

    pub fn is_expired(&self, now: MillisSinceEpoch) -> bool {
        self.status == QuotaStatus::Reserved
            && self.reserved_until.is_some_and(|deadline| deadline < now)
    }
}

/// Per-product status tally. `available + reserved + sold` equals the
/// number of quota rows created for the product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuotaCounts {
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
}

impl QuotaCounts {
    pub fn total(&self) -> u32 {
        self.available + self.reserved + self.sold
    }
}

pub trait ReadQuotaTable {
    fn get_quota(
        &mut self,
        product_id: ProductId,
        number: QuotaNumber,
    ) -> impl Future<Output = Result<Option<Quota>>> + Send;

    fn quota_counts(
        &mut self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<QuotaCounts>> + Send;

    /// Available quota numbers for the product in ascending number order,
    /// at most `limit` of them. The stable order makes the allocation
    /// candidate cap deterministic.
    fn available_quotas(
        &mut self,
        product_id: ProductId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<QuotaNumber>>> + Send;

    fn sold_quotas(
        &mut self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<Quota>>> + Send;
}

pub trait WriteQuotaTable {
    /// Bulk-inserts freshly created rows. Fails with
    /// [`crate::StorageError::AlreadyExists`] if any `(product, number)`
    /// pair is already present.
    fn insert_quotas(&mut self, quotas: Vec<Quota>) -> impl Future<Output = Result<()>> + Send;

    /// Moves the given Available rows to Reserved, binding them to the
    /// order with the given deadline. Fails with
    /// [`crate::StorageError::DataIntegrityError`] if any requested row is
    /// missing or not Available.
    fn reserve_quotas(
        &mut self,
        product_id: ProductId,
        numbers: &[QuotaNumber],
        order_id: OrderId,
        reserved_until: MillisSinceEpoch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Transitions every Reserved row owned by the order to Sold, clearing
    /// the deadline. Returns the number of rows updated.
    fn mark_order_quotas_sold(
        &mut self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<u32>> + Send;

    /// Releases every Reserved row owned by the order back to Available,
    /// clearing owner and deadline. Returns the number of rows released.
    fn release_order_quotas(
        &mut self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<u32>> + Send;

    /// Releases every Reserved row whose deadline is strictly before `now`,
    /// across all products. Returns the number of rows released.
    fn release_expired_quotas(
        &mut self,
        now: MillisSinceEpoch,
    ) -> impl Future<Output = Result<u32>> + Send;
}
