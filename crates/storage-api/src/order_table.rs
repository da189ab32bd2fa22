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

use rifa_types::identifiers::{OrderId, ProductId};
use rifa_types::time::MillisSinceEpoch;

use crate::Result;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Reserved,
    WaitingProof,
    WaitingConfirm,
    Confirmed,
    Canceled,
    Expired,
}

impl OrderStatus {
    /// Any state a live, unresolved order can be in.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            OrderStatus::Reserved | OrderStatus::WaitingProof | OrderStatus::WaitingConfirm
        )
    }

    /// The pending subset the sweeper may expire. Orders waiting on an
    /// uploaded payment proof are left alone.
    pub fn is_expirable(&self) -> bool {
        matches!(self, OrderStatus::Reserved | OrderStatus::WaitingConfirm)
    }

    /// The order state machine. `Canceled → WaitingConfirm` is the manual
    /// reopen path available to the admin surface; `Confirmed → Canceled`
    /// is the refund path; `Expired` is terminal and only ever entered
    /// through the sweeper.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Reserved, WaitingProof | WaitingConfirm | Confirmed | Canceled | Expired) => true,
            (WaitingProof, WaitingConfirm | Confirmed | Canceled) => true,
            (WaitingConfirm, Confirmed | Canceled | Expired) => true,
            (Confirmed, Canceled) => true,
            (Canceled, WaitingConfirm) => true,
            _ => false,
        }
    }
}

/// An order row. The surrounding application creates it (buyer identity,
/// pricing and payment proof live there); the core owns its status and
/// reservation deadline from allocation onwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    /// Number of quotas the buyer asked for.
    pub quantity: u32,
    pub status: OrderStatus,
    /// Mirrors the latest deadline assigned to the order's quotas.
    pub reserve_expires_at: Option<MillisSinceEpoch>,
}

impl Order {
    pub fn new(id: OrderId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            id,
            product_id,
            quantity,
            status: OrderStatus::Reserved,
            reserve_expires_at: None,
        }
    }

    pub fn is_expired(&self, now: MillisSinceEpoch) -> bool {
        self.reserve_expires_at
            .is_some_and(|deadline| deadline < now)
    }
}

pub trait ReadOrderTable {
    fn get_order(&mut self, order_id: OrderId)
        -> impl Future<Output = Result<Option<Order>>> + Send;
}

pub trait WriteOrderTable {
    fn put_order(&mut self, order: Order) -> impl Future<Output = Result<()>> + Send;

    /// Transitions every expirable pending order whose deadline is strictly
    /// before `now` to Expired. Returns the number of orders expired.
    fn expire_pending_orders(
        &mut self,
        now: MillisSinceEpoch,
    ) -> impl Future<Output = Result<u32>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn transition_table() {
        // the happy path
        assert!(Reserved.can_transition_to(WaitingProof));
        assert!(WaitingProof.can_transition_to(WaitingConfirm));
        assert!(WaitingConfirm.can_transition_to(Confirmed));

        // cancellation from every live state and the refund path
        for from in [Reserved, WaitingProof, WaitingConfirm, Confirmed] {
            assert!(from.can_transition_to(Canceled), "{from} -> canceled");
        }

        // expiry is reached only from the expirable subset
        assert!(Reserved.can_transition_to(Expired));
        assert!(WaitingConfirm.can_transition_to(Expired));
        assert!(!WaitingProof.can_transition_to(Expired));

        // terminal states, with the manual reopen exception
        assert!(Canceled.can_transition_to(WaitingConfirm));
        assert!(!Canceled.can_transition_to(Confirmed));
        for to in [Reserved, WaitingProof, WaitingConfirm, Confirmed, Canceled] {
            assert!(!Expired.can_transition_to(to), "expired -> {to}");
        }

        // no self-loops
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn expirable_is_subset_of_pending() {
        for status in [
            Reserved,
            WaitingProof,
            WaitingConfirm,
            Confirmed,
            Canceled,
            Expired,
        ] {
            if status.is_expirable() {
                assert!(status.is_pending());
            }
        }
        assert!(WaitingProof.is_pending());
        assert!(!WaitingProof.is_expirable());
    }

    #[test]
    fn order_expiry_is_strict() {
        let mut order = Order::new(OrderId::new(1), ProductId::new(1), 2);
        let now = MillisSinceEpoch::new(1_000);
        assert!(!order.is_expired(now));

        order.reserve_expires_at = Some(now);
        assert!(!order.is_expired(now));

        order.reserve_expires_at = Some(MillisSinceEpoch::new(999));
        assert!(order.is_expired(now));
    }
}
