// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Audit records emitted by state-changing core operations. One entry per
//! successful operation; persisting or forwarding entries beyond the audit
//! table is the surrounding application's concern.

use std::fmt;

use crate::identifiers::{OrderId, ProductId, QuotaNumber};
use crate::time::MillisSinceEpoch;

/// Who requested a state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Actor {
    /// Internal actors, e.g. the expiry sweeper.
    System,
    /// An administrator, identified by the surrounding application.
    Admin(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::System => write!(f, "system"),
            Actor::Admin(id) => write!(f, "{id}"),
        }
    }
}

/// What happened, with the operation-specific details. The discriminant
/// [`AuditActionKind`] provides the stable snake_case action name.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum_macros::EnumDiscriminants,
)]
#[strum_discriminants(
    name(AuditActionKind),
    derive(strum_macros::Display),
    strum(serialize_all = "snake_case")
)]
pub enum AuditAction {
    QuotaPoolCreated {
        product_id: ProductId,
        created: u32,
    },
    QuotasAllocated {
        product_id: ProductId,
        order_id: OrderId,
        quota_count: u32,
    },
    OrderConfirmed {
        order_id: OrderId,
        product_id: ProductId,
        quotas_updated: u32,
    },
    OrderCanceled {
        order_id: OrderId,
        product_id: ProductId,
        quotas_released: u32,
    },
    ReservationsExpired {
        released_quotas: u32,
        expired_orders: u32,
    },
    DrawCompleted {
        product_id: ProductId,
        drawn_number: QuotaNumber,
        winning_order_id: OrderId,
        total_sold: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEntry {
    pub actor: Actor,
    pub timestamp: MillisSinceEpoch,
    pub action: AuditAction,
}

impl AuditEntry {
    pub fn new(actor: Actor, timestamp: MillisSinceEpoch, action: AuditAction) -> Self {
        Self {
            actor,
            timestamp,
            action,
        }
    }

    /// The stable action name, e.g. `order_confirmed`.
    pub fn action_kind(&self) -> AuditActionKind {
        AuditActionKind::from(&self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_stable() {
        let entry = AuditEntry::new(
            Actor::System,
            MillisSinceEpoch::new(0),
            AuditAction::OrderConfirmed {
                order_id: OrderId::new(7),
                product_id: ProductId::new(1),
                quotas_updated: 3,
            },
        );
        assert_eq!(entry.action_kind().to_string(), "order_confirmed");

        let entry = AuditEntry::new(
            Actor::Admin("ops-1".to_owned()),
            MillisSinceEpoch::new(0),
            AuditAction::ReservationsExpired {
                released_quotas: 3,
                expired_orders: 1,
            },
        );
        assert_eq!(entry.action_kind().to_string(), "reservations_expired");
        assert_eq!(entry.actor.to_string(), "ops-1");
    }
}
