// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use rifa_storage_api::StorageError;
use rifa_storage_api::order_table::OrderStatus;
use rifa_types::identifiers::{OrderId, ProductId};

/// Everything the reservation engine can fail with. Errors propagate to
/// the caller unchanged; the engine never retries internally.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("product {0} is not active")]
    ProductNotActive(ProductId),
    #[error("not enough quotas available: requested {requested}, available {available}")]
    InsufficientInventory { requested: u32, available: u32 },
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order {order_id} cannot move from {from} to {attempted}")]
    InvalidStateTransition {
        order_id: OrderId,
        from: OrderStatus,
        attempted: OrderStatus,
    },
    #[error("order {0} reservation has expired")]
    OrderExpired(OrderId),
    #[error("draw was already completed for product {0}")]
    DrawAlreadyCompleted(ProductId),
    #[error("product {0} has no sold quotas to draw from")]
    NoSoldQuotas(ProductId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ReservationError {
    /// Expected, user-facing failures (out of stock, inactive product,
    /// state conflicts) as opposed to internal storage errors. Callers use
    /// this to pick between a user message and an operator alert.
    pub fn is_expected(&self) -> bool {
        !matches!(self, ReservationError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_not_expected() {
        let err = ReservationError::InsufficientInventory {
            requested: 5,
            available: 2,
        };
        assert!(err.is_expected());

        let err = ReservationError::from(StorageError::DataIntegrityError);
        assert!(!err.is_expected());
    }
}
