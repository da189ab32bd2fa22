// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The storage abstraction the reservation engine runs against: typed
//! tables over the quota ledger, transactional access to them, and the
//! product-serialization lock. Implementations decide the backing store;
//! the engine only sees these traits.

use std::future::Future;

use rifa_types::identifiers::ProductId;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("generic storage error: {0}")]
    Generic(#[from] anyhow::Error),
    #[error("integrity constraint is violated")]
    DataIntegrityError,
    #[error("row already exists")]
    AlreadyExists,
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub mod audit_table;
pub mod order_table;
pub mod product_table;
pub mod quota_table;

/// A unit of atomic access to the ledger. All reads observe the state as
/// of the transaction start plus the transaction's own writes; either every
/// mutation becomes visible at [`Transaction::commit`] or none does.
pub trait Transaction:
    product_table::ReadProductTable
    + product_table::WriteProductTable
    + quota_table::ReadQuotaTable
    + quota_table::WriteQuotaTable
    + order_table::ReadOrderTable
    + order_table::WriteOrderTable
    + audit_table::AuditTable
    + Send
{
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
}

pub trait Storage {
    type TransactionType<'a>: Transaction
    where
        Self: 'a;

    fn transaction(&mut self) -> impl Future<Output = Self::TransactionType<'_>> + Send;
}

/// Serializes allocations per product. A relational backend satisfies this
/// with `SELECT ... FOR UPDATE` on the product row; the in-memory backend
/// keeps a mutex per product. Different products must be lockable
/// concurrently and independently.
pub trait ProductLock {
    type Guard: Send;

    fn lock_product(&self, product_id: ProductId) -> impl Future<Output = Self::Guard> + Send;
}
