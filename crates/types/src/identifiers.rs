// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Identifiers for the entities the reservation core operates on.

/// Identifies a product, i.e. one raffle with its fixed-size quota pool.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Debug,
    derive_more::FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
#[display("p{}", _0)]
#[debug("p{}", _0)]
pub struct ProductId(u64);

impl ProductId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Identifies an order, the buyer-side handle a reservation is bound to.
/// Order rows are created by the surrounding application; the core only
/// references them.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Debug,
    derive_more::FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
#[display("o{}", _0)]
#[debug("o{}", _0)]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A quota number within a product's pool. Valid numbers run from 1 to the
/// product's `total_quotas`, inclusive.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    derive_more::Debug,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
#[display("{}", _0)]
#[debug("#{}", _0)]
pub struct QuotaNumber(u32);

impl QuotaNumber {
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}
