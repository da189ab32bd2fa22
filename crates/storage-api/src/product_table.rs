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

use rifa_types::identifiers::{ProductId, QuotaNumber};

use crate::Result;

/// Lifecycle of a product. Quota rows exist only for products that have
/// been activated; `draw` closes the product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Active,
    Closed,
}

/// A product row. Created and priced by the surrounding application; the
/// core reads it for allocation preconditions and writes it only when
/// recording a completed draw.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub total_quotas: u32,
    pub status: ProductStatus,
    /// Set once the draw has been completed.
    pub drawn_number: Option<QuotaNumber>,
    /// Free-form description of how the draw was performed.
    pub draw_source: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, total_quotas: u32, status: ProductStatus) -> Self {
        Self {
            id,
            total_quotas,
            status,
            drawn_number: None,
            draw_source: None,
        }
    }
}

pub trait ReadProductTable {
    fn get_product(
        &mut self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>>> + Send;
}

pub trait WriteProductTable {
    fn put_product(&mut self, product: Product) -> impl Future<Output = Result<()>> + Send;
}
