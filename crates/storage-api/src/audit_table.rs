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

use rifa_types::audit::AuditEntry;

use crate::Result;

/// Append-only log of state-changing operations.
pub trait AuditTable {
    fn append_audit_entry(&mut self, entry: AuditEntry) -> impl Future<Output = Result<()>> + Send;
}
