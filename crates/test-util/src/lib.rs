// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Useful test utilities for rifa crates. Import them with:
//!
//! ```rust
//! use rifa_test_util::{assert, assert_eq, assert_ne};
//! ```
//!
//! Note: You cannot import them with a glob import, as the compiler won't be able to distinguish our imports and the stdlib imports.

// A couple of useful re-exports
pub use assert2::{assert, check, let_assert};
pub use pretty_assertions::{assert_eq, assert_ne};
