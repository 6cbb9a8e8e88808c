// Copyright (c) 2026 Hatchery Contributors
// SPDX-License-Identifier: Apache-2.0

//! hatchery-core
//!
//! Pure domain logic for the Hatchery collectible engine:
//! - Template / claim-status value types shared with the daemon
//! - The ordered evolution-stage table and score resolution
//! - The deterministic art engine (seeded PRNG, palette, SVG render)
//! - EIP-712 typed-data hashing for claim authorizations
//!
//! Nothing in this crate performs I/O. Two calls with identical inputs
//! produce byte-identical output, which the daemon and any independent
//! observer (indexer, marketplace, viewer) rely on.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod art;
pub mod error;
pub mod palette;
pub mod prng;
pub mod stage;
pub mod template;
pub mod typed_data;

pub use crate::error::{CoreError, CoreResult};
pub use crate::template::{ClaimStatus, IneligibleReason, Template, TemplateTier};
