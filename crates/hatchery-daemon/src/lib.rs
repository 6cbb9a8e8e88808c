// Copyright (c) 2026 Hatchery Contributors
// SPDX-License-Identifier: Apache-2.0

//! hatchery-daemon
//!
//! The server-side half of the Hatchery collectible engine: eligibility
//! oracle over the ledger RPC, per-session claim-status cache, EIP-712
//! authorization signer, and the HTTP metadata/signature endpoints.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cache;
pub mod config;
pub mod ledger;
pub mod oracle;
pub mod server;
pub mod signer;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testutil;
