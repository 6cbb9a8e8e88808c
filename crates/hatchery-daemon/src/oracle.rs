//! Eligibility oracle: read-only claim-status checks against the ledger.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use hatchery_core::{ClaimStatus, IneligibleReason};
use thiserror::Error;

use crate::ledger::LedgerReader;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// Transient ledger failure. Retryable by the caller; never coerced
    /// into `eligible=false`.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

pub trait OracleClock: Send + Sync {
    fn unix_seconds(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl OracleClock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

pub struct EligibilityOracle {
    ledger: Arc<dyn LedgerReader>,
    clock: Arc<dyn OracleClock>,
}

impl EligibilityOracle {
    pub fn new(ledger: Arc<dyn LedgerReader>, clock: Arc<dyn OracleClock>) -> Self {
        Self { ledger, clock }
    }

    /// Pure read; no mutation anywhere. A template missing on-ledger is an
    /// ordinary ineligible outcome, not an error. When several disqualifiers
    /// hold at once the reported reason follows the fixed order:
    /// not-found → paused → outside-window → supply-exhausted → already-claimed.
    pub async fn check(
        &self,
        template_id: u64,
        wallet: Address,
    ) -> Result<ClaimStatus, OracleError> {
        let template = self
            .ledger
            .template(template_id)
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let Some(template) = template else {
            return Ok(ClaimStatus::ineligible(
                IneligibleReason::TemplateNotFound,
                false,
                None,
            ));
        };

        // The idempotent-claim read always runs for an existing template so
        // `already_claimed` stays truthful even when an earlier reason wins.
        let already_claimed = self
            .ledger
            .has_claimed(wallet, template_id)
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        let supply_remaining = template.supply_remaining();

        let reason = if template.paused {
            Some(IneligibleReason::Paused)
        } else if !template.within_window(self.clock.unix_seconds()) {
            Some(IneligibleReason::OutsideWindow)
        } else if template.supply_exhausted() {
            Some(IneligibleReason::SupplyExhausted)
        } else if already_claimed {
            Some(IneligibleReason::AlreadyClaimed)
        } else {
            None
        };

        Ok(match reason {
            Some(reason) => ClaimStatus::ineligible(reason, already_claimed, supply_remaining),
            None => ClaimStatus::eligible(already_claimed, supply_remaining),
        })
    }
}
