//! Shared in-memory doubles for unit tests.

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;
use async_trait::async_trait;
use hatchery_core::{Template, TemplateTier};
use parking_lot::Mutex;

use crate::ledger::{LedgerError, LedgerReader};
use crate::oracle::OracleClock;

#[derive(Default)]
pub(crate) struct MemoryLedger {
    pub templates: Mutex<HashMap<u64, Template>>,
    pub claimed: Mutex<HashSet<(Address, u64)>>,
    pub scores: Mutex<HashMap<u64, u64>>,
    /// Template ids whose reads fail with a transport error.
    pub failing: Mutex<HashSet<u64>>,
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn template(&self, template_id: u64) -> Result<Option<Template>, LedgerError> {
        if self.failing.lock().contains(&template_id) {
            return Err(LedgerError::Transport("connection refused".to_string()));
        }
        Ok(self.templates.lock().get(&template_id).cloned())
    }

    async fn has_claimed(&self, wallet: Address, template_id: u64) -> Result<bool, LedgerError> {
        Ok(self.claimed.lock().contains(&(wallet, template_id)))
    }

    async fn score(&self, profile_id: u64) -> Result<u64, LedgerError> {
        self.scores
            .lock()
            .get(&profile_id)
            .copied()
            .ok_or_else(|| LedgerError::Rpc("profile not found".to_string()))
    }
}

pub(crate) struct FixedClock(pub u64);

impl OracleClock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}

pub(crate) fn open_template(template_id: u64) -> Template {
    Template {
        template_id,
        issuer: Address::repeat_byte(0x11),
        max_supply: 0,
        current_supply: 0,
        tier: TemplateTier::Diamond,
        start_time: 0,
        end_time: 0,
        paused: false,
    }
}
