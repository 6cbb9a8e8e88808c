//! Per-session claim-status cache.
//!
//! Read-through over the eligibility oracle for one wallet. No TTL: entries
//! only change on an explicit `refresh`, so staleness after a claim is the
//! caller's job to clear by refreshing again. A refresh fans out one oracle
//! read per template; each slot independently holds a status or the error
//! that produced it, and results are only installed once the whole batch has
//! resolved, so an abandoned refresh never writes anything.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use hatchery_core::ClaimStatus;
use parking_lot::RwLock;
use tokio::task::JoinSet;

use crate::oracle::{EligibilityOracle, OracleError};
use crate::telemetry::Telemetry;

pub type SlotResult = Result<ClaimStatus, OracleError>;

pub struct ClaimStatusCache {
    oracle: Arc<EligibilityOracle>,
    wallet: Address,
    entries: Arc<RwLock<HashMap<u64, SlotResult>>>,
    telemetry: Telemetry,
}

impl ClaimStatusCache {
    pub fn new(oracle: Arc<EligibilityOracle>, wallet: Address, telemetry: Telemetry) -> Self {
        Self {
            oracle,
            wallet,
            entries: Arc::new(RwLock::new(HashMap::new())),
            telemetry,
        }
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    /// Last-known result for a template, if any refresh has covered it.
    pub fn get(&self, template_id: u64) -> Option<SlotResult> {
        self.entries.read().get(&template_id).cloned()
    }

    /// Recompute the requested templates concurrently. One template's
    /// failure never fails the others. All refreshed slots are installed in
    /// a single critical section, so a concurrent `get` observes either the
    /// previous complete entry or the new one, never a half-written state.
    pub async fn refresh(&self, template_ids: &[u64]) -> HashMap<u64, SlotResult> {
        self.telemetry.record_cache_refresh();
        let mut tasks = JoinSet::new();
        for &template_id in template_ids {
            let oracle = Arc::clone(&self.oracle);
            let wallet = self.wallet;
            tasks.spawn(async move { (template_id, oracle.check(template_id, wallet).await) });
        }

        let mut fresh = HashMap::with_capacity(template_ids.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((template_id, result)) => {
                    if result.is_err() {
                        self.telemetry.record_oracle_failure();
                    }
                    fresh.insert(template_id, result);
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "eligibility refresh task failed to join");
                }
            }
        }

        {
            let mut entries = self.entries.write();
            for (template_id, result) in &fresh {
                entries.insert(*template_id, result.clone());
            }
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::EligibilityOracle;
    use crate::testutil::{open_template, FixedClock, MemoryLedger};
    use hatchery_core::IneligibleReason;

    fn wallet() -> Address {
        Address::repeat_byte(0xAA)
    }

    fn cache_over(ledger: Arc<MemoryLedger>) -> ClaimStatusCache {
        let oracle = Arc::new(EligibilityOracle::new(ledger, Arc::new(FixedClock(1_000))));
        ClaimStatusCache::new(oracle, wallet(), Telemetry::new())
    }

    #[tokio::test]
    async fn get_is_empty_before_any_refresh() {
        let cache = cache_over(Arc::new(MemoryLedger::default()));
        assert!(cache.get(1).is_none());
    }

    #[tokio::test]
    async fn refresh_populates_all_requested_slots() {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.templates.lock().insert(1, open_template(1));
        ledger.templates.lock().insert(2, open_template(2));
        let cache = cache_over(ledger);

        let results = cache.refresh(&[1, 2, 3]).await;
        assert_eq!(results.len(), 3);
        assert!(results[&1].as_ref().unwrap().eligible);
        assert!(results[&2].as_ref().unwrap().eligible);
        // Template 3 does not exist: ineligible, not an error slot.
        let missing = results[&3].as_ref().unwrap();
        assert_eq!(missing.reason, Some(IneligibleReason::TemplateNotFound));

        assert_eq!(cache.get(1), Some(results[&1].clone()));
        assert_eq!(cache.get(3), Some(results[&3].clone()));
    }

    #[tokio::test]
    async fn one_failing_slot_leaves_the_others_ok() {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.templates.lock().insert(1, open_template(1));
        ledger.failing.lock().insert(2);
        let cache = cache_over(ledger);

        let results = cache.refresh(&[1, 2]).await;
        assert!(results[&1].is_ok());
        assert!(matches!(results[&2], Err(OracleError::Unavailable(_))));
        assert!(matches!(cache.get(2), Some(Err(_))));
        assert!(matches!(cache.get(1), Some(Ok(_))));
    }

    #[tokio::test]
    async fn refresh_replaces_entries_wholesale() {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.templates.lock().insert(1, open_template(1));
        let cache = cache_over(Arc::clone(&ledger));

        cache.refresh(&[1]).await;
        assert!(cache.get(1).unwrap().unwrap().eligible);

        // The wallet claims; the ledger moves; the cache stays stale until
        // the caller refreshes.
        ledger.claimed.lock().insert((wallet(), 1));
        assert!(cache.get(1).unwrap().unwrap().eligible);

        cache.refresh(&[1]).await;
        let status = cache.get(1).unwrap().unwrap();
        assert!(!status.eligible);
        assert_eq!(status.reason, Some(IneligibleReason::AlreadyClaimed));
    }

    #[tokio::test]
    async fn abandoned_refresh_writes_nothing() {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.templates.lock().insert(1, open_template(1));
        let cache = Arc::new(cache_over(ledger));

        let fut = {
            let cache = Arc::clone(&cache);
            async move {
                cache.refresh(&[1]).await;
            }
        };
        // Dropped before first poll: the refresh never ran, nothing landed.
        drop(fut);
        assert!(cache.get(1).is_none());
    }

    #[tokio::test]
    async fn concurrent_reads_see_complete_entries() {
        let ledger = Arc::new(MemoryLedger::default());
        for id in 0..16 {
            ledger.templates.lock().insert(id, open_template(id));
        }
        let cache = Arc::new(cache_over(ledger));
        let ids: Vec<u64> = (0..16).collect();

        let refresher = {
            let cache = Arc::clone(&cache);
            let ids = ids.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    cache.refresh(&ids).await;
                }
            })
        };
        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for _ in 0..2_000 {
                    for id in 0..16u64 {
                        if let Some(slot) = cache.get(id) {
                            // Every visible entry is a complete result.
                            assert!(slot.unwrap().eligible);
                        }
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        refresher.await.unwrap();
        reader.await.unwrap();
    }
}
