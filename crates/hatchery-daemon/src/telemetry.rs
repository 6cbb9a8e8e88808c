use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct TelemetryState {
    metadata_requests_total: HashMap<String, u64>,
    authorize_requests_total: HashMap<String, u64>,
    oracle_failures_total: u64,
    cache_refreshes_total: u64,
}

/// In-process counters. Cheap to clone and share; readings are for logs and
/// tests, not an external metrics surface.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    state: Arc<Mutex<TelemetryState>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_metadata_request(&self, outcome: &str) {
        let mut guard = self.state.lock();
        let entry = guard
            .metadata_requests_total
            .entry(outcome.to_string())
            .or_insert(0);
        *entry = entry.saturating_add(1);
    }

    pub fn record_authorize_request(&self, outcome: &str) {
        let mut guard = self.state.lock();
        let entry = guard
            .authorize_requests_total
            .entry(outcome.to_string())
            .or_insert(0);
        *entry = entry.saturating_add(1);
    }

    pub fn record_oracle_failure(&self) {
        let mut guard = self.state.lock();
        guard.oracle_failures_total = guard.oracle_failures_total.saturating_add(1);
    }

    pub fn record_cache_refresh(&self) {
        let mut guard = self.state.lock();
        guard.cache_refreshes_total = guard.cache_refreshes_total.saturating_add(1);
    }

    pub fn metadata_requests(&self, outcome: &str) -> u64 {
        self.state
            .lock()
            .metadata_requests_total
            .get(outcome)
            .copied()
            .unwrap_or(0)
    }

    pub fn authorize_requests(&self, outcome: &str) -> u64 {
        self.state
            .lock()
            .authorize_requests_total
            .get(outcome)
            .copied()
            .unwrap_or(0)
    }

    pub fn oracle_failures(&self) -> u64 {
        self.state.lock().oracle_failures_total
    }
}
