use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Reputation-value bucket a template belongs to. Each tier maps to a fixed
/// point value credited on claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl TemplateTier {
    pub fn from_u8(raw: u8) -> CoreResult<Self> {
        match raw {
            0 => Ok(Self::Bronze),
            1 => Ok(Self::Silver),
            2 => Ok(Self::Gold),
            3 => Ok(Self::Diamond),
            other => Err(CoreError::InvalidArgument(format!(
                "unknown template tier {other}"
            ))),
        }
    }

    pub const fn points(self) -> u64 {
        match self {
            Self::Bronze => 10,
            Self::Silver => 25,
            Self::Gold => 50,
            Self::Diamond => 100,
        }
    }
}

/// Issuer-defined collectible class. Immutable once created; only
/// `current_supply` moves, and only through successful on-chain claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: u64,
    pub issuer: Address,
    /// 0 means unlimited.
    pub max_supply: u64,
    pub current_supply: u64,
    pub tier: TemplateTier,
    /// Unix seconds; 0 disables the bound.
    pub start_time: u64,
    /// Unix seconds; 0 disables the bound.
    pub end_time: u64,
    pub paused: bool,
}

impl Template {
    /// Remaining supply, `None` when the template is uncapped.
    pub fn supply_remaining(&self) -> Option<u64> {
        if self.max_supply == 0 {
            None
        } else {
            Some(self.max_supply.saturating_sub(self.current_supply))
        }
    }

    pub fn supply_exhausted(&self) -> bool {
        self.max_supply != 0 && self.current_supply >= self.max_supply
    }

    pub fn within_window(&self, now_unix: u64) -> bool {
        if self.start_time != 0 && now_unix < self.start_time {
            return false;
        }
        if self.end_time != 0 && now_unix > self.end_time {
            return false;
        }
        true
    }
}

/// The single reason reported when a claim is disqualified. When several
/// conditions hold at once the oracle reports the first in declaration
/// order, so callers and tests see one stable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibleReason {
    #[serde(rename = "template not found")]
    TemplateNotFound,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "outside claim window")]
    OutsideWindow,
    #[serde(rename = "supply exhausted")]
    SupplyExhausted,
    #[serde(rename = "already claimed")]
    AlreadyClaimed,
}

impl IneligibleReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TemplateNotFound => "template not found",
            Self::Paused => "paused",
            Self::OutsideWindow => "outside claim window",
            Self::SupplyExhausted => "supply exhausted",
            Self::AlreadyClaimed => "already claimed",
        }
    }
}

/// Transient per-(wallet, template) eligibility snapshot. The ledger stays
/// authoritative; this value is recomputed on every refresh and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStatus {
    pub eligible: bool,
    pub reason: Option<IneligibleReason>,
    pub already_claimed: bool,
    /// `None` when the template supply is unlimited.
    pub supply_remaining: Option<u64>,
}

impl ClaimStatus {
    pub fn eligible(already_claimed: bool, supply_remaining: Option<u64>) -> Self {
        Self {
            eligible: true,
            reason: None,
            already_claimed,
            supply_remaining,
        }
    }

    pub fn ineligible(
        reason: IneligibleReason,
        already_claimed: bool,
        supply_remaining: Option<u64>,
    ) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            already_claimed,
            supply_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(max_supply: u64, current_supply: u64) -> Template {
        Template {
            template_id: 7,
            issuer: Address::repeat_byte(0x11),
            max_supply,
            current_supply,
            tier: TemplateTier::Gold,
            start_time: 0,
            end_time: 0,
            paused: false,
        }
    }

    #[test]
    fn unlimited_supply_never_exhausts() {
        let t = template(0, 1_000_000);
        assert_eq!(t.supply_remaining(), None);
        assert!(!t.supply_exhausted());
    }

    #[test]
    fn capped_supply_counts_down() {
        let t = template(10, 7);
        assert_eq!(t.supply_remaining(), Some(3));
        assert!(!t.supply_exhausted());
        assert!(template(10, 10).supply_exhausted());
    }

    #[test]
    fn window_sentinels_disable_bounds() {
        let mut t = template(0, 0);
        assert!(t.within_window(1));
        t.start_time = 100;
        assert!(!t.within_window(99));
        assert!(t.within_window(100));
        t.end_time = 200;
        assert!(t.within_window(200));
        assert!(!t.within_window(201));
    }

    #[test]
    fn tier_round_trip_and_points() {
        assert_eq!(TemplateTier::from_u8(3).unwrap(), TemplateTier::Diamond);
        assert_eq!(TemplateTier::Diamond.points(), 100);
        assert!(TemplateTier::from_u8(9).is_err());
    }

    #[test]
    fn reason_serializes_as_human_string() {
        let status = ClaimStatus::ineligible(IneligibleReason::Paused, false, Some(4));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["reason"], "paused");
        assert_eq!(json["eligible"], false);
    }
}
