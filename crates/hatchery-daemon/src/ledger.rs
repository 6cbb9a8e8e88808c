//! Ledger read interface.
//!
//! The contract is a black box behind JSON-RPC `eth_call`; this module owns
//! the selector derivation, calldata encoding, and fixed-word decoding for
//! the three reads the engine consumes. Everything sits behind the
//! [`LedgerReader`] trait so the oracle and server are testable against an
//! in-memory ledger.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use hatchery_core::typed_data::keccak256;
use hatchery_core::{Template, TemplateTier};
use serde_json::{json, Value};
use thiserror::Error;

pub const GET_TEMPLATE_SIG: &str = "getTemplate(uint256)";
pub const HAS_CLAIMED_SIG: &str = "hasClaimed(address,uint256)";
pub const GET_SCORE_SIG: &str = "getScore(uint256)";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger transport failed: {0}")]
    Transport(String),

    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("ledger rpc error: {0}")]
    Rpc(String),

    #[error("ledger returned malformed data: {0}")]
    Decode(String),
}

#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// `None` when the template does not exist on-ledger (zero issuer word).
    async fn template(&self, template_id: u64) -> Result<Option<Template>, LedgerError>;

    async fn has_claimed(&self, wallet: Address, template_id: u64) -> Result<bool, LedgerError>;

    async fn score(&self, profile_id: u64) -> Result<u64, LedgerError>;
}

/// Production reader: EVM `eth_call` with a bounded per-request timeout.
pub struct JsonRpcLedger {
    client: reqwest::Client,
    rpc_url: String,
    contract: Address,
    timeout: Duration,
}

impl JsonRpcLedger {
    pub fn new(rpc_url: String, contract: Address, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url,
            contract,
            timeout,
        }
    }

    async fn eth_call(&self, calldata: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                {"to": format!("{:#x}", self.contract), "data": format!("0x{}", hex::encode(&calldata))},
                "latest"
            ],
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout(self.timeout)
                } else {
                    LedgerError::Transport(e.to_string())
                }
            })?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if let Some(err) = body.get("error") {
            return Err(LedgerError::Rpc(err.to_string()));
        }
        let result = body
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::Decode("missing result field".to_string()))?;
        hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| LedgerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LedgerReader for JsonRpcLedger {
    async fn template(&self, template_id: u64) -> Result<Option<Template>, LedgerError> {
        let mut calldata = selector(GET_TEMPLATE_SIG).to_vec();
        calldata.extend_from_slice(&U256::from(template_id).to_be_bytes::<32>());
        let words = Words::parse(self.eth_call(calldata).await?, 7)?;

        // Word layout: issuer, maxSupply, currentSupply, tier, startTime,
        // endTime, paused. A zero issuer is the contract's not-found marker.
        let issuer = words.address(0)?;
        if issuer == Address::ZERO {
            return Ok(None);
        }
        Ok(Some(Template {
            template_id,
            issuer,
            max_supply: words.u64(1)?,
            current_supply: words.u64(2)?,
            tier: u8::try_from(words.u64(3)?)
                .map_err(|_| LedgerError::Decode("tier word overflows u8".to_string()))
                .and_then(|raw| {
                    TemplateTier::from_u8(raw).map_err(|e| LedgerError::Decode(e.to_string()))
                })?,
            start_time: words.u64(4)?,
            end_time: words.u64(5)?,
            paused: words.u64(6)? != 0,
        }))
    }

    async fn has_claimed(&self, wallet: Address, template_id: u64) -> Result<bool, LedgerError> {
        let mut calldata = selector(HAS_CLAIMED_SIG).to_vec();
        calldata.extend_from_slice(wallet.into_word().as_slice());
        calldata.extend_from_slice(&U256::from(template_id).to_be_bytes::<32>());
        let words = Words::parse(self.eth_call(calldata).await?, 1)?;
        Ok(words.u64(0)? != 0)
    }

    async fn score(&self, profile_id: u64) -> Result<u64, LedgerError> {
        let mut calldata = selector(GET_SCORE_SIG).to_vec();
        calldata.extend_from_slice(&U256::from(profile_id).to_be_bytes::<32>());
        let words = Words::parse(self.eth_call(calldata).await?, 1)?;
        words.u64(0)
    }
}

/// First four bytes of the Keccak-256 of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Fixed 32-byte word view over ABI return data.
struct Words(Vec<u8>);

impl Words {
    fn parse(data: Vec<u8>, expected: usize) -> Result<Self, LedgerError> {
        if data.len() < expected * 32 {
            return Err(LedgerError::Decode(format!(
                "expected {} return words, got {} bytes",
                expected,
                data.len()
            )));
        }
        Ok(Self(data))
    }

    fn word(&self, index: usize) -> &[u8] {
        &self.0[index * 32..(index + 1) * 32]
    }

    fn u64(&self, index: usize) -> Result<u64, LedgerError> {
        let word = self.word(index);
        if word[..24].iter().any(|b| *b != 0) {
            return Err(LedgerError::Decode(format!(
                "word {index} overflows u64"
            )));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[24..]);
        Ok(u64::from_be_bytes(buf))
    }

    fn address(&self, index: usize) -> Result<Address, LedgerError> {
        let word = self.word(index);
        if word[..12].iter().any(|b| *b != 0) {
            return Err(LedgerError::Decode(format!(
                "word {index} is not a clean address"
            )));
        }
        Ok(Address::from_slice(&word[12..]))
    }
}
