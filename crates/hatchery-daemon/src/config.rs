use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use thiserror::Error;

pub const SIGNER_KEY_ENV: &str = "HATCHERY_SIGNER_KEY";
pub const RPC_URL_ENV: &str = "HATCHERY_RPC_URL";
pub const VERIFYING_CONTRACT_ENV: &str = "HATCHERY_VERIFYING_CONTRACT";
pub const CHAIN_ID_ENV: &str = "HATCHERY_CHAIN_ID";
pub const LEDGER_TIMEOUT_MS_ENV: &str = "HATCHERY_LEDGER_TIMEOUT_MS";

const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Everything the engine needs, resolved once at startup. Components receive
/// this (or pieces of it) by construction; nothing reads ambient globals
/// after boot, so tests can assemble alternates freely.
#[derive(Clone)]
pub struct EngineConfig {
    pub signer_key: SigningKey,
    pub rpc_url: String,
    pub verifying_contract: Address,
    pub chain_id: u64,
    pub ledger_timeout: Duration,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("signer_key", &"<redacted>")
            .field("rpc_url", &self.rpc_url)
            .field("verifying_contract", &self.verifying_contract)
            .field("chain_id", &self.chain_id)
            .field("ledger_timeout", &self.ledger_timeout)
            .finish()
    }
}

impl EngineConfig {
    /// Absence of any required variable is startup-fatal, never per-request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Env-shaped constructor over an arbitrary lookup, so tests never
    /// mutate process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key_hex = lookup(SIGNER_KEY_ENV).ok_or(ConfigError::Missing(SIGNER_KEY_ENV))?;
        let key_bytes =
            hex::decode(key_hex.trim_start_matches("0x")).map_err(|e| ConfigError::Invalid {
                var: SIGNER_KEY_ENV,
                reason: e.to_string(),
            })?;
        let signer_key =
            SigningKey::from_slice(&key_bytes).map_err(|e| ConfigError::Invalid {
                var: SIGNER_KEY_ENV,
                reason: e.to_string(),
            })?;

        let rpc_url = lookup(RPC_URL_ENV).ok_or(ConfigError::Missing(RPC_URL_ENV))?;

        let contract_raw = lookup(VERIFYING_CONTRACT_ENV)
            .ok_or(ConfigError::Missing(VERIFYING_CONTRACT_ENV))?;
        let verifying_contract =
            Address::from_str(&contract_raw).map_err(|e| ConfigError::Invalid {
                var: VERIFYING_CONTRACT_ENV,
                reason: e.to_string(),
            })?;

        let chain_raw = lookup(CHAIN_ID_ENV).ok_or(ConfigError::Missing(CHAIN_ID_ENV))?;
        let chain_id = chain_raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
            var: CHAIN_ID_ENV,
            reason: e.to_string(),
        })?;

        let timeout_ms = match lookup(LEDGER_TIMEOUT_MS_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: LEDGER_TIMEOUT_MS_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_LEDGER_TIMEOUT_MS,
        };

        Ok(Self {
            signer_key,
            rpc_url,
            verifying_contract,
            chain_id,
            ledger_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (SIGNER_KEY_ENV, "11".repeat(32)),
            (RPC_URL_ENV, "http://127.0.0.1:8545".to_string()),
            (
                VERIFYING_CONTRACT_ENV,
                format!("0x{}", "c0".repeat(20)),
            ),
            (CHAIN_ID_ENV, "8453".to_string()),
        ])
    }

    fn lookup_in<'a>(env: &'a HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| env.get(key).cloned()
    }

    #[test]
    fn complete_environment_loads() {
        let env = full_env();
        let cfg = EngineConfig::from_lookup(lookup_in(&env)).unwrap();
        assert_eq!(cfg.chain_id, 8453);
        assert_eq!(cfg.ledger_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn each_missing_variable_is_named() {
        for var in [
            SIGNER_KEY_ENV,
            RPC_URL_ENV,
            VERIFYING_CONTRACT_ENV,
            CHAIN_ID_ENV,
        ] {
            let mut env = full_env();
            env.remove(var);
            match EngineConfig::from_lookup(lookup_in(&env)) {
                Err(ConfigError::Missing(named)) => assert_eq!(named, var),
                other => panic!("expected Missing({var}), got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_values_are_invalid_not_missing() {
        let mut env = full_env();
        env.insert(SIGNER_KEY_ENV, "zz".to_string());
        assert!(matches!(
            EngineConfig::from_lookup(lookup_in(&env)),
            Err(ConfigError::Invalid {
                var: SIGNER_KEY_ENV,
                ..
            })
        ));

        let mut env = full_env();
        env.insert(CHAIN_ID_ENV, "base".to_string());
        assert!(matches!(
            EngineConfig::from_lookup(lookup_in(&env)),
            Err(ConfigError::Invalid { var: CHAIN_ID_ENV, .. })
        ));
    }

    #[test]
    fn key_accepts_0x_prefix_and_timeout_overrides() {
        let mut env = full_env();
        env.insert(SIGNER_KEY_ENV, format!("0x{}", "22".repeat(32)));
        env.insert(LEDGER_TIMEOUT_MS_ENV, "250".to_string());
        let cfg = EngineConfig::from_lookup(lookup_in(&env)).unwrap();
        assert_eq!(cfg.ledger_timeout, Duration::from_millis(250));
    }

    #[test]
    fn debug_redacts_the_key() {
        let env = full_env();
        let cfg = EngineConfig::from_lookup(lookup_in(&env)).unwrap();
        assert!(format!("{cfg:?}").contains("<redacted>"));
    }
}
