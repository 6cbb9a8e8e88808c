//! Authorization signer.
//!
//! Issues single-use claim authorizations: an EIP-712 signature over
//! `{user, profileOwner, templateId, nonce}` bound to the protocol domain.
//! The signer does not re-check eligibility (the verifying contract does at
//! submission time) and keeps no record of issued nonces; the contract's
//! nonce-consumption state is the sole replay barrier. The private key stays
//! inside this module once constructed.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use hatchery_core::typed_data::{keccak256, ClaimMessage, Eip712Domain};

/// Low 80 bits of the nonce are fresh OS randomness; the high 48 bits are
/// unix-epoch milliseconds. A collision needs the same millisecond plus an
/// 80-bit random collision.
const NONCE_RANDOM_BITS: u32 = 80;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A signed, nonce-bound permission for one wallet to claim one template
/// once. Opaque to the issuer after handout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAuthorization {
    pub user: Address,
    pub profile_owner: Address,
    pub template_id: u64,
    pub nonce: u128,
    /// 65 bytes: `r ‖ s ‖ v`, `v ∈ {27, 28}`.
    pub signature: Vec<u8>,
    pub signer: Address,
}

pub struct AuthorizationSigner {
    key: SigningKey,
    address: Address,
    domain: Eip712Domain,
}

impl AuthorizationSigner {
    pub fn new(key: SigningKey, domain: Eip712Domain) -> Self {
        let address = address_of(&key);
        Self {
            key,
            address,
            domain,
        }
    }

    /// The signer's public address, recoverable from every issued signature.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Preconditions: the caller already confirmed eligibility. Signing is a
    /// pure computation over the key, so concurrent calls need no lock; the
    /// nonce likewise avoids any shared counter.
    pub fn issue(
        &self,
        user: Address,
        profile_owner: Address,
        template_id: u64,
    ) -> Result<ClaimAuthorization, SignerError> {
        let nonce = next_nonce();
        let message = ClaimMessage {
            user,
            profile_owner,
            template_id,
            nonce,
        };
        let digest = message.signing_digest(&self.domain);

        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(27 + recovery_id.to_byte());

        Ok(ClaimAuthorization {
            user,
            profile_owner,
            template_id,
            nonce,
            signature: bytes,
            signer: self.address,
        })
    }
}

/// Timestamp-prefixed random nonce. Unpredictable, non-repeating for the
/// key's lifetime, and lock-free: no shared mutable counter to race on.
fn next_nonce() -> u128 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0) as u128;
    let mut buf = [0u8; 16];
    OsRng.fill_bytes(&mut buf[6..]);
    let random = u128::from_be_bytes(buf) & ((1u128 << NONCE_RANDOM_BITS) - 1);
    (millis << NONCE_RANDOM_BITS) | random
}

/// Ethereum address of the key: last 20 bytes of the Keccak-256 of the
/// uncompressed public point (tag byte stripped).
pub fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
