//! EIP-712 typed-data hashing for claim authorizations.
//!
//! The signed message binds `{user, profileOwner, templateId, nonce}` to the
//! protocol domain (name, version, chain id, verifying contract) so a
//! signature can never be replayed against a different deployment. Hashing
//! lives here so the daemon's signer and any verifier agree on the exact
//! digest; the private key itself never enters this crate.

use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

pub const DOMAIN_NAME: &str = "HatcheryClaims";
pub const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
const CLAIM_TYPE: &str =
    "ClaimAuthorization(address user,address profileOwner,uint256 templateId,uint128 nonce)";

pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    B256::from_slice(&hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> B256 {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
        encoded.extend_from_slice(keccak256(DOMAIN_NAME.as_bytes()).as_slice());
        encoded.extend_from_slice(keccak256(DOMAIN_VERSION.as_bytes()).as_slice());
        encoded.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        encoded.extend_from_slice(self.verifying_contract.into_word().as_slice());
        keccak256(&encoded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimMessage {
    pub user: Address,
    pub profile_owner: Address,
    pub template_id: u64,
    pub nonce: u128,
}

impl ClaimMessage {
    pub fn struct_hash(&self) -> B256 {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(keccak256(CLAIM_TYPE.as_bytes()).as_slice());
        encoded.extend_from_slice(self.user.into_word().as_slice());
        encoded.extend_from_slice(self.profile_owner.into_word().as_slice());
        encoded.extend_from_slice(&U256::from(self.template_id).to_be_bytes::<32>());
        encoded.extend_from_slice(&U256::from(self.nonce).to_be_bytes::<32>());
        keccak256(&encoded)
    }

    /// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ structHash)`.
    pub fn signing_digest(&self, domain: &Eip712Domain) -> B256 {
        let mut preimage = Vec::with_capacity(2 + 64);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(domain.separator().as_slice());
        preimage.extend_from_slice(self.struct_hash().as_slice());
        keccak256(&preimage)
    }
}
