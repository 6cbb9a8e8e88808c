#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use hatchery_core::typed_data::{ClaimMessage, Eip712Domain};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok((user, owner, template_id, nonce, chain_id, contract)) =
        <([u8; 20], [u8; 20], u64, u128, u64, [u8; 20])>::arbitrary(&mut u)
    else {
        return;
    };

    let domain = Eip712Domain::new(chain_id, contract.into());
    let message = ClaimMessage {
        user: user.into(),
        profile_owner: owner.into(),
        template_id,
        nonce,
    };

    let digest = message.signing_digest(&domain);
    assert_eq!(digest, message.signing_digest(&domain));

    // Flipping the nonce must move the digest.
    let mut other = message;
    other.nonce = nonce.wrapping_add(1);
    assert_ne!(digest, other.signing_digest(&domain));
});
