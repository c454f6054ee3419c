//! Property-based tests for request signing.

use activator_inventory::{CanonicalSigner, UpdateProductKeyRequest};
use activator_types::KeyStatus;
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = KeyStatus> {
    prop::sample::select(KeyStatus::ALL.to_vec())
}

fn request_strategy() -> impl Strategy<Value = UpdateProductKeyRequest> {
    (
        "[A-Za-z]{1,10}",
        prop::option::of("[A-Za-z0-9 ]{1,20}"),
        "[A-Z0-9]{5}-[A-Z0-9]{5}",
        prop::option::of("[a-z0-9]{1,12}"),
        status_strategy(),
    )
        .prop_map(|(store, product, key, owner, status)| UpdateProductKeyRequest {
            store,
            product,
            key,
            owner,
            status,
        })
}

proptest! {
    #[test]
    fn signing_is_deterministic(request in request_strategy(), secret in "[ -~]{1,40}") {
        let signer = CanonicalSigner::new(&secret);
        prop_assert_eq!(signer.sign(&request), signer.sign(&request.clone()));
    }

    #[test]
    fn own_tokens_verify(request in request_strategy(), secret in "[ -~]{1,40}") {
        let signer = CanonicalSigner::new(&secret);
        let token = signer.sign(&request);
        prop_assert!(signer.verify(&request, &token));
    }

    #[test]
    fn changing_the_key_changes_the_token(request in request_strategy(), other in "[A-Z0-9]{5}-[A-Z0-9]{5}") {
        prop_assume!(other != request.key);
        let signer = CanonicalSigner::new("secret");
        let mut changed = request.clone();
        changed.key = other;
        prop_assert_ne!(signer.sign(&request), signer.sign(&changed));
    }
}
