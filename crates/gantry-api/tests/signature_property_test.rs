//! Property-based tests for request signature verification.

use gantry_api::crypto::{compute_signature, verify_signature};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A freshly computed signature always verifies against the same inputs.
    #[test]
    fn computed_signature_verifies(
        secret in "[a-zA-Z0-9]{8,64}",
        timestamp in "[0-9]{1,10}",
        body in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let signature = compute_signature(&secret, &timestamp, &body).unwrap();
        prop_assert!(verify_signature(&secret, &timestamp, &body, &signature));
    }

    /// Flipping any single body byte invalidates the signature.
    #[test]
    fn mutated_body_never_verifies(
        (body, index) in proptest::collection::vec(any::<u8>(), 1..512)
            .prop_flat_map(|body| {
                let len = body.len();
                (Just(body), 0..len)
            }),
    ) {
        let signature = compute_signature("test-signing-secret", "1531420618", &body).unwrap();

        let mut mutated = body.clone();
        mutated[index] ^= 0x01;

        prop_assert!(!verify_signature("test-signing-secret", "1531420618", &mutated, &signature));
    }

    /// A signature computed for one timestamp never verifies for another.
    #[test]
    fn shifted_timestamp_never_verifies(
        timestamp in 0u32..u32::MAX,
        offset in 1u32..1000,
        body in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let original = timestamp.to_string();
        let shifted = timestamp.wrapping_add(offset).to_string();
        prop_assume!(original != shifted);

        let signature = compute_signature("test-signing-secret", &original, &body).unwrap();
        prop_assert!(!verify_signature("test-signing-secret", &shifted, &body, &signature));
    }

    /// Truncating the provided signature always fails, for any cut point.
    #[test]
    fn truncated_signature_never_verifies(
        body in proptest::collection::vec(any::<u8>(), 0..256),
        cut in 0usize..66,
    ) {
        let signature = compute_signature("test-signing-secret", "1531420618", &body).unwrap();
        prop_assume!(cut < signature.len());

        let truncated = &signature[..cut];
        prop_assert!(!verify_signature("test-signing-secret", "1531420618", &body, truncated));
    }
}
