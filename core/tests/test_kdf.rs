#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use cryptool_core::constants::PBKDF2_ITERATIONS;
    use cryptool_core::crypto::{derive_key, Algorithm, CryptoError, KeyDeriver, Pbkdf2Sha3};

    fn fast() -> Pbkdf2Sha3 {
        Pbkdf2Sha3::with_iterations(8)
    }

    #[test]
    fn default_uses_documented_round_count() {
        assert_eq!(Pbkdf2Sha3::default().iterations, PBKDF2_ITERATIONS);
        assert_eq!(PBKDF2_ITERATIONS, 100_000);
    }

    #[test]
    fn key_length_follows_algorithm() {
        for alg in Algorithm::ALL {
            let key = fast().derive(b"pw", &[1; 16], alg.key_len()).unwrap();
            assert_eq!(key.len(), alg.key_len(), "{alg}");
        }
    }

    #[test]
    fn full_round_count_is_deterministic() {
        let k1 = derive_key(b"correct horse", &[3; 16], 32).unwrap();
        let k2 = derive_key(b"correct horse", &[3; 16], 32).unwrap();
        assert_eq!(*k1, *k2);
    }

    // PBKDF2-HMAC-SHA3-256, 100 000 rounds, cross-checked with hashlib.pbkdf2_hmac('sha3_256', ...).
    #[test]
    fn known_answer_vector() {
        let key = derive_key(b"password", b"saltsaltsaltsalt", 32).unwrap();
        assert_eq!(
            hex::encode(&*key),
            "eab0fe6d0275b24fa60b44161a59cf5de6d8cc80d88a8f407973ce68c39b019d"
        );

        let short = derive_key(b"password", b"saltsaltsaltsalt", 16).unwrap();
        assert_eq!(hex::encode(&*short), "eab0fe6d0275b24fa60b44161a59cf5d");
    }

    #[test]
    fn round_count_changes_key() {
        let a = Pbkdf2Sha3::with_iterations(8).derive(b"pw", &[1; 16], 32).unwrap();
        let b = Pbkdf2Sha3::with_iterations(9).derive(b"pw", &[1; 16], 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn degenerate_inputs_rejected() {
        assert!(matches!(fast().derive(b"pw", &[1; 16], 0), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(fast().derive(b"pw", &[], 32), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(
            Pbkdf2Sha3::with_iterations(0).derive(b"pw", &[1; 16], 32),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn empty_password_still_derives() {
        let key = fast().derive(b"", &[1; 16], 32).unwrap();
        assert_eq!(key.len(), 32);
    }

    proptest! {
        #[test]
        fn prop_deterministic(pw in proptest::collection::vec(any::<u8>(), 0..64), salt in any::<[u8; 16]>()) {
            let k1 = fast().derive(&pw, &salt, 32).unwrap();
            let k2 = fast().derive(&pw, &salt, 32).unwrap();
            prop_assert_eq!(&*k1, &*k2);
        }

        #[test]
        fn prop_salt_changes_key(salt1 in any::<[u8; 16]>(), salt2 in any::<[u8; 16]>()) {
            let k1 = fast().derive(b"pw", &salt1, 32).unwrap();
            let k2 = fast().derive(b"pw", &salt2, 32).unwrap();
            if salt1 != salt2 {
                prop_assert_ne!(&*k1, &*k2);
            }
        }

        // PBKDF2 output blocks are independent of the requested length.
        #[test]
        fn prop_shorter_key_is_prefix(salt in any::<[u8; 16]>()) {
            let long = fast().derive(b"pw", &salt, 32).unwrap();
            let short = fast().derive(b"pw", &salt, 16).unwrap();
            prop_assert_eq!(&long[..16], &short[..]);
        }
    }
}
