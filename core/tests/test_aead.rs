#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cryptool_core::constants::{algorithm_ids, algorithm_names, DEFAULT_ALGORITHM, TAG_LEN};
    use cryptool_core::crypto::{Algorithm, CipherAlgorithm, CryptoError};

    fn cipher(alg: Algorithm) -> CipherAlgorithm {
        CipherAlgorithm::new(alg, &vec![0x42; alg.key_len()]).unwrap()
    }

// ## 1️⃣ Registry

    #[test]
    fn registry_ids_and_names_are_stable() {
        assert_eq!(Algorithm::Aes128Gcm.id(), algorithm_ids::AES128_GCM);
        assert_eq!(Algorithm::Aes192Gcm.id(), algorithm_ids::AES192_GCM);
        assert_eq!(Algorithm::Aes256Gcm.id(), algorithm_ids::AES256_GCM);
        assert_eq!(Algorithm::XChaCha20Poly1305.id(), algorithm_ids::XCHACHA20_POLY1305);

        for alg in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(alg.id()), Some(alg));
            assert_eq!(Algorithm::from_name(alg.name()), Some(alg));
            assert_eq!(alg.name().parse::<Algorithm>().unwrap(), alg);
        }
        assert_eq!(Algorithm::from_name(algorithm_names::XCHACHA20_POLY1305), Some(Algorithm::XChaCha20Poly1305));
        assert_eq!(DEFAULT_ALGORITHM.parse::<Algorithm>().unwrap(), Algorithm::Aes256Gcm);
    }

    #[test]
    fn unknown_ids_and_names_rejected() {
        assert_eq!(Algorithm::from_id(0), None);
        assert_eq!(Algorithm::from_id(5), None);
        let err = "aes512-gcm".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedAlgorithmName { ref name } if name == "aes512-gcm"));
        assert!(err.to_string().contains("aes256-gcm"));
    }

    #[test]
    fn sizes_per_algorithm() {
        let expect = [
            (Algorithm::Aes128Gcm, 16, 12),
            (Algorithm::Aes192Gcm, 24, 12),
            (Algorithm::Aes256Gcm, 32, 12),
            (Algorithm::XChaCha20Poly1305, 32, 24),
        ];
        for (alg, key, nonce) in expect {
            assert_eq!(alg.key_len(), key);
            assert_eq!(alg.nonce_size(), nonce);
            assert_eq!(alg.tag_size(), TAG_LEN);
            let c = cipher(alg);
            assert_eq!(c.algorithm(), alg);
            assert_eq!(c.nonce_size(), nonce);
            assert_eq!(c.tag_size(), TAG_LEN);
        }
    }

    #[test]
    fn wrong_key_length_rejected() {
        let err = CipherAlgorithm::new(Algorithm::Aes192Gcm, &[0u8; 32]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLen { expected: 24, actual: 32 }));
    }

// ## 2️⃣ Block round-trip

    #[test]
    fn roundtrip_all_algorithms() {
        let msg = b"attack at dawn, bring snacks";
        for alg in Algorithm::ALL {
            let c = cipher(alg);
            let wire = c.encrypt_block(msg).unwrap();
            assert_eq!(wire.len(), c.nonce_size() + msg.len() + TAG_LEN);

            let (nonce, sealed) = wire.split_at(c.nonce_size());
            assert_ne!(&sealed[..msg.len()], &msg[..], "{alg}: ciphertext equals plaintext");
            assert_eq!(c.decrypt_block(nonce, sealed).unwrap(), msg);
        }
    }

    #[test]
    fn other_key_fails_authentication() {
        for alg in Algorithm::ALL {
            let wire = cipher(alg).encrypt_block(b"secret").unwrap();
            let other = CipherAlgorithm::new(alg, &vec![0x43; alg.key_len()]).unwrap();
            let (nonce, sealed) = wire.split_at(alg.nonce_size());
            assert!(matches!(other.decrypt_block(nonce, sealed), Err(CryptoError::AuthenticationFailure)));
        }
    }

// ## 3️⃣ Tamper detection

    #[test]
    fn every_single_bit_flip_is_detected() {
        for alg in Algorithm::ALL {
            let c = cipher(alg);
            let wire = c.encrypt_block(b"0123456789").unwrap();
            for byte in 0..wire.len() {
                for bit in 0..8 {
                    let mut bad = wire.clone();
                    bad[byte] ^= 1 << bit;
                    let (nonce, sealed) = bad.split_at(c.nonce_size());
                    assert!(
                        matches!(c.decrypt_block(nonce, sealed), Err(CryptoError::AuthenticationFailure)),
                        "{alg}: flip at byte {byte} bit {bit} not detected"
                    );
                }
            }
        }
    }

    #[test]
    fn short_inputs_fail_closed() {
        let c = cipher(Algorithm::Aes256Gcm);
        assert!(matches!(c.decrypt_block(&[0; 12], &[0; 15]), Err(CryptoError::AuthenticationFailure)));
        assert!(matches!(
            c.decrypt_block(&[0; 11], &[0; 32]),
            Err(CryptoError::InvalidNonceLen { expected: 12, actual: 11 })
        ));
    }

// ## 4️⃣ Nonces

    #[test]
    fn nonces_unique_over_ten_thousand_blocks() {
        for alg in [Algorithm::Aes256Gcm, Algorithm::XChaCha20Poly1305] {
            let c = cipher(alg);
            let mut seen = HashSet::new();
            for _ in 0..10_000 {
                let wire = c.encrypt_block(b"x").unwrap();
                assert!(seen.insert(wire[..c.nonce_size()].to_vec()), "{alg}: nonce repeated");
            }
        }
    }

    #[test]
    fn debug_does_not_leak_key() {
        let s = format!("{:?}", cipher(Algorithm::Aes128Gcm));
        assert_eq!(s, "CipherAlgorithm(Aes128Gcm)");
    }
}
