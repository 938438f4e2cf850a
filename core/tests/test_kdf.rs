#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use webpush_core::crypto::{
        agree, derive_content_keys, parse_public_key, validate_auth_secret, CryptoError,
        EphemeralKeyPair, KeySchedule, RecordCipher,
    };
    use webpush_core::ece::ContentEncoding;
    use webpush_core::utils::{b64url_decode, b64url_encode};

    // RFC 8291 Appendix A
    const AS_PRIVATE: &str = "yfWPiYE-n46HLnH0KqZOF1fJJU3MYrct3AELtAQ-oRw";
    const AS_PUBLIC: &str = "BP4z9KsN6nGRTbVYI_c7VJSPQTBtkgcy27mlmlMoZIIgDll6e3vCYLocInmYWAmS6TlzAC8wEqKK6PBru3jl7A8";
    const UA_PUBLIC: &str = "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const SALT: &str = "DGv6ra1nlYgDCS1FRnbzlw";
    const AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";

    fn decode<const N: usize>(s: &str) -> [u8; N] {
        b64url_decode(s).unwrap().try_into().unwrap()
    }

    struct Vector {
        sender: EphemeralKeyPair,
        ua_public: [u8; 65],
        ecdh: Vec<u8>,
        auth: Vec<u8>,
        salt: [u8; 16],
    }

    fn rfc_vector() -> Vector {
        let sender = EphemeralKeyPair::from_secret_bytes(&b64url_decode(AS_PRIVATE).unwrap()).unwrap();
        let ua_public: [u8; 65] = decode(UA_PUBLIC);
        let peer = parse_public_key(&ua_public).unwrap();
        let ecdh = agree(sender.secret(), &peer).raw_secret_bytes().to_vec();
        Vector { sender, ua_public, ecdh, auth: b64url_decode(AUTH).unwrap(), salt: decode(SALT) }
    }

    fn derive(encoding: ContentEncoding, v: &Vector, salt: &[u8; 16]) -> webpush_core::crypto::ContentKeys {
        let schedule = KeySchedule {
            ecdh_secret: &v.ecdh,
            auth_secret: &v.auth,
            ua_public: &v.ua_public,
            as_public: v.sender.public_bytes(),
            salt,
        };
        derive_content_keys(encoding, &schedule).unwrap()
    }

    // # ✅ 1. Known-answer values

    #[test]
    fn test_sender_public_key_matches_vector() {
        let v = rfc_vector();
        assert_eq!(b64url_encode(v.sender.public_bytes()), AS_PUBLIC);
    }

    #[test]
    fn test_ecdh_secret_matches_vector() {
        let v = rfc_vector();
        assert_eq!(b64url_encode(&v.ecdh), "kyrL1jIIOHEzg3sM2ZWRHDRB62YACZhhSlknJ672kSs");
    }

    #[test]
    fn test_aes128gcm_cek_and_nonce_match_vector() {
        let v = rfc_vector();
        let keys = derive(ContentEncoding::Aes128Gcm, &v, &v.salt);
        assert_eq!(b64url_encode(keys.cek), "oIhVW04MRdy2XN9CiKLxTg");
        assert_eq!(b64url_encode(keys.nonce), "4h_95klXJ5E_qnoN");
    }

    #[test]
    fn test_aesgcm_cek_and_nonce_known_answer() {
        let v = rfc_vector();
        let keys = derive(ContentEncoding::AesGcm, &v, &v.salt);
        assert_eq!(b64url_encode(keys.cek), "7rkwhO2bYeeWJTMpfNkMtQ");
        assert_eq!(b64url_encode(keys.nonce), "p8UeiVG6ERGF9g4z");
    }

    #[test]
    fn test_codings_derive_different_keys() {
        let v = rfc_vector();
        let modern = derive(ContentEncoding::Aes128Gcm, &v, &v.salt);
        let legacy = derive(ContentEncoding::AesGcm, &v, &v.salt);
        assert_ne!(modern, legacy);
    }

    // # ✅ 2. Auth secret bounds

    #[test]
    fn test_auth_secret_bounds() {
        assert!(matches!(validate_auth_secret(&[]), Err(CryptoError::InvalidAuthSecret { len: 0 })));
        assert!(validate_auth_secret(&[1u8; 15]).is_err());
        assert!(validate_auth_secret(&[1u8; 16]).is_ok());
        assert!(validate_auth_secret(&[1u8; 64]).is_ok());
        assert!(validate_auth_secret(&[1u8; 65]).is_err());
    }

    #[test]
    fn test_derivation_rejects_short_auth() {
        let v = rfc_vector();
        let schedule = KeySchedule {
            ecdh_secret: &v.ecdh,
            auth_secret: &v.auth[..8],
            ua_public: &v.ua_public,
            as_public: v.sender.public_bytes(),
            salt: &v.salt,
        };
        assert!(matches!(
            derive_content_keys(ContentEncoding::Aes128Gcm, &schedule),
            Err(CryptoError::InvalidAuthSecret { len: 8 })
        ));
    }

    // # ✅ 3. Public key parsing

    #[test]
    fn test_parse_public_key_rejects_bad_input() {
        let good: [u8; 65] = decode(UA_PUBLIC);
        assert!(parse_public_key(&good).is_ok());
        assert!(matches!(parse_public_key(&good[..64]), Err(CryptoError::InvalidPublicKey(_))));

        let mut compressed_prefix = good;
        compressed_prefix[0] = 0x02;
        assert!(parse_public_key(&compressed_prefix).is_err());

        let mut off_curve = [0x01u8; 65];
        off_curve[0] = 0x04;
        assert!(parse_public_key(&off_curve).is_err());
    }

    // # ✅ 4. Record cipher

    #[test]
    fn test_record_cipher_rejects_tampering() {
        let v = rfc_vector();
        let keys = derive(ContentEncoding::Aes128Gcm, &v, &v.salt);
        let cipher = RecordCipher::new(&keys);

        let mut sealed = cipher.seal(b"hello\x02").unwrap();
        assert_eq!(sealed.len(), 6 + 16);
        assert_eq!(cipher.open(&sealed).unwrap(), b"hello\x02");

        sealed[0] ^= 0x01;
        assert!(matches!(cipher.open(&sealed), Err(CryptoError::TagMismatch)));
        assert!(matches!(cipher.open(&[0u8; 4]), Err(CryptoError::TagMismatch)));
    }

    // # ✅ 5. Properties

    proptest! {
        #[test]
        fn prop_derivation_deterministic(salt in any::<[u8; 16]>()) {
            let v = rfc_vector();
            let k1 = derive(ContentEncoding::Aes128Gcm, &v, &salt);
            let k2 = derive(ContentEncoding::Aes128Gcm, &v, &salt);
            prop_assert_eq!(k1, k2);
        }

        #[test]
        fn prop_salt_changes_keys(salt1 in any::<[u8; 16]>(), salt2 in any::<[u8; 16]>()) {
            prop_assume!(salt1 != salt2);
            let v = rfc_vector();
            for encoding in [ContentEncoding::Aes128Gcm, ContentEncoding::AesGcm] {
                let k1 = derive(encoding, &v, &salt1);
                let k2 = derive(encoding, &v, &salt2);
                prop_assert_ne!(k1, k2);
            }
        }
    }
}
