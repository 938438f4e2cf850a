#[cfg(test)]
mod tests {
    use std::time::Duration;

    use p256::SecretKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use webpush_core::prelude::*;
    use webpush_core::telemetry::Stage;
    use webpush_core::utils::b64url_decode;
    use webpush_core::vapid::verify_token;

    const ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send/dXQ4:APA91b";
    const P256DH: &str = "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const UA_PRIVATE: &str = "q1dXpw3UpT5VOmu_cf_v6ih07Aems3njxI-JWgLcM94";
    const AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";
    const VAPID_PRIVATE: &str = "yfWPiYE-n46HLnH0KqZOF1fJJU3MYrct3AELtAQ-oRw";

    fn subscription() -> SubscriptionInfo {
        SubscriptionInfo::new(ENDPOINT, P256DH, AUTH).unwrap()
    }

    fn vapid_key() -> VapidKey {
        VapidKey::from_base64url(VAPID_PRIVATE).unwrap()
    }

    fn ua_secret() -> SecretKey {
        SecretKey::from_slice(&b64url_decode(UA_PRIVATE).unwrap()).unwrap()
    }

    fn auth() -> Vec<u8> {
        b64url_decode(AUTH).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn header<'a>(headers: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        headers.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    // # ✅ 1. Modern coding

    #[test]
    fn test_aes128gcm_message_headers_and_body() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key)
            .payload(b"hello")
            .ttl(3600)
            .urgency(Urgency::High)
            .topic("news-1")
            .vapid_subject("mailto:ops@example.com")
            .build_with_rng(&mut rng())
            .unwrap();

        let headers = msg.headers();
        let names: Vec<&str> = headers.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["TTL", "Urgency", "Topic", "Authorization", "Content-Encoding", "Content-Type"]
        );
        assert_eq!(header(&headers, "TTL"), Some("3600"));
        assert_eq!(header(&headers, "Urgency"), Some("high"));
        assert_eq!(header(&headers, "Topic"), Some("news-1"));
        assert_eq!(header(&headers, "Content-Encoding"), Some("aes128gcm"));
        assert_eq!(header(&headers, "Content-Type"), Some("application/octet-stream"));

        let authorization = header(&headers, "Authorization").unwrap();
        assert!(authorization.starts_with("vapid t="));
        assert!(authorization.ends_with(&format!(", k={}", key.public_key_base64url())));

        let payload = msg.payload.as_ref().unwrap();
        assert_eq!(payload.decrypt(&ua_secret(), &auth()).unwrap(), b"hello");
        assert_eq!(msg.body().len(), 86 + 5 + 1 + 16);
    }

    #[test]
    fn test_token_is_scoped_to_endpoint_origin() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key).payload(b"x").build().unwrap();
        let claims = verify_token(&msg.vapid.auth_t, key.public_key()).unwrap();
        assert_eq!(claims.aud, "https://fcm.googleapis.com");
        assert_eq!(claims.exp, msg.vapid.expires_at);
    }

    // # ✅ 2. Legacy coding

    #[test]
    fn test_aesgcm_message_headers() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key)
            .payload(b"legacy")
            .content_encoding(ContentEncoding::AesGcm)
            .pad_len(10)
            .build_with_rng(&mut rng())
            .unwrap();

        let headers = msg.headers();
        assert_eq!(header(&headers, "Content-Encoding"), Some("aesgcm"));
        assert!(header(&headers, "Encryption").unwrap().starts_with("salt="));
        assert!(header(&headers, "Authorization").unwrap().starts_with("WebPush "));

        let crypto_key = header(&headers, "Crypto-Key").unwrap();
        assert!(crypto_key.starts_with("dh="));
        assert!(crypto_key.ends_with(&format!(";p256ecdsa={}", key.public_key_base64url())));

        assert_eq!(msg.body().len(), 2 + 10 + 6 + 16);
        let payload = msg.payload.as_ref().unwrap();
        assert_eq!(payload.decrypt(&ua_secret(), &auth()).unwrap(), b"legacy");
    }

    // # ✅ 3. No payload

    #[test]
    fn test_message_without_payload() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key).build_with_rng(&mut rng()).unwrap();

        assert!(msg.payload.is_none());
        assert!(msg.body().is_empty());
        let names: Vec<&str> = msg.headers().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["TTL", "Urgency", "Authorization"]);
        assert_eq!(msg.snapshot.bytes_body, 0);
        assert!(msg.snapshot.sanity_check());
        // nothing to encrypt, so no ephemeral key or salt is drawn
        assert!(!msg.snapshot.has_all_stages(&[Stage::Randomize]));
        assert!(!msg.snapshot.has_all_stages(&[Stage::Encrypt]));
        assert!(msg.snapshot.has_all_stages(&[Stage::Validate, Stage::Sign, Stage::Assemble]));
    }

    #[test]
    fn test_defaults() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key).payload(b"x").build().unwrap();
        assert_eq!(msg.ttl, 86_400);
        assert_eq!(msg.urgency, Urgency::Normal);
        assert_eq!(msg.content_encoding, ContentEncoding::Aes128Gcm);
        assert!(msg.topic.is_none());
    }

    // # ✅ 4. Validation

    #[test]
    fn test_ttl_ceiling() {
        let sub = subscription();
        let key = vapid_key();
        let max = 28 * 24 * 3600;
        assert!(WebPushMessageBuilder::new(&sub, &key).ttl(max).build().is_ok());
        assert!(WebPushMessageBuilder::new(&sub, &key).ttl(0).build().is_ok());
        assert!(matches!(
            WebPushMessageBuilder::new(&sub, &key).ttl(max + 1).build(),
            Err(WebPushError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_topic_rules() {
        let sub = subscription();
        let key = vapid_key();
        let build = |topic: &str| WebPushMessageBuilder::new(&sub, &key).topic(topic).build();

        assert!(build(&"a".repeat(32)).is_ok());
        assert!(build("Ab0-_z").is_ok());
        for bad in ["", "has space", "slash/", "plus+", "é"] {
            assert!(matches!(build(bad), Err(WebPushError::InvalidTopic(_))), "{:?}", bad);
        }
        assert!(matches!(build(&"a".repeat(33)), Err(WebPushError::InvalidTopic(_))));
    }

    #[test]
    fn test_oversized_payload() {
        let sub = subscription();
        let key = vapid_key();
        let payload = vec![0u8; 3994];
        let err = WebPushMessageBuilder::new(&sub, &key).payload(&payload).build().unwrap_err();
        assert_eq!(err, WebPushError::PayloadTooLarge { have: 3994, max: 3993 });

        let fits = vec![0u8; 3993];
        assert!(WebPushMessageBuilder::new(&sub, &key).payload(&fits).build().is_ok());
    }

    #[test]
    fn test_vapid_expiry_and_subject_checked() {
        let sub = subscription();
        let key = vapid_key();
        assert!(matches!(
            WebPushMessageBuilder::new(&sub, &key).vapid_expiry(Duration::from_secs(25 * 3600)).build(),
            Err(WebPushError::InvalidTtl(_))
        ));
        assert!(WebPushMessageBuilder::new(&sub, &key)
            .vapid_expiry(Duration::from_secs(23 * 3600))
            .build()
            .is_ok());
        assert!(matches!(
            WebPushMessageBuilder::new(&sub, &key).vapid_subject("ops@example.com").build(),
            Err(WebPushError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_first_failure_wins() {
        let sub = subscription();
        let key = vapid_key();
        let err = WebPushMessageBuilder::new(&sub, &key)
            .ttl(u32::MAX)
            .topic("bad topic")
            .build()
            .unwrap_err();
        assert!(matches!(err, WebPushError::InvalidTtl(_)));
    }

    // # ✅ 5. Options

    #[test]
    fn test_options_from_json() {
        let opts = MessageOptions::from_json(
            r#"{"ttl": 60, "urgency": "very-low", "content_encoding": "aesgcm", "pad_len": 4}"#,
        )
        .unwrap();
        assert_eq!(opts.ttl, 60);
        assert_eq!(opts.urgency, Urgency::VeryLow);
        assert_eq!(opts.content_encoding, ContentEncoding::AesGcm);
        assert_eq!(opts.pad_len, 4);
        assert_eq!(opts.vapid_expiry_secs, 12 * 3600);

        assert!(MessageOptions::from_json(r#"{"tll": 60}"#).is_err());

        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key).payload(b"x").options(opts).build().unwrap();
        assert_eq!(msg.ttl, 60);
        assert_eq!(msg.content_encoding, ContentEncoding::AesGcm);
    }

    // # ✅ 6. HTTP request

    #[test]
    fn test_into_request() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key)
            .payload(b"request body")
            .ttl(120)
            .build_with_rng(&mut rng())
            .unwrap();
        let body_len = msg.body().len();

        let req = msg.into_request().unwrap();
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.uri().to_string(), ENDPOINT);
        assert_eq!(req.headers()["ttl"], "120");
        assert_eq!(req.headers()["content-encoding"], "aes128gcm");
        assert!(req.headers()["authorization"].to_str().unwrap().starts_with("vapid t="));
        assert_eq!(req.body().len(), body_len);
    }

    // # ✅ 7. Telemetry and concurrency

    #[test]
    fn test_snapshot_is_consistent() {
        let sub = subscription();
        let key = vapid_key();
        let msg = WebPushMessageBuilder::new(&sub, &key)
            .payload(b"metrics")
            .pad_len(9)
            .build_with_rng(&mut rng())
            .unwrap();

        let snap = &msg.snapshot;
        assert_eq!(snap.bytes_plaintext, 7);
        assert_eq!(snap.bytes_padding, 10);
        assert_eq!(snap.bytes_framing, 86);
        assert_eq!(snap.bytes_tag, 16);
        assert_eq!(snap.bytes_body, msg.body().len() as u64);
        assert!(snap.has_all_stages(&Stage::ALL));
        assert!(snap.sanity_check());
    }

    #[test]
    fn test_shared_key_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VapidKey>();
        assert_send_sync::<SubscriptionInfo>();
        assert_send_sync::<WebPushMessage>();

        let sub = subscription();
        let key = vapid_key();
        let bodies: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4u8)
                .map(|i| {
                    let (sub, key) = (&sub, &key);
                    s.spawn(move || {
                        let payload = [i; 8];
                        let msg = WebPushMessageBuilder::new(sub, key).payload(&payload).build().unwrap();
                        assert_eq!(msg.payload.as_ref().unwrap().decrypt(&ua_secret(), &auth()).unwrap(), payload);
                        msg.body().to_vec()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
