#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use webpush_core::ece::{encrypt, ContentEncoding};
    use webpush_core::subscription::SubscriptionKeys;
    use webpush_core::telemetry::{BuildCounters, BuildSnapshot, BuildTimer, Stage, StageTimes};

    const P256DH: &str = "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";

    fn counters_for(encoding: ContentEncoding, payload: &[u8], pad_len: usize) -> BuildCounters {
        let keys = SubscriptionKeys::from_base64url(P256DH, AUTH).unwrap();
        let content = encrypt(encoding, &keys, payload, pad_len, &mut StdRng::seed_from_u64(3)).unwrap();
        let mut counters = BuildCounters::default();
        counters.add_content(&content);
        counters
    }

    // # ✅ 1. Counters

    #[test]
    fn test_counters_split_body() {
        let c = counters_for(ContentEncoding::Aes128Gcm, b"0123456789", 5);
        assert_eq!(c.messages, 1);
        assert_eq!(c.bytes_plaintext, 10);
        assert_eq!(c.bytes_padding, 6);
        assert_eq!(c.bytes_framing, 86);
        assert_eq!(c.bytes_tag, 16);
        assert_eq!(c.bytes_body, 10 + 6 + 86 + 16);
        assert_eq!(c.overhead_bytes(), 6 + 86 + 16);

        let legacy = counters_for(ContentEncoding::AesGcm, b"0123456789", 5);
        assert_eq!(legacy.bytes_framing, 0);
        assert_eq!(legacy.bytes_padding, 7);
        assert_eq!(legacy.bytes_body, 10 + 7 + 16);
    }

    #[test]
    fn test_counters_merge() {
        let mut total = counters_for(ContentEncoding::Aes128Gcm, b"a", 0);
        total += counters_for(ContentEncoding::AesGcm, b"bb", 0);
        total.add_empty();
        assert_eq!(total.messages, 3);
        assert_eq!(total.bytes_plaintext, 3);
        assert_eq!(total.bytes_tag, 32);
    }

    // # ✅ 2. Stage times

    #[test]
    fn test_stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Encrypt, Duration::from_micros(300));
        times.add(Stage::Encrypt, Duration::from_micros(200));
        times.add(Stage::Sign, Duration::from_micros(100));

        assert_eq!(times.get(Stage::Encrypt), Duration::from_micros(500));
        assert_eq!(times.get(Stage::Assemble), Duration::ZERO);
        assert_eq!(times.total(), Duration::from_micros(600));
        assert!(times.has_all(&[Stage::Encrypt, Stage::Sign]));
        assert!(!times.has_all(&Stage::ALL));
        assert_eq!(Stage::Randomize.to_string(), "randomize");
    }

    #[test]
    fn test_timer_charges_stage() {
        let mut timer = BuildTimer::new();
        let out = timer.time(Stage::Validate, || 41 + 1);
        timer.finish();
        assert_eq!(out, 42);
        assert!(timer.stage_times.has_all(&[Stage::Validate]));
        assert!(timer.stage_times.total() <= timer.elapsed());
    }

    // # ✅ 3. Snapshot

    #[test]
    fn test_snapshot_sanity() {
        let counters = counters_for(ContentEncoding::Aes128Gcm, b"hello", 0);
        let mut timer = BuildTimer::new();
        timer.finish();

        let mut snap = BuildSnapshot::from(&counters, &timer);
        assert!(snap.sanity_check());
        assert!((snap.expansion_ratio - (108.0 / 5.0)).abs() < 1e-9);

        snap.bytes_body += 1;
        assert!(!snap.sanity_check());
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let counters = counters_for(ContentEncoding::AesGcm, b"ping", 3);
        let mut timer = BuildTimer::new();
        timer.stage_times.add(Stage::Encrypt, Duration::from_nanos(1));
        timer.finish();

        let snap = BuildSnapshot::from(&counters, &timer);
        let json = serde_json::to_string(&snap).unwrap();
        let back: BuildSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
