use super::*;
use crate::test_utils::arb_messy_string;
use proptest::prelude::*;

/// Generates an arbitrary Config
fn arb_config() -> impl Strategy<Value = Config> {
    (
        arb_messy_string(),
        arb_messy_string(),
        any::<u16>(),
        any::<i64>(),
        any::<u64>(),
        any::<bool>(),
    )
        .prop_map(
            |(database_url, host, port, session_ttl_hours, session_purge_interval_minutes, seed_sample_data)| Config {
                database_url,
                host,
                port,
                session_ttl_hours,
                session_purge_interval_minutes,
                seed_sample_data,
            },
        )
}

/// Generates an arbitrary ConfigUpdate
fn arb_config_update() -> impl Strategy<Value = ConfigUpdate> {
    (
        prop::option::of(arb_messy_string()),
        prop::option::of(arb_messy_string()),
        prop::option::of(any::<u16>()),
        prop::option::of(any::<i64>()),
        prop::option::of(any::<u64>()),
        prop::option::of(any::<bool>()),
        prop::option::of(arb_messy_string()),
    )
        .prop_map(
            |(database_url, host, port, session_ttl_hours, session_purge_interval_minutes, seed_sample_data, server_url)| {
                ConfigUpdate {
                    database_url,
                    host,
                    port,
                    session_ttl_hours,
                    session_purge_interval_minutes,
                    seed_sample_data,
                    server_url,
                }
            },
        )
}

// ============================================================================
// C1: apply_update Algebraic Properties
// ============================================================================

proptest! {
    /// C1.1: Identity: apply_update(default) == original config
    #[test]
    fn prop_c1_1_identity(config in arb_config()) {
        let updated = config.clone().apply_update(ConfigUpdate::default());
        prop_assert_eq!(updated, config);
    }

    /// C1.2: Last-write-wins: b's Some fields override a's
    #[test]
    fn prop_c1_2_last_write_wins(
        config in arb_config(),
        a in arb_config_update(),
        b in arb_config_update(),
    ) {
        let after_ab = config.clone().apply_update(a.clone()).apply_update(b.clone());

        let expected = Config {
            database_url: b.database_url.or(a.database_url).unwrap_or(config.database_url),
            host: b.host.or(a.host).unwrap_or(config.host),
            port: b.port.or(a.port).unwrap_or(config.port),
            session_ttl_hours: b.session_ttl_hours.or(a.session_ttl_hours).unwrap_or(config.session_ttl_hours),
            session_purge_interval_minutes: b
                .session_purge_interval_minutes
                .or(a.session_purge_interval_minutes)
                .unwrap_or(config.session_purge_interval_minutes),
            seed_sample_data: b.seed_sample_data.or(a.seed_sample_data).unwrap_or(config.seed_sample_data),
        };

        prop_assert_eq!(after_ab, expected);
    }
}

// ============================================================================
// C2: Duration Conversions
// ============================================================================

proptest! {
    /// C2.1: The session lifetime is always between one hour and the maximum
    #[test]
    fn prop_c2_1_session_ttl_clamped(config in arb_config()) {
        let ttl = config.session_ttl();
        prop_assert!(ttl >= chrono::Duration::hours(1));
        prop_assert!(ttl <= chrono::Duration::hours(MAX_SESSION_TTL_HOURS));
    }

    /// C2.2: The purge interval is whole minutes and never zero
    #[test]
    fn prop_c2_2_purge_interval(config in arb_config()) {
        let interval = config.session_purge_interval();
        prop_assert!(interval >= Duration::from_secs(60));
        prop_assert_eq!(interval.as_secs() % 60, 0);
    }
}

// ============================================================================
// C3: config_from_args Mapping
// ============================================================================

proptest! {
    /// C3.1: config_from_args preserves all fields from CliArgs
    #[test]
    fn prop_c3_1_args_mapping(
        database_url in prop::option::of(arb_messy_string()),
        port in prop::option::of(any::<u16>()),
        session_ttl_hours in prop::option::of(any::<i64>()),
        seed_sample_data in any::<bool>(),
        debug in any::<bool>(),
    ) {
        let args = CliArgs {
            database_url: database_url.clone(),
            host: None,
            port,
            session_ttl_hours,
            session_purge_interval_minutes: None,
            seed_sample_data,
            debug,
        };

        let update = config_from_args(args);

        prop_assert_eq!(update.database_url, database_url);
        prop_assert_eq!(update.port, port);
        prop_assert_eq!(update.session_ttl_hours, session_ttl_hours);
        prop_assert_eq!(update.seed_sample_data, if seed_sample_data { Some(true) } else { None });
        // server_url is always None from args
        prop_assert_eq!(update.server_url, None);
    }
}
