use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_cover_cache_and_retry() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.cache.redis_url.is_none());
    assert_eq!(settings.cache.timeout, Duration::from_secs(2));
    assert_eq!(settings.cache.pool_size.get(), 8);
    assert_eq!(settings.cache.content_ttl, Duration::from_secs(300));
    assert_eq!(settings.retry.max_attempts, 4);
    assert_eq!(settings.retry.base_delay, Duration::from_secs(1));
    assert!(settings.database.url.is_none());
}

#[test]
fn blank_redis_url_means_local_only() {
    let mut raw = RawSettings::default();
    raw.cache.redis_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.cache.redis_url.is_none());
}

#[test]
fn redis_url_requires_redis_scheme() {
    let mut raw = RawSettings::default();
    raw.cache.redis_url = Some("http://cache:6379".to_string());

    let err = Settings::from_raw(raw).expect_err("scheme rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.redis_url",
            ..
        }
    ));
}

#[test]
fn zero_retry_attempts_rejected() {
    let mut raw = RawSettings::default();
    raw.retry.max_attempts = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero attempts rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "retry.max_attempts",
            ..
        }
    ));
}

#[test]
fn shared_listener_address_rejected() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(3001);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cache_overrides_apply() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cache_redis_url: Some("redis://127.0.0.1:6379".to_string()),
        cache_ttl_seconds: Some(60),
        retry_base_delay_ms: Some(250),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.cache.redis_url.as_deref(),
        Some("redis://127.0.0.1:6379")
    );
    assert_eq!(settings.cache.content_ttl, Duration::from_secs(60));
    assert_eq!(settings.retry.base_delay, Duration::from_millis(250));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["quire"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from(["quire", "migrate", "--database-url", "postgres://example"]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "quire",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--cache-redis-url",
        "redis://cache:6379",
        "--retry-max-attempts",
        "6",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.cache_redis_url.as_deref(),
                Some("redis://cache:6379")
            );
            assert_eq!(serve.overrides.retry_max_attempts, Some(6));
        }
        _ => panic!("wrong command parsed"),
    }
}
