use super::*;

const SAMPLE: &str = r#"
username = "liuzh"

[entimap]
style = "upper_underscore"

[entimap.statement_cache]
initial_capacity = 64
use_once = true

[entimap.key_generator]
concurrency = 3
"#;

#[test]
fn toml_tables_flatten_into_dotted_keys() {
    let source: TomlSource = SAMPLE.parse().expect("sample TOML should parse");

    assert_eq!(source.get_string("username").as_deref(), Some("liuzh"));
    assert_eq!(
        source.get_string(keys::STYLE).as_deref(),
        Some("upper_underscore")
    );
    assert_eq!(source.get_int(keys::STATEMENT_CACHE_INITIAL_CAPACITY, 1024), 64);
    assert!(source.get_bool(keys::STATEMENT_CACHE_USE_ONCE, false));
    assert_eq!(source.get_int(keys::KEY_GENERATOR_CONCURRENCY, 1000), 3);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = "[entimap\nstyle =".parse::<TomlSource>().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_file_reports_path() {
    let err = TomlSource::from_path("/definitely/not/here/entimap.toml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => {
            assert!(path.ends_with("entimap.toml"), "io error should keep the path");
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn typed_accessors_fall_back_on_missing_or_malformed() {
    let source = MapSource::new()
        .with("count", "not-a-number")
        .with("flag", "maybe")
        .with("yes_flag", "Yes");

    assert_eq!(source.get_int("count", 7), 7);
    assert_eq!(source.get_int("absent", 9), 9);
    assert!(!source.get_bool("flag", false));
    assert!(source.get_bool("yes_flag", false));
    assert!(matches!(
        source.try_int("count"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(source.try_int("absent").expect("absent is not an error"), None);
}

#[test]
fn layered_source_prefers_earlier_layers() {
    let user = MapSource::new().with(keys::STYLE, "normal");
    let defaults = MapSource::new()
        .with(keys::STYLE, "lower_underscore")
        .with("email", "abel533@gmail.com");

    let layered = LayeredSource::new().layer(user).layer(defaults);

    assert_eq!(layered.len(), 2);
    assert_eq!(layered.get_string(keys::STYLE).as_deref(), Some("normal"));
    assert_eq!(
        layered.get_string("email").as_deref(),
        Some("abel533@gmail.com")
    );
    assert_eq!(layered.get_string("missing"), None);
}

#[test]
fn env_source_derives_variable_names() {
    assert_eq!(EnvSource::new().var_name("entimap.style"), "ENTIMAP_STYLE");
    assert_eq!(
        EnvSource::with_prefix("app").var_name("entimap.key_generator.concurrency"),
        "APP_ENTIMAP_KEY_GENERATOR_CONCURRENCY"
    );
}
