use std::time::Duration;

use rolegate_core::config::{ConfigError, ConfigValue, RolegateConfig};
use serial_test::serial;

#[test]
fn empty_config_has_no_keys() {
    let config = RolegateConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn set_and_get() {
    let mut config = RolegateConfig::empty();
    config.set("auth.provider.domain", ConfigValue::String("some.eu".into()));
    assert_eq!(config.get::<String>("auth.provider.domain").unwrap(), "some.eu");
}

#[test]
fn get_or_falls_back_only_when_missing() {
    let mut config = RolegateConfig::empty();
    assert_eq!(config.get_or("missing", 42i64).unwrap(), 42);

    config.set("wrong", ConfigValue::String("not a number".into()));
    assert!(matches!(
        config.get_or("wrong", 1i64),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn get_opt_distinguishes_missing_from_present() {
    let mut config = RolegateConfig::empty();
    assert_eq!(config.get_opt::<String>("k").unwrap(), None);
    config.set("k", ConfigValue::String("v".into()));
    assert_eq!(config.get_opt::<String>("k").unwrap(), Some("v".to_string()));
}

#[test]
fn type_conversions() {
    let mut config = RolegateConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(1.5));
    config.set("bool_val", ConfigValue::String("yes".into()));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<u64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 1.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
}

#[test]
fn durations_are_seconds() {
    let mut config = RolegateConfig::empty();
    config.set("ttl", ConfigValue::Integer(300));
    config.set("half", ConfigValue::String("0.5".into()));
    config.set("negative", ConfigValue::Integer(-1));

    assert_eq!(config.get::<Duration>("ttl").unwrap(), Duration::from_secs(300));
    assert_eq!(config.get::<Duration>("half").unwrap(), Duration::from_millis(500));
    assert!(matches!(
        config.get::<Duration>("negative"),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn out_of_range_durations_are_invalid() {
    let config =
        RolegateConfig::from_yaml_str("auth:\n  cache:\n    ttl: 1e30\n    cleanup: -5\n", "test")
            .unwrap();

    assert!(matches!(
        config.get::<Duration>("auth.cache.ttl"),
        Err(ConfigError::Invalid { ref key, .. }) if key == "auth.cache.ttl"
    ));
    assert!(matches!(
        config.get::<Duration>("auth.cache.cleanup"),
        Err(ConfigError::Invalid { ref key, .. }) if key == "auth.cache.cleanup"
    ));
}

#[test]
fn yaml_is_flattened() {
    let yaml = r#"
auth:
  provider:
    domain: "some.eu"
  cache:
    ttl: 300
  roles:
    - staff
    - manager
"#;
    let config = RolegateConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(config.get::<String>("auth.provider.domain").unwrap(), "some.eu");
    assert_eq!(config.get::<i64>("auth.cache.ttl").unwrap(), 300);
    let roles: Vec<String> = config.get("auth.roles").unwrap();
    assert_eq!(roles, vec!["staff", "manager"]);
    assert_eq!(config.get::<String>("auth.roles.1").unwrap(), "manager");
}

#[test]
fn invalid_yaml_is_a_load_error() {
    let result = RolegateConfig::from_yaml_str("auth: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial]
fn profile_file_overrides_base_and_env_overrides_both() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "auth:\n  cache:\n    ttl: 10\n    cleanup: 20\n  provider:\n    domain: base\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("application-prod.yaml"),
        "auth:\n  cache:\n    ttl: 60\n",
    )
    .unwrap();

    std::env::remove_var("ROLEGATE_PROFILE");
    std::env::set_var("AUTH_PROVIDER_DOMAIN", "from-env");

    let config = RolegateConfig::load_from_dir(dir.path(), "prod").unwrap();

    std::env::remove_var("AUTH_PROVIDER_DOMAIN");

    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<i64>("auth.cache.ttl").unwrap(), 60);
    assert_eq!(config.get::<i64>("auth.cache.cleanup").unwrap(), 20);
    assert_eq!(config.get::<String>("auth.provider.domain").unwrap(), "from-env");
}

#[test]
#[serial]
fn profile_env_var_wins_over_argument() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application-staging.yaml"), "auth:\n  roles: ops\n").unwrap();

    std::env::set_var("ROLEGATE_PROFILE", "staging");
    let config = RolegateConfig::load_from_dir(dir.path(), "dev").unwrap();
    std::env::remove_var("ROLEGATE_PROFILE");

    assert_eq!(config.profile(), "staging");
    assert_eq!(config.get::<String>("auth.roles").unwrap(), "ops");
}
