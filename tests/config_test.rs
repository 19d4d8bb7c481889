use std::collections::HashMap;

use holiday_ngin::{
    animation::Arrangement,
    config::{RECORD_SECONDS_VAR, SEED_VAR, START_VAR, SceneConfig},
    record::RECORD_SECONDS,
};

fn config(vars: &[(&str, &str)]) -> SceneConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    SceneConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_without_variables() {
    let config = config(&[]);
    assert_eq!(config, SceneConfig::default());
    assert_eq!(config.start, Arrangement::Scattered);
    assert_eq!(config.layout.seed, None);
    assert_eq!(config.record.seconds, RECORD_SECONDS);
}

#[test]
fn variables_override_defaults() {
    let config = config(&[
        (SEED_VAR, "42"),
        (RECORD_SECONDS_VAR, "2.5"),
        (START_VAR, " Tree "),
    ]);
    assert_eq!(config.layout.seed, Some(42));
    assert_eq!(config.record.seconds, 2.5);
    assert_eq!(config.start, Arrangement::Tree);
}

#[test]
fn invalid_values_are_ignored() {
    let config = config(&[
        (SEED_VAR, "not a number"),
        (RECORD_SECONDS_VAR, "-3"),
        (START_VAR, "pyramid"),
    ]);
    assert_eq!(config, SceneConfig::default());
}

#[test]
fn arrangements_parse_from_names() {
    assert_eq!("tree".parse::<Arrangement>().ok(), Some(Arrangement::Tree));
    assert_eq!("SCATTER".parse::<Arrangement>().ok(), Some(Arrangement::Scattered));
    assert!("".parse::<Arrangement>().is_err());
}

#[test]
fn logger_installed_before_config_shows_its_warnings() {
    holiday_ngin::flow::init_logger();
    holiday_ngin::flow::init_logger();
    if std::env::var_os("RUST_LOG").is_none() {
        assert!(log::log_enabled!(target: "holiday_ngin::config", log::Level::Warn));
    }
    let config = config(&[(START_VAR, "pyramid")]);
    assert_eq!(config.start, Arrangement::Scattered);
}
