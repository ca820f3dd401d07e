use clap::{CommandFactory, FromArgMatches, Parser};
use skillmacro::config::{Config, MacroSettings};
use skillmacro::error::MacroError;
use std::io::Write;

/// Minimal CLI wrapper so the flattened config can be parsed on its own.
#[derive(Parser, Debug)]
struct Harness {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (Config, clap::ArgMatches) {
    let argv = std::iter::once("harness").chain(args.iter().copied());
    let matches = Harness::command().get_matches_from(argv);
    let harness = Harness::from_arg_matches(&matches).unwrap();
    (harness.config, matches)
}

fn write_settings(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_clap_defaults_match_default_impl() {
    let (parsed, _) = parse(&[]);
    let from_clap = serde_json::to_value(&parsed).unwrap();
    let from_default = serde_json::to_value(Config::default()).unwrap();
    assert_eq!(from_clap, from_default);
}

#[test]
fn test_merge_only_overrides_typed_flags() {
    let file = write_settings(
        r#"{ "macro_settings": { "default_delay_ms": 200 }, "simulation": { "trials": 77 } }"#,
    );
    let mut config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.simulation.trials, 77);

    let (cli, matches) = parse(&["--trials", "5"]);
    config.merge_from_cli(&cli, &matches);

    assert_eq!(config.simulation.trials, 5);
    // Untyped flags keep the file value, not the clap default.
    assert_eq!(config.macro_settings.default_delay_ms, 200);
    assert_eq!(config.simulation.duration_ms, 60_000);
}

#[test]
fn test_sample_settings_file_loads() {
    let config = Config::load_from_file("data/settings.json").unwrap();
    assert_eq!(config.macro_settings.unit_time_ms, 50);
    assert_eq!(config.simulation.cache_capacity, 1024);
}

#[test]
fn test_invalid_bounds_are_rejected() {
    let file = write_settings(r#"{ "macro_settings": { "max_cooldown_reduction": 100 } }"#);
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, MacroError::Config(_)));

    let file = write_settings(r#"{ "macro_settings": { "default_delay_ms": 5000 } }"#);
    assert!(Config::load_from_file(file.path()).is_err());
}

#[test]
fn test_malformed_json_is_a_json_error() {
    let file = write_settings("{ not json");
    assert!(matches!(
        Config::load_from_file(file.path()),
        Err(MacroError::Json(_))
    ));
}

#[test]
fn test_delay_and_reduction_bounds() {
    let settings = MacroSettings::default();
    assert_eq!(settings.check_delay(50).unwrap(), 50);
    assert_eq!(settings.check_delay(1000).unwrap(), 1000);
    assert!(settings.check_delay(49).is_err());
    assert!(settings.check_delay(1001).is_err());
    assert!(settings.check_cooldown_reduction(51).is_err());
    assert_eq!(settings.clamp_delay(10), 50);
    assert_eq!(settings.clamp_cooldown_reduction(90), 50);
}
