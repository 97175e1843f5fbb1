#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use odata_payload::ODataVersion;
use odata_payload_fixtures::{FixtureError, FixtureSettings};
use tempfile::tempdir;

const VARS: [&str; 3] = [
    "ODATA_FIXTURES_MAX_COMBINATIONS",
    "ODATA_FIXTURES_MAX_VERSION",
    "ODATA_FIXTURES_INCLUDE_REQUESTS",
];

#[test]
fn load_without_sources_gives_defaults() {
    temp_env::with_vars_unset(VARS, || {
        let settings = FixtureSettings::load(None).unwrap();
        assert_eq!(settings, FixtureSettings::default());
    });
}

#[test]
fn yaml_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtures.yaml");
    fs::write(
        &path,
        "max_combinations: 10\nservice_document_sizes: [2, 5]\nmax_version: V2\n",
    )
    .unwrap();

    temp_env::with_vars_unset(VARS, || {
        let settings = FixtureSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.max_combinations, 10);
        assert_eq!(settings.service_document_sizes, vec![2, 5]);
        assert_eq!(settings.max_version, ODataVersion::V2);
        assert_eq!(settings.max_inner_error_depth, 3);
    });
}

#[test]
fn environment_overrides_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtures.yaml");
    fs::write(&path, "max_combinations: 10\ninclude_requests: true\n").unwrap();

    temp_env::with_vars(
        [
            ("ODATA_FIXTURES_MAX_COMBINATIONS", Some("3")),
            ("ODATA_FIXTURES_INCLUDE_REQUESTS", Some("false")),
            ("ODATA_FIXTURES_MAX_VERSION", None),
        ],
        || {
            let settings = FixtureSettings::load(Some(&path)).unwrap();
            assert_eq!(settings.max_combinations, 3);
            assert!(!settings.include_requests);
        },
    );
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtures.yaml");
    fs::write(&path, "max_combinations: [not, a, number]\n").unwrap();

    temp_env::with_vars_unset(VARS, || {
        let err = FixtureSettings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
    });
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtures.yaml");
    fs::write(&path, "max_combination: 3\n").unwrap();

    temp_env::with_vars_unset(VARS, || {
        assert!(FixtureSettings::load(Some(&path)).is_err());
    });
}
