use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use odata_payload::ODataVersion;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix of environment variables that override fixture settings.
pub const ENV_PREFIX: &str = "ODATA_FIXTURES_";

/// Knobs controlling how many fixtures the generators produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureSettings {
    /// Upper bound on results from any combination expansion
    pub max_combinations: usize,
    /// Deepest inner error chain generated for error payloads
    pub max_inner_error_depth: usize,
    /// Number of entity-set entries in each generated service document
    pub service_document_sizes: Vec<usize>,
    /// Highest protocol version a test configuration is produced for
    pub max_version: ODataVersion,
    /// Whether request-side configurations are produced in addition to responses
    pub include_requests: bool,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            max_combinations: 64,
            max_inner_error_depth: 3,
            service_document_sizes: vec![0, 1, 3],
            max_version: ODataVersion::V3,
            include_requests: true,
        }
    }
}

impl FixtureSettings {
    /// Defaults, then `path` if given, then `ODATA_FIXTURES_*` variables.
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    /// Returns [`crate::FixtureError::Config`] when a source cannot be parsed
    /// or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(&figment)
    }

    /// Extract settings from an already composed figment.
    ///
    /// # Errors
    /// Returns [`crate::FixtureError::Config`] when extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let settings: Self = figment.extract()?;
        tracing::debug!(?settings, "fixture settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::FixtureError;

    #[test]
    fn test_defaults() {
        let settings = FixtureSettings::default();
        assert_eq!(settings.max_combinations, 64);
        assert_eq!(settings.max_inner_error_depth, 3);
        assert_eq!(settings.service_document_sizes, vec![0, 1, 3]);
        assert_eq!(settings.max_version, ODataVersion::V3);
        assert!(settings.include_requests);
    }

    #[test]
    fn test_from_figment_partial_override() {
        let figment = Figment::new()
            .merge(Serialized::defaults(FixtureSettings::default()))
            .merge(Serialized::defaults(serde_json::json!({
                "max_combinations": 8,
                "max_version": "V2",
            })));
        let settings = FixtureSettings::from_figment(&figment).unwrap();
        assert_eq!(settings.max_combinations, 8);
        assert_eq!(settings.max_version, ODataVersion::V2);
        assert_eq!(settings.max_inner_error_depth, 3);
    }

    #[test]
    fn test_wrong_shape_is_config_error() {
        let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
            "max_combinations": "many",
        })));
        let err = FixtureSettings::from_figment(&figment).unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
    }
}
