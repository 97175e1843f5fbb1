//! Test descriptors: a payload plus the conditions it is valid under.

use std::fmt;
use std::sync::Arc;

use odata_payload::{AnnotationTable, EdmModel, ODataVersion, PayloadElement, TypeAnnotator};

use crate::error::Result;
use crate::settings::FixtureSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
}

/// One message context a descriptor may be run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TestConfiguration {
    pub kind: MessageKind,
    pub version: ODataVersion,
}

impl TestConfiguration {
    #[must_use]
    pub fn new(kind: MessageKind, version: ODataVersion) -> Self {
        Self { kind, version }
    }

    /// Every configuration allowed by `settings`, responses first, then by version.
    #[must_use]
    pub fn all(settings: &FixtureSettings) -> Vec<Self> {
        let kinds: &[MessageKind] = if settings.include_requests {
            &[MessageKind::Response, MessageKind::Request]
        } else {
            &[MessageKind::Response]
        };
        kinds
            .iter()
            .flat_map(|&kind| {
                ODataVersion::ALL
                    .into_iter()
                    .filter(|&version| version <= settings.max_version)
                    .map(move |version| Self::new(kind, version))
            })
            .collect()
    }
}

pub type SkipPredicate = Arc<dyn Fn(&TestConfiguration) -> bool + Send + Sync>;

/// A payload with its model, skip rule and version floor.
///
/// Cloning shares the payload's node identities. Use
/// [`PayloadTestDescriptor::deep_copy`] for an independent payload.
#[derive(Clone)]
pub struct PayloadTestDescriptor {
    description: String,
    payload: PayloadElement,
    model: Option<Arc<EdmModel>>,
    skip: Option<SkipPredicate>,
    min_version: Option<ODataVersion>,
}

impl fmt::Debug for PayloadTestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadTestDescriptor")
            .field("description", &self.description)
            .field("payload", &self.payload.summary())
            .field("model", &self.model.as_ref().map(|m| m.namespace.as_str()))
            .field("skip", &self.skip.is_some())
            .field("min_version", &self.min_version)
            .finish()
    }
}

impl PayloadTestDescriptor {
    #[must_use]
    pub fn new(description: impl Into<String>, payload: impl Into<PayloadElement>) -> Self {
        Self {
            description: description.into(),
            payload: payload.into(),
            model: None,
            skip: None,
            min_version: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<EdmModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Skip every configuration for which `predicate` returns `true`.
    #[must_use]
    pub fn with_skip<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TestConfiguration) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(predicate));
        self
    }

    /// Restrict the descriptor to a single message kind.
    #[must_use]
    pub fn only(self, kind: MessageKind) -> Self {
        self.with_skip(move |config| config.kind != kind)
    }

    /// Version floor on top of the one computed from the payload.
    #[must_use]
    pub fn with_min_version(mut self, version: ODataVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn payload(&self) -> &PayloadElement {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut PayloadElement {
        &mut self.payload
    }

    #[must_use]
    pub fn model(&self) -> Option<&Arc<EdmModel>> {
        self.model.as_ref()
    }

    /// The higher of the explicit floor and the payload's computed minimum.
    ///
    /// # Errors
    /// Propagates errors from the version walk.
    pub fn min_version(&self) -> Result<ODataVersion> {
        let computed = self.payload.min_version()?;
        Ok(self.min_version.map_or(computed, |floor| floor.max(computed)))
    }

    /// # Errors
    /// Propagates errors from the version walk.
    pub fn applies_to(&self, config: TestConfiguration) -> Result<bool> {
        if config.version < self.min_version()? {
            return Ok(false);
        }
        Ok(!self.skip.as_ref().is_some_and(|skip| skip(&config)))
    }

    /// Configurations from `settings` this descriptor applies to.
    ///
    /// # Errors
    /// Propagates errors from the version walk.
    pub fn configurations(&self, settings: &FixtureSettings) -> Result<Vec<TestConfiguration>> {
        let mut applicable = Vec::new();
        for config in TestConfiguration::all(settings) {
            if self.applies_to(config)? {
                applicable.push(config);
            }
        }
        Ok(applicable)
    }

    /// Copy with a fresh payload. The model and skip predicate are shared.
    ///
    /// # Errors
    /// Propagates errors from the payload copy.
    pub fn deep_copy(&self) -> Result<Self> {
        Ok(Self {
            payload: self.payload.deep_copy()?,
            ..self.clone()
        })
    }

    /// Fill in payload type names from the model, returning how many went
    /// unresolved. Does nothing without a model.
    ///
    /// # Errors
    /// Propagates errors from the annotating walk.
    pub fn annotate_types(&mut self, table: &AnnotationTable) -> Result<usize> {
        let Some(model) = self.model.clone() else {
            return Ok(0);
        };
        Ok(TypeAnnotator::annotate(&model, table, &mut self.payload)?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use odata_payload::{
        EntityInstance, PrimitiveMultiValue, PrimitiveMultiValueProperty, PrimitiveProperty,
        PrimitiveValue, assert_payload_eq,
    };

    use super::*;

    fn entity_with_collection() -> EntityInstance {
        EntityInstance::new("TestModel.Customer").with_property(PrimitiveMultiValueProperty::new(
            "Tags",
            PrimitiveMultiValue::new("Edm.String").with_item(PrimitiveValue::new("a")),
        ))
    }

    #[test]
    fn test_all_configurations_respect_settings() {
        let settings = FixtureSettings::default();
        let all = TestConfiguration::all(&settings);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], TestConfiguration::new(MessageKind::Response, ODataVersion::V1));

        let responses_only = FixtureSettings {
            include_requests: false,
            max_version: ODataVersion::V2,
            ..FixtureSettings::default()
        };
        assert_eq!(TestConfiguration::all(&responses_only).len(), 2);
    }

    #[test]
    fn test_computed_version_gates_configurations() {
        let descriptor = PayloadTestDescriptor::new("tags", entity_with_collection());
        let v2 = TestConfiguration::new(MessageKind::Response, ODataVersion::V2);
        let v3 = TestConfiguration::new(MessageKind::Response, ODataVersion::V3);
        assert!(!descriptor.applies_to(v2).unwrap());
        assert!(descriptor.applies_to(v3).unwrap());
    }

    #[test]
    fn test_explicit_floor_and_skip() {
        let descriptor = PayloadTestDescriptor::new(
            "plain",
            EntityInstance::new("TestModel.Customer")
                .with_property(PrimitiveProperty::new("Id", 1_i32)),
        )
        .with_min_version(ODataVersion::V2)
        .only(MessageKind::Response);

        assert_eq!(descriptor.min_version().unwrap(), ODataVersion::V2);
        let configs = descriptor.configurations(&FixtureSettings::default()).unwrap();
        assert_eq!(
            configs,
            vec![
                TestConfiguration::new(MessageKind::Response, ODataVersion::V2),
                TestConfiguration::new(MessageKind::Response, ODataVersion::V3),
            ]
        );
    }

    #[test]
    fn test_deep_copy_shares_model_but_not_identity() {
        let model = Arc::new(EdmModel::new("TestModel"));
        let descriptor = PayloadTestDescriptor::new("tags", entity_with_collection())
            .with_model(Arc::clone(&model))
            .only(MessageKind::Request);

        let copy = descriptor.deep_copy().unwrap();
        assert_ne!(copy.payload().id(), descriptor.payload().id());
        assert_payload_eq(descriptor.payload(), copy.payload()).unwrap();
        assert!(Arc::ptr_eq(copy.model().unwrap(), &model));

        let response = TestConfiguration::new(MessageKind::Response, ODataVersion::V3);
        assert!(!copy.applies_to(response).unwrap());
    }
}
