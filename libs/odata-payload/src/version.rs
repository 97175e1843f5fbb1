//! Protocol versions and the minimum version a payload needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::element::{
    ComplexMultiValue, ElementHeader, EntitySetInstance, LinkCollection, NamedStreamInstance,
    NavigationPropertyInstance, PayloadElement, PrimitiveMultiValue, ServiceOperationDescriptor,
};
use crate::error::Result;
use crate::visitor::{
    PayloadVisitor, walk_complex_collection, walk_entity_set, walk_link_collection,
    walk_navigation_property, walk_primitive_collection,
};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ODataVersion {
    #[default]
    V1,
    V2,
    V3,
    V4,
}

impl ODataVersion {
    pub const ALL: [ODataVersion; 4] = [
        ODataVersion::V1,
        ODataVersion::V2,
        ODataVersion::V3,
        ODataVersion::V4,
    ];

    /// Value of the `DataServiceVersion` / `OData-Version` header.
    #[must_use]
    pub fn as_header_value(self) -> &'static str {
        match self {
            ODataVersion::V1 => "1.0",
            ODataVersion::V2 => "2.0",
            ODataVersion::V3 => "3.0",
            ODataVersion::V4 => "4.0",
        }
    }
}

impl fmt::Display for ODataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_header_value())
    }
}

/// Computes the lowest protocol version able to carry a payload.
#[derive(Debug, Default)]
pub struct VersionCalculator {
    version: ODataVersion,
}

impl VersionCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Propagates visitor errors; the default walk never fails.
    pub fn calculate(element: &PayloadElement) -> Result<ODataVersion> {
        let mut calculator = Self::new();
        calculator.visit(element)?;
        Ok(calculator.version)
    }

    #[must_use]
    pub fn version(&self) -> ODataVersion {
        self.version
    }

    fn raise(&mut self, version: ODataVersion) {
        self.version = self.version.max(version);
    }
}

impl PayloadVisitor for VersionCalculator {
    fn visit_header(&mut self, header: &ElementHeader) -> Result<()> {
        for annotation in &header.annotations {
            if let Annotation::VersionRequirement(required) = annotation {
                self.raise(*required);
            }
        }
        Ok(())
    }

    fn visit_entity_set(&mut self, set: &EntitySetInstance) -> Result<()> {
        if set.inline_count.is_some() || set.next_link.is_some() {
            self.raise(ODataVersion::V2);
        }
        walk_entity_set(self, set)
    }

    fn visit_link_collection(&mut self, links: &LinkCollection) -> Result<()> {
        if links.inline_count.is_some() || links.next_link.is_some() {
            self.raise(ODataVersion::V2);
        }
        walk_link_collection(self, links)
    }

    fn visit_primitive_collection(&mut self, collection: &PrimitiveMultiValue) -> Result<()> {
        self.raise(ODataVersion::V3);
        walk_primitive_collection(self, collection)
    }

    fn visit_complex_collection(&mut self, collection: &ComplexMultiValue) -> Result<()> {
        self.raise(ODataVersion::V3);
        walk_complex_collection(self, collection)
    }

    fn visit_named_stream(&mut self, stream: &NamedStreamInstance) -> Result<()> {
        self.raise(ODataVersion::V3);
        self.visit_header(&stream.header)
    }

    fn visit_service_operation(&mut self, operation: &ServiceOperationDescriptor) -> Result<()> {
        self.raise(ODataVersion::V3);
        self.visit_header(&operation.header)
    }

    fn visit_navigation_property(&mut self, navigation: &NavigationPropertyInstance) -> Result<()> {
        if navigation.association_link.is_some() {
            self.raise(ODataVersion::V3);
        }
        walk_navigation_property(self, navigation)
    }
}

impl PayloadElement {
    /// Minimum protocol version able to represent this tree.
    ///
    /// # Errors
    /// Propagates visitor errors.
    pub fn min_version(&self) -> Result<ODataVersion> {
        VersionCalculator::calculate(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::{
        EntityInstance, PayloadNode, PrimitiveMultiValueProperty, PrimitiveProperty,
        PrimitiveValue,
    };

    #[test]
    fn test_plain_entity_is_v1() {
        let entity: PayloadElement = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .into();
        assert_eq!(entity.min_version().unwrap(), ODataVersion::V1);
    }

    #[test]
    fn test_inline_count_needs_v2() {
        let set: PayloadElement = EntitySetInstance::new().with_inline_count(0).into();
        assert_eq!(set.min_version().unwrap(), ODataVersion::V2);
    }

    #[test]
    fn test_nested_collection_needs_v3() {
        let entity: PayloadElement = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveMultiValueProperty::new(
                "Tags",
                PrimitiveMultiValue::new("Edm.String").with_item(PrimitiveValue::new("a")),
            ))
            .into();
        assert_eq!(entity.min_version().unwrap(), ODataVersion::V3);
    }

    #[test]
    fn test_annotation_raises_floor() {
        let value = PrimitiveValue::new(1_i32)
            .with_annotation(Annotation::VersionRequirement(ODataVersion::V4));
        let element: PayloadElement = value.into();
        assert_eq!(element.min_version().unwrap(), ODataVersion::V4);
    }

    #[test]
    fn test_versions_are_ordered() {
        assert!(ODataVersion::V1 < ODataVersion::V3);
        assert_eq!(ODataVersion::V2.to_string(), "2.0");
        assert_eq!(ODataVersion::ALL.iter().max(), Some(&ODataVersion::V4));
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&ODataVersion::V3).unwrap();
        assert_eq!(json, "\"V3\"");
        let parsed: ODataVersion = serde_json::from_str("\"V2\"").unwrap();
        assert_eq!(parsed, ODataVersion::V2);
    }
}
