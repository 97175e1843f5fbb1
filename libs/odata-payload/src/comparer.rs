//! Structural comparison of two payload trees.
//!
//! [`PayloadComparer`] walks an expected and an observed tree in lock-step and
//! reports every disagreement to an [`AssertionHandler`]. Node identities are
//! never compared, so a tree always equals its own deep copy.
//!
//! ```
//! use odata_payload::{EntityInstance, PayloadElement, PrimitiveProperty, assert_payload_eq};
//!
//! let expected: PayloadElement = EntityInstance::new("NS.Customer")
//!     .with_property(PrimitiveProperty::new("Id", 1_i32))
//!     .into();
//! let observed = expected.deep_copy()?;
//! assert_payload_eq(&expected, &observed)?;
//! # Ok::<(), odata_payload::Error>(())
//! ```

use std::fmt::{Debug, Display};

use tracing::debug;

use crate::annotation::Annotation;
use crate::element::{
    BatchPart, BatchRequestOperation, BatchResponseOperation, ComplexInstance, ComplexMultiValue,
    ComplexMultiValueProperty, ComplexProperty, DeferredLink, ElementHeader, EntityInstance,
    EntityMember, EntitySetInstance, ExpandedLink, LinkCollection, NamedStreamInstance,
    NavigationPropertyInstance, NavigationValue, ODataErrorPayload, ODataInnerError,
    PayloadElement, PrimitiveMultiValue, PrimitiveMultiValueProperty, PrimitiveProperty,
    PrimitiveValue, PropertyInstance, ResourceCollectionInstance, ServiceDocumentInstance,
    ServiceOperationDescriptor, WorkspaceInstance,
};
use crate::error::{ComparisonFailure, Error, Result};

/// Decides what happens when the comparer finds a mismatch.
///
/// Returning `Err` stops the comparison; returning `Ok` keeps it going.
pub trait AssertionHandler {
    /// # Errors
    /// Returns an error to abort the comparison.
    fn on_mismatch(&mut self, failure: ComparisonFailure) -> Result<()>;
}

/// Stops at the first mismatch.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailFast;

impl AssertionHandler for FailFast {
    fn on_mismatch(&mut self, failure: ComparisonFailure) -> Result<()> {
        Err(Error::DataComparison(failure))
    }
}

/// Records every mismatch and lets the comparison run to the end.
#[derive(Clone, Debug, Default)]
pub struct CollectFailures {
    failures: Vec<ComparisonFailure>,
}

impl CollectFailures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failures(&self) -> &[ComparisonFailure] {
        &self.failures
    }

    /// # Errors
    /// Returns [`Error::ComparisonFailed`] when any mismatch was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(Error::ComparisonFailed(self.failures))
        }
    }
}

impl AssertionHandler for CollectFailures {
    fn on_mismatch(&mut self, failure: ComparisonFailure) -> Result<()> {
        self.failures.push(failure);
        Ok(())
    }
}

/// Fail-fast comparison of two trees.
///
/// # Errors
/// Returns [`Error::DataComparison`] describing the first mismatch.
pub fn assert_payload_eq(expected: &PayloadElement, observed: &PayloadElement) -> Result<()> {
    PayloadComparer::new(&mut FailFast).compare(expected, observed)
}

pub struct PayloadComparer<'h, H: AssertionHandler + ?Sized> {
    handler: &'h mut H,
    path: Vec<String>,
}

fn root_segment(element: &PayloadElement) -> &'static str {
    match element {
        PayloadElement::EntitySet(_) => "EntitySet",
        PayloadElement::Entity(_) => "Entity",
        PayloadElement::ComplexValue(_) => "Complex",
        PayloadElement::PrimitiveValue(_) => "Primitive",
        PayloadElement::PrimitiveCollection(_) => "PrimitiveCollection",
        PayloadElement::ComplexCollection(_) => "ComplexCollection",
        PayloadElement::PrimitiveProperty(_)
        | PayloadElement::ComplexProperty(_)
        | PayloadElement::PrimitiveCollectionProperty(_)
        | PayloadElement::ComplexCollectionProperty(_) => "Property",
        PayloadElement::NamedStream(_) => "NamedStream",
        PayloadElement::NavigationProperty(_) => "Navigation",
        PayloadElement::DeferredLink(_) => "DeferredLink",
        PayloadElement::ExpandedLink(_) => "ExpandedLink",
        PayloadElement::ServiceOperation(_) => "ServiceOperation",
        PayloadElement::LinkCollection(_) => "LinkCollection",
        PayloadElement::Error(_) => "Error",
        PayloadElement::InnerError(_) => "InnerError",
        PayloadElement::ServiceDocument(_) => "ServiceDocument",
        PayloadElement::Workspace(_) => "Workspace",
        PayloadElement::EntitySetInfo(_) => "Collection",
        PayloadElement::BatchRequest(_) => "BatchRequest",
        PayloadElement::BatchResponse(_) => "BatchResponse",
    }
}

fn presence(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}

impl<'h, H: AssertionHandler + ?Sized> PayloadComparer<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        Self {
            handler,
            path: Vec::new(),
        }
    }

    /// Compare `observed` against `expected`.
    ///
    /// # Errors
    /// Whatever the handler returns for a mismatch.
    pub fn compare(&mut self, expected: &PayloadElement, observed: &PayloadElement) -> Result<()> {
        self.path.clear();
        self.scoped(root_segment(expected), |c| c.element(expected, observed))
    }

    fn scoped<F>(&mut self, segment: impl Into<String>, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.path.push(segment.into());
        let result = body(self);
        self.path.pop();
        result
    }

    fn fail(&mut self, field: &str, expected: impl Display, actual: impl Display) -> Result<()> {
        let failure = ComparisonFailure {
            path: self.path.join("/"),
            field: field.to_owned(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        };
        debug!(
            path = %failure.path,
            field = %failure.field,
            expected = %failure.expected,
            actual = %failure.actual,
            "payload mismatch"
        );
        self.handler.on_mismatch(failure)
    }

    fn check<T: PartialEq + Debug + ?Sized>(
        &mut self,
        field: &str,
        expected: &T,
        actual: &T,
    ) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            self.fail(field, format!("{expected:?}"), format!("{actual:?}"))
        }
    }

    fn optional<T>(
        &mut self,
        field: &str,
        segment: &str,
        expected: Option<&T>,
        actual: Option<&T>,
        compare: impl FnOnce(&mut Self, &T, &T) -> Result<()>,
    ) -> Result<()> {
        match (expected, actual) {
            (Some(e), Some(a)) => self.scoped(segment, |c| compare(c, e, a)),
            (None, None) => Ok(()),
            (e, a) => self.fail(field, presence(e.is_some()), presence(a.is_some())),
        }
    }

    fn sequence<T>(
        &mut self,
        field: &str,
        expected: &[T],
        actual: &[T],
        segment: impl Fn(usize, &T) -> String,
        compare: impl Fn(&mut Self, &T, &T) -> Result<()>,
    ) -> Result<()> {
        if expected.len() != actual.len() {
            self.fail(field, expected.len(), actual.len())?;
        }
        for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
            self.scoped(segment(i, e), |c| compare(c, e, a))?;
        }
        Ok(())
    }

    /// Annotations are a multiset: order is ignored and every annotation on
    /// either side must be paired with exactly one on the other.
    fn header(&mut self, expected: &ElementHeader, actual: &ElementHeader) -> Result<()> {
        let mut remaining: Vec<&Annotation> = actual.annotations.iter().collect();
        for annotation in &expected.annotations {
            match remaining.iter().position(|a| annotation.matches(a)) {
                Some(index) => {
                    remaining.swap_remove(index);
                }
                None => self.fail("annotation", annotation, "(missing)")?,
            }
        }
        for leftover in remaining {
            self.fail("annotation", "(none)", leftover)?;
        }
        Ok(())
    }

    fn element(&mut self, expected: &PayloadElement, actual: &PayloadElement) -> Result<()> {
        match (expected, actual) {
            (PayloadElement::EntitySet(e), PayloadElement::EntitySet(a)) => self.entity_set(e, a),
            (PayloadElement::Entity(e), PayloadElement::Entity(a)) => self.entity(e, a),
            (PayloadElement::ComplexValue(e), PayloadElement::ComplexValue(a)) => {
                self.complex_value(e, a)
            }
            (PayloadElement::PrimitiveValue(e), PayloadElement::PrimitiveValue(a)) => {
                self.primitive_value(e, a)
            }
            (PayloadElement::PrimitiveCollection(e), PayloadElement::PrimitiveCollection(a)) => {
                self.primitive_collection(e, a)
            }
            (PayloadElement::ComplexCollection(e), PayloadElement::ComplexCollection(a)) => {
                self.complex_collection(e, a)
            }
            (PayloadElement::PrimitiveProperty(e), PayloadElement::PrimitiveProperty(a)) => {
                self.primitive_property(e, a)
            }
            (PayloadElement::ComplexProperty(e), PayloadElement::ComplexProperty(a)) => {
                self.complex_property(e, a)
            }
            (
                PayloadElement::PrimitiveCollectionProperty(e),
                PayloadElement::PrimitiveCollectionProperty(a),
            ) => self.primitive_collection_property(e, a),
            (
                PayloadElement::ComplexCollectionProperty(e),
                PayloadElement::ComplexCollectionProperty(a),
            ) => self.complex_collection_property(e, a),
            (PayloadElement::NamedStream(e), PayloadElement::NamedStream(a)) => {
                self.named_stream(e, a)
            }
            (PayloadElement::NavigationProperty(e), PayloadElement::NavigationProperty(a)) => {
                self.navigation(e, a)
            }
            (PayloadElement::DeferredLink(e), PayloadElement::DeferredLink(a)) => {
                self.deferred_link(e, a)
            }
            (PayloadElement::ExpandedLink(e), PayloadElement::ExpandedLink(a)) => {
                self.expanded_link(e, a)
            }
            (PayloadElement::ServiceOperation(e), PayloadElement::ServiceOperation(a)) => {
                self.service_operation(e, a)
            }
            (PayloadElement::LinkCollection(e), PayloadElement::LinkCollection(a)) => {
                self.link_collection(e, a)
            }
            (PayloadElement::Error(e), PayloadElement::Error(a)) => self.error(e, a),
            (PayloadElement::InnerError(e), PayloadElement::InnerError(a)) => {
                self.inner_error(e, a)
            }
            (PayloadElement::ServiceDocument(e), PayloadElement::ServiceDocument(a)) => {
                self.service_document(e, a)
            }
            (PayloadElement::Workspace(e), PayloadElement::Workspace(a)) => self.workspace(e, a),
            (PayloadElement::EntitySetInfo(e), PayloadElement::EntitySetInfo(a)) => {
                self.entity_set_info(e, a)
            }
            (PayloadElement::BatchRequest(e), PayloadElement::BatchRequest(a)) => {
                self.header(&e.header, &a.header)?;
                self.batch_parts(&e.parts, &a.parts, Self::request_operation)
            }
            (PayloadElement::BatchResponse(e), PayloadElement::BatchResponse(a)) => {
                self.header(&e.header, &a.header)?;
                self.batch_parts(&e.parts, &a.parts, Self::response_operation)
            }
            _ => self.fail("element_type", expected.summary(), actual.summary()),
        }
    }

    fn entity_set(
        &mut self,
        expected: &EntitySetInstance,
        actual: &EntitySetInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("inline_count", &expected.inline_count, &actual.inline_count)?;
        self.check("next_link", &expected.next_link, &actual.next_link)?;
        self.sequence(
            "entities.count",
            &expected.entities,
            &actual.entities,
            |i, _| format!("Entity[{i}]"),
            Self::entity,
        )
    }

    fn entity(&mut self, expected: &EntityInstance, actual: &EntityInstance) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        self.check("entity_id", &expected.entity_id, &actual.entity_id)?;
        self.check("etag", &expected.etag, &actual.etag)?;
        self.check("edit_link", &expected.edit_link, &actual.edit_link)?;
        self.optional(
            "media_resource",
            "MediaResource",
            expected.media_resource.as_ref(),
            actual.media_resource.as_ref(),
            Self::named_stream,
        )?;
        self.sequence(
            "operations.count",
            &expected.operations,
            &actual.operations,
            |_, op| format!("Operation({})", op.metadata),
            Self::service_operation,
        )?;

        let expected_members = expected.members();
        let actual_members = actual.members();
        if expected_members.len() != actual_members.len() {
            self.fail("members.count", expected_members.len(), actual_members.len())?;
        }
        for (e, a) in expected_members.into_iter().zip(actual_members) {
            match (e, a) {
                (EntityMember::Property(e), EntityMember::Property(a)) => {
                    let segment = format!("Property({})", e.name().unwrap_or_default());
                    self.scoped(segment, |c| c.property(e, a))?;
                }
                (EntityMember::Navigation(e), EntityMember::Navigation(a)) => {
                    let segment = format!("Navigation({})", e.name);
                    self.scoped(segment, |c| c.navigation(e, a))?;
                }
                (EntityMember::Property(e), EntityMember::Navigation(a)) => {
                    let expected = format!("property {}", e.name().unwrap_or_default());
                    self.fail("member", expected, format!("navigation {}", a.name))?;
                }
                (EntityMember::Navigation(e), EntityMember::Property(a)) => {
                    let actual = format!("property {}", a.name().unwrap_or_default());
                    self.fail("member", format!("navigation {}", e.name), actual)?;
                }
            }
        }
        Ok(())
    }

    fn property(&mut self, expected: &PropertyInstance, actual: &PropertyInstance) -> Result<()> {
        match (expected, actual) {
            (PropertyInstance::Primitive(e), PropertyInstance::Primitive(a)) => {
                self.primitive_property(e, a)
            }
            (PropertyInstance::Complex(e), PropertyInstance::Complex(a)) => {
                self.complex_property(e, a)
            }
            (
                PropertyInstance::PrimitiveCollection(e),
                PropertyInstance::PrimitiveCollection(a),
            ) => {
                self.primitive_collection_property(e, a)
            }
            (PropertyInstance::ComplexCollection(e), PropertyInstance::ComplexCollection(a)) => {
                self.complex_collection_property(e, a)
            }
            (PropertyInstance::NamedStream(e), PropertyInstance::NamedStream(a)) => {
                self.named_stream(e, a)
            }
            _ => self.fail("property_kind", expected.element_type(), actual.element_type()),
        }
    }

    fn primitive_property(
        &mut self,
        expected: &PrimitiveProperty,
        actual: &PrimitiveProperty,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.primitive_value(&expected.value, &actual.value)
    }

    fn complex_property(
        &mut self,
        expected: &ComplexProperty,
        actual: &ComplexProperty,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.complex_value(&expected.value, &actual.value)
    }

    fn primitive_collection_property(
        &mut self,
        expected: &PrimitiveMultiValueProperty,
        actual: &PrimitiveMultiValueProperty,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.primitive_collection(&expected.value, &actual.value)
    }

    fn complex_collection_property(
        &mut self,
        expected: &ComplexMultiValueProperty,
        actual: &ComplexMultiValueProperty,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.complex_collection(&expected.value, &actual.value)
    }

    fn primitive_value(
        &mut self,
        expected: &PrimitiveValue,
        actual: &PrimitiveValue,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        if expected.value != actual.value {
            self.fail("value", &expected.value, &actual.value)?;
        }
        Ok(())
    }

    fn complex_value(
        &mut self,
        expected: &ComplexInstance,
        actual: &ComplexInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        self.check("is_null", &expected.is_null, &actual.is_null)?;
        self.sequence(
            "properties.count",
            &expected.properties,
            &actual.properties,
            |_, p| format!("Property({})", p.name().unwrap_or_default()),
            Self::property,
        )
    }

    fn primitive_collection(
        &mut self,
        expected: &PrimitiveMultiValue,
        actual: &PrimitiveMultiValue,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        self.check("is_null", &expected.is_null, &actual.is_null)?;
        self.sequence(
            "items.count",
            &expected.items,
            &actual.items,
            |i, _| format!("Item[{i}]"),
            Self::primitive_value,
        )
    }

    fn complex_collection(
        &mut self,
        expected: &ComplexMultiValue,
        actual: &ComplexMultiValue,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        self.check("is_null", &expected.is_null, &actual.is_null)?;
        self.sequence(
            "items.count",
            &expected.items,
            &actual.items,
            |i, _| format!("Item[{i}]"),
            Self::complex_value,
        )
    }

    fn named_stream(
        &mut self,
        expected: &NamedStreamInstance,
        actual: &NamedStreamInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.check("content_type", &expected.content_type, &actual.content_type)?;
        self.check("edit_link", &expected.edit_link, &actual.edit_link)?;
        self.check("source_link", &expected.source_link, &actual.source_link)?;
        self.check("etag", &expected.etag, &actual.etag)
    }

    fn navigation(
        &mut self,
        expected: &NavigationPropertyInstance,
        actual: &NavigationPropertyInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("name", &expected.name, &actual.name)?;
        self.optional(
            "association_link",
            "AssociationLink",
            expected.association_link.as_ref(),
            actual.association_link.as_ref(),
            Self::deferred_link,
        )?;
        match (&expected.value, &actual.value) {
            (NavigationValue::Deferred(e), NavigationValue::Deferred(a)) => {
                self.scoped("DeferredLink", |c| c.deferred_link(e, a))
            }
            (NavigationValue::Expanded(e), NavigationValue::Expanded(a)) => {
                self.scoped("ExpandedLink", |c| c.expanded_link(e, a))
            }
            (NavigationValue::Deferred(_), NavigationValue::Expanded(_)) => {
                self.fail("link", "deferred", "expanded")
            }
            (NavigationValue::Expanded(_), NavigationValue::Deferred(_)) => {
                self.fail("link", "expanded", "deferred")
            }
        }
    }

    fn deferred_link(&mut self, expected: &DeferredLink, actual: &DeferredLink) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("url", &expected.url, &actual.url)
    }

    fn expanded_link(&mut self, expected: &ExpandedLink, actual: &ExpandedLink) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("url", &expected.url, &actual.url)?;
        self.payload(expected.payload.as_deref(), actual.payload.as_deref())
    }

    fn payload(
        &mut self,
        expected: Option<&PayloadElement>,
        actual: Option<&PayloadElement>,
    ) -> Result<()> {
        match (expected, actual) {
            (Some(e), Some(a)) => self.scoped(root_segment(e), |c| c.element(e, a)),
            (None, None) => Ok(()),
            (e, a) => {
                let describe = |p: Option<&PayloadElement>| {
                    p.map_or_else(|| "null".to_owned(), PayloadElement::summary)
                };
                self.fail("payload", describe(e), describe(a))
            }
        }
    }

    fn service_operation(
        &mut self,
        expected: &ServiceOperationDescriptor,
        actual: &ServiceOperationDescriptor,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("is_action", &expected.is_action, &actual.is_action)?;
        self.check("metadata", &expected.metadata, &actual.metadata)?;
        self.check("target", &expected.target, &actual.target)?;
        self.check("title", &expected.title, &actual.title)
    }

    fn link_collection(
        &mut self,
        expected: &LinkCollection,
        actual: &LinkCollection,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("inline_count", &expected.inline_count, &actual.inline_count)?;
        self.check("next_link", &expected.next_link, &actual.next_link)?;
        self.sequence(
            "links.count",
            &expected.links,
            &actual.links,
            |i, _| format!("Link[{i}]"),
            Self::deferred_link,
        )
    }

    fn error(&mut self, expected: &ODataErrorPayload, actual: &ODataErrorPayload) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("code", &expected.code, &actual.code)?;
        self.check("message", &expected.message, &actual.message)?;
        self.optional(
            "inner_error",
            "InnerError",
            expected.inner_error.as_ref(),
            actual.inner_error.as_ref(),
            Self::inner_error,
        )
    }

    fn inner_error(&mut self, expected: &ODataInnerError, actual: &ODataInnerError) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("message", &expected.message, &actual.message)?;
        self.check("type_name", &expected.type_name, &actual.type_name)?;
        self.check("stack_trace", &expected.stack_trace, &actual.stack_trace)?;
        self.optional(
            "inner_error",
            "InnerError",
            expected.inner_error.as_deref(),
            actual.inner_error.as_deref(),
            Self::inner_error,
        )
    }

    fn service_document(
        &mut self,
        expected: &ServiceDocumentInstance,
        actual: &ServiceDocumentInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.sequence(
            "workspaces.count",
            &expected.workspaces,
            &actual.workspaces,
            |i, _| format!("Workspace[{i}]"),
            Self::workspace,
        )
    }

    fn workspace(
        &mut self,
        expected: &WorkspaceInstance,
        actual: &WorkspaceInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("title", &expected.title, &actual.title)?;
        self.sequence(
            "collections.count",
            &expected.collections,
            &actual.collections,
            |i, _| format!("Collection[{i}]"),
            Self::entity_set_info,
        )
    }

    fn entity_set_info(
        &mut self,
        expected: &ResourceCollectionInstance,
        actual: &ResourceCollectionInstance,
    ) -> Result<()> {
        self.header(&expected.header, &actual.header)?;
        self.check("href", &expected.href, &actual.href)?;
        self.check("title", &expected.title, &actual.title)?;
        self.check("name", &expected.name, &actual.name)
    }

    fn batch_parts<O>(
        &mut self,
        expected: &[BatchPart<O>],
        actual: &[BatchPart<O>],
        operation: fn(&mut Self, &O, &O) -> Result<()>,
    ) -> Result<()> {
        self.sequence(
            "parts.count",
            expected,
            actual,
            |i, _| format!("Part[{i}]"),
            |c, e, a| match (e, a) {
                (BatchPart::Operation(e), BatchPart::Operation(a)) => operation(c, e, a),
                (BatchPart::Changeset(e), BatchPart::Changeset(a)) => {
                    c.check("boundary", &e.boundary, &a.boundary)?;
                    c.sequence(
                        "operations.count",
                        &e.operations,
                        &a.operations,
                        |i, _| format!("Operation[{i}]"),
                        operation,
                    )
                }
                (BatchPart::Operation(_), BatchPart::Changeset(_)) => {
                    c.fail("part", "operation", "changeset")
                }
                (BatchPart::Changeset(_), BatchPart::Operation(_)) => {
                    c.fail("part", "changeset", "operation")
                }
            },
        )
    }

    fn request_operation(
        &mut self,
        expected: &BatchRequestOperation,
        actual: &BatchRequestOperation,
    ) -> Result<()> {
        self.check("method", &expected.method, &actual.method)?;
        self.check("uri", &expected.uri, &actual.uri)?;
        self.check("headers", &expected.headers, &actual.headers)?;
        self.payload(expected.payload.as_deref(), actual.payload.as_deref())
    }

    fn response_operation(
        &mut self,
        expected: &BatchResponseOperation,
        actual: &BatchResponseOperation,
    ) -> Result<()> {
        self.check("status_code", &expected.status_code, &actual.status_code)?;
        self.check("headers", &expected.headers, &actual.headers)?;
        self.payload(expected.payload.as_deref(), actual.payload.as_deref())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::PayloadNode;
    use tracing_test::traced_test;

    fn customer(id: i32, name: &str) -> EntityInstance {
        EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", id))
            .with_property(PrimitiveProperty::new("Name", name))
    }

    fn set_of(names: &[&str]) -> PayloadElement {
        let entities = names
            .iter()
            .zip(1..)
            .map(|(name, id)| customer(id, name));
        EntitySetInstance::new().with_entities(entities).into()
    }

    #[test]
    fn test_identical_trees_compare_equal() {
        assert_payload_eq(&set_of(&["a", "b"]), &set_of(&["a", "b"])).unwrap();
    }

    #[test]
    fn test_value_mismatch_reports_path() {
        let err = assert_payload_eq(&set_of(&["a", "b"]), &set_of(&["a", "x"])).unwrap_err();
        let Error::DataComparison(failure) = err else {
            panic!("expected a data comparison error, got {err:?}");
        };
        assert_eq!(failure.path, "EntitySet/Entity[1]/Property(Name)");
        assert_eq!(failure.field, "value");
        assert_eq!(failure.expected, "'b'");
        assert_eq!(failure.actual, "'x'");
    }

    #[test]
    fn test_collect_failures_keeps_going() {
        let mut handler = CollectFailures::new();
        PayloadComparer::new(&mut handler)
            .compare(&set_of(&["a", "b", "c"]), &set_of(&["x", "b", "y"]))
            .unwrap();
        assert_eq!(handler.failures().len(), 2);
        let err = handler.into_result().unwrap_err();
        assert!(matches!(err, Error::ComparisonFailed(ref f) if f.len() == 2));
    }

    #[test]
    fn test_count_mismatch() {
        let mut handler = CollectFailures::new();
        PayloadComparer::new(&mut handler)
            .compare(&set_of(&["a", "b"]), &set_of(&["a"]))
            .unwrap();
        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "entities.count");
        assert_eq!(failures[0].expected, "2");
    }

    #[test]
    fn test_annotations_compare_as_multiset() {
        let expected: PayloadElement = customer(1, "a")
            .with_annotation(Annotation::SelfLink("Customers(1)".into()))
            .with_annotation(Annotation::ContentType("application/json".into()))
            .into();
        let observed: PayloadElement = customer(1, "a")
            .with_annotation(Annotation::ContentType("Application/JSON".into()))
            .with_annotation(Annotation::SelfLink("Customers(1)".into()))
            .into();
        assert_payload_eq(&expected, &observed).unwrap();
    }

    #[test]
    fn test_extra_observed_annotation_fails() {
        let expected: PayloadElement = customer(1, "a").into();
        let observed: PayloadElement = customer(1, "a")
            .with_annotation(Annotation::SelfLink("Customers(1)".into()))
            .into();
        let err = assert_payload_eq(&expected, &observed).unwrap_err();
        assert!(matches!(err, Error::DataComparison(ref f) if f.field == "annotation"));
    }

    #[test]
    fn test_variant_mismatch_uses_summaries() {
        let err = assert_payload_eq(&set_of(&[]), &customer(1, "a").into()).unwrap_err();
        let Error::DataComparison(failure) = err else {
            panic!("expected a data comparison error");
        };
        assert_eq!(failure.field, "element_type");
        assert_eq!(failure.expected, "EntitySet[0 entities]");
        assert!(failure.actual.starts_with("Entity(NS.Customer"));
    }

    #[test]
    fn test_member_order_is_compared() {
        let link_first: PayloadElement = EntityInstance::new("NS.Customer")
            .with_navigation_property(NavigationPropertyInstance::deferred("Orders", "Orders"))
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .into();
        let link_last: PayloadElement = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::deferred("Orders", "Orders"))
            .into();
        let err = assert_payload_eq(&link_first, &link_last).unwrap_err();
        assert!(matches!(err, Error::DataComparison(ref f) if f.field == "member"));
    }

    #[test]
    fn test_identity_is_ignored() {
        let original = set_of(&["a"]);
        let copy = original.deep_copy().unwrap();
        assert_ne!(original.id(), copy.id());
        assert_payload_eq(&original, &copy).unwrap();
    }

    #[traced_test]
    #[test]
    fn test_mismatch_is_logged() {
        let _ = assert_payload_eq(&set_of(&["a"]), &set_of(&["b"]));
        assert!(logs_contain("payload mismatch"));
    }
}
