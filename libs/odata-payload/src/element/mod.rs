//! The payload element tree.
//!
//! [`PayloadElement`] is a closed tagged union. Its [`ElementType`] tag is
//! derived from the variant, so the tag can never disagree with the concrete
//! node it describes.

mod document;
mod entity;
mod property;

pub use document::{
    BatchChangeset, BatchPart, BatchRequestOperation, BatchRequestPayload, BatchResponseOperation,
    BatchResponsePayload, LinkCollection, ODataErrorPayload, ODataInnerError,
    ResourceCollectionInstance, ServiceDocumentInstance, WorkspaceInstance,
};
pub use entity::{
    DeferredLink, EntityInstance, EntityMember, EntitySetInstance, ExpandedLink, MemberSlot,
    NamedStreamInstance, NavigationPropertyInstance, NavigationValue, ServiceOperationDescriptor,
};
pub use property::{
    ComplexInstance, ComplexMultiValue, ComplexMultiValueProperty, ComplexProperty,
    PrimitiveMultiValue, PrimitiveMultiValueProperty, PrimitiveProperty, PrimitiveValue,
    PropertyInstance, collection_type_name,
};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::annotation::{Annotation, AnnotationKind};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a payload node, independent of its content.
///
/// Two structurally identical nodes always have different ids, which is what
/// lets the annotation side-table tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a process-unique id.
    #[must_use]
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity plus the ordered list of annotations carried by every node.
#[derive(Clone, Debug)]
pub struct ElementHeader {
    id: NodeId,
    pub annotations: Vec<Annotation>,
}

impl Default for ElementHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementHeader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NodeId::fresh(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Give the node a new identity, returning the old one.
    pub(crate) fn renumber(&mut self) -> NodeId {
        std::mem::replace(&mut self.id, NodeId::fresh())
    }

    /// First annotation of the given kind.
    #[must_use]
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind() == kind)
    }

    /// Replace any annotation of the same kind, or append.
    pub fn set_annotation(&mut self, annotation: Annotation) {
        let kind = annotation.kind();
        self.annotations.retain(|a| a.kind() != kind);
        self.annotations.push(annotation);
    }

    pub fn remove_annotations(&mut self, kind: AnnotationKind) {
        self.annotations.retain(|a| a.kind() != kind);
    }
}

/// Discriminant of a [`PayloadElement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    EntitySetInstance,
    EntityInstance,
    ComplexInstance,
    PrimitiveValue,
    PrimitiveMultiValue,
    ComplexMultiValue,
    PrimitiveProperty,
    ComplexProperty,
    PrimitiveMultiValueProperty,
    ComplexMultiValueProperty,
    NamedStreamInstance,
    NavigationPropertyInstance,
    DeferredLink,
    ExpandedLink,
    ServiceOperationDescriptor,
    LinkCollection,
    ODataErrorPayload,
    ODataInnerError,
    ServiceDocumentInstance,
    WorkspaceInstance,
    ResourceCollectionInstance,
    BatchRequestPayload,
    BatchResponsePayload,
}

impl ElementType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ElementType::EntitySetInstance => "EntitySetInstance",
            ElementType::EntityInstance => "EntityInstance",
            ElementType::ComplexInstance => "ComplexInstance",
            ElementType::PrimitiveValue => "PrimitiveValue",
            ElementType::PrimitiveMultiValue => "PrimitiveMultiValue",
            ElementType::ComplexMultiValue => "ComplexMultiValue",
            ElementType::PrimitiveProperty => "PrimitiveProperty",
            ElementType::ComplexProperty => "ComplexProperty",
            ElementType::PrimitiveMultiValueProperty => "PrimitiveMultiValueProperty",
            ElementType::ComplexMultiValueProperty => "ComplexMultiValueProperty",
            ElementType::NamedStreamInstance => "NamedStreamInstance",
            ElementType::NavigationPropertyInstance => "NavigationPropertyInstance",
            ElementType::DeferredLink => "DeferredLink",
            ElementType::ExpandedLink => "ExpandedLink",
            ElementType::ServiceOperationDescriptor => "ServiceOperationDescriptor",
            ElementType::LinkCollection => "LinkCollection",
            ElementType::ODataErrorPayload => "ODataErrorPayload",
            ElementType::ODataInnerError => "ODataInnerError",
            ElementType::ServiceDocumentInstance => "ServiceDocumentInstance",
            ElementType::WorkspaceInstance => "WorkspaceInstance",
            ElementType::ResourceCollectionInstance => "ResourceCollectionInstance",
            ElementType::BatchRequestPayload => "BatchRequestPayload",
            ElementType::BatchResponsePayload => "BatchResponsePayload",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common accessors shared by every concrete node type.
pub trait PayloadNode {
    const ELEMENT_TYPE: ElementType;

    fn header(&self) -> &ElementHeader;

    fn header_mut(&mut self) -> &mut ElementHeader;

    fn id(&self) -> NodeId {
        self.header().id()
    }

    fn annotations(&self) -> &[Annotation] {
        &self.header().annotations
    }

    fn element_type(&self) -> ElementType {
        Self::ELEMENT_TYPE
    }

    #[must_use]
    fn with_annotation(mut self, annotation: Annotation) -> Self
    where
        Self: Sized,
    {
        self.header_mut().annotations.push(annotation);
        self
    }
}

macro_rules! payload_node {
    ($($ty:ident => $variant:ident / $tag:ident),* $(,)?) => {
        $(
            impl PayloadNode for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$tag;

                fn header(&self) -> &ElementHeader {
                    &self.header
                }

                fn header_mut(&mut self) -> &mut ElementHeader {
                    &mut self.header
                }
            }

            impl From<$ty> for PayloadElement {
                fn from(node: $ty) -> Self {
                    PayloadElement::$variant(node)
                }
            }
        )*
    };
}

payload_node! {
    EntitySetInstance => EntitySet / EntitySetInstance,
    EntityInstance => Entity / EntityInstance,
    ComplexInstance => ComplexValue / ComplexInstance,
    PrimitiveValue => PrimitiveValue / PrimitiveValue,
    PrimitiveMultiValue => PrimitiveCollection / PrimitiveMultiValue,
    ComplexMultiValue => ComplexCollection / ComplexMultiValue,
    PrimitiveProperty => PrimitiveProperty / PrimitiveProperty,
    ComplexProperty => ComplexProperty / ComplexProperty,
    PrimitiveMultiValueProperty => PrimitiveCollectionProperty / PrimitiveMultiValueProperty,
    ComplexMultiValueProperty => ComplexCollectionProperty / ComplexMultiValueProperty,
    NamedStreamInstance => NamedStream / NamedStreamInstance,
    NavigationPropertyInstance => NavigationProperty / NavigationPropertyInstance,
    DeferredLink => DeferredLink / DeferredLink,
    ExpandedLink => ExpandedLink / ExpandedLink,
    ServiceOperationDescriptor => ServiceOperation / ServiceOperationDescriptor,
    LinkCollection => LinkCollection / LinkCollection,
    ODataErrorPayload => Error / ODataErrorPayload,
    ODataInnerError => InnerError / ODataInnerError,
    ServiceDocumentInstance => ServiceDocument / ServiceDocumentInstance,
    WorkspaceInstance => Workspace / WorkspaceInstance,
    ResourceCollectionInstance => EntitySetInfo / ResourceCollectionInstance,
    BatchRequestPayload => BatchRequest / BatchRequestPayload,
    BatchResponsePayload => BatchResponse / BatchResponsePayload,
}

/// One node of an in-memory OData payload.
#[derive(Clone, Debug)]
pub enum PayloadElement {
    EntitySet(EntitySetInstance),
    Entity(EntityInstance),
    ComplexValue(ComplexInstance),
    PrimitiveValue(PrimitiveValue),
    PrimitiveCollection(PrimitiveMultiValue),
    ComplexCollection(ComplexMultiValue),
    PrimitiveProperty(PrimitiveProperty),
    ComplexProperty(ComplexProperty),
    PrimitiveCollectionProperty(PrimitiveMultiValueProperty),
    ComplexCollectionProperty(ComplexMultiValueProperty),
    NamedStream(NamedStreamInstance),
    NavigationProperty(NavigationPropertyInstance),
    DeferredLink(DeferredLink),
    ExpandedLink(ExpandedLink),
    ServiceOperation(ServiceOperationDescriptor),
    LinkCollection(LinkCollection),
    Error(ODataErrorPayload),
    InnerError(ODataInnerError),
    ServiceDocument(ServiceDocumentInstance),
    Workspace(WorkspaceInstance),
    EntitySetInfo(ResourceCollectionInstance),
    BatchRequest(BatchRequestPayload),
    BatchResponse(BatchResponsePayload),
}

macro_rules! with_node {
    ($element:expr, $node:ident => $body:expr) => {
        match $element {
            PayloadElement::EntitySet($node) => $body,
            PayloadElement::Entity($node) => $body,
            PayloadElement::ComplexValue($node) => $body,
            PayloadElement::PrimitiveValue($node) => $body,
            PayloadElement::PrimitiveCollection($node) => $body,
            PayloadElement::ComplexCollection($node) => $body,
            PayloadElement::PrimitiveProperty($node) => $body,
            PayloadElement::ComplexProperty($node) => $body,
            PayloadElement::PrimitiveCollectionProperty($node) => $body,
            PayloadElement::ComplexCollectionProperty($node) => $body,
            PayloadElement::NamedStream($node) => $body,
            PayloadElement::NavigationProperty($node) => $body,
            PayloadElement::DeferredLink($node) => $body,
            PayloadElement::ExpandedLink($node) => $body,
            PayloadElement::ServiceOperation($node) => $body,
            PayloadElement::LinkCollection($node) => $body,
            PayloadElement::Error($node) => $body,
            PayloadElement::InnerError($node) => $body,
            PayloadElement::ServiceDocument($node) => $body,
            PayloadElement::Workspace($node) => $body,
            PayloadElement::EntitySetInfo($node) => $body,
            PayloadElement::BatchRequest($node) => $body,
            PayloadElement::BatchResponse($node) => $body,
        }
    };
}

impl PayloadElement {
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        with_node!(self, node => node.element_type())
    }

    #[must_use]
    pub fn header(&self) -> &ElementHeader {
        with_node!(self, node => node.header())
    }

    pub fn header_mut(&mut self) -> &mut ElementHeader {
        with_node!(self, node => node.header_mut())
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.header().id()
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.header().annotations
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.header_mut().annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&EntityInstance> {
        match self {
            PayloadElement::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity_set(&self) -> Option<&EntitySetInstance> {
        match self {
            PayloadElement::EntitySet(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&ODataErrorPayload> {
        match self {
            PayloadElement::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl From<PropertyInstance> for PayloadElement {
    fn from(property: PropertyInstance) -> Self {
        match property {
            PropertyInstance::Primitive(p) => p.into(),
            PropertyInstance::Complex(p) => p.into(),
            PropertyInstance::PrimitiveCollection(p) => p.into(),
            PropertyInstance::ComplexCollection(p) => p.into(),
            PropertyInstance::NamedStream(p) => p.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_tag_follows_variant() {
        let element: PayloadElement = EntityInstance::new("NS.Customer").into();
        assert_eq!(element.element_type(), ElementType::EntityInstance);

        let element: PayloadElement = PrimitiveValue::new(5_i32).into();
        assert_eq!(element.element_type(), ElementType::PrimitiveValue);
        assert_eq!(element.element_type().to_string(), "PrimitiveValue");
    }

    #[test]
    fn test_identical_nodes_have_distinct_ids() {
        let a = PrimitiveValue::new("x");
        let b = PrimitiveValue::new("x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clone_keeps_identity() {
        let a = PrimitiveValue::new("x");
        let b = a.clone();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_set_annotation_replaces_same_kind() {
        let mut header = ElementHeader::new();
        header.set_annotation(Annotation::SelfLink("a".into()));
        header.set_annotation(Annotation::EdmType("NS.T".into()));
        header.set_annotation(Annotation::SelfLink("b".into()));

        assert_eq!(header.annotations.len(), 2);
        assert_eq!(
            header.annotation(AnnotationKind::SelfLink),
            Some(&Annotation::SelfLink("b".into()))
        );
    }

    #[test]
    fn test_property_converts_to_element() {
        let property: PropertyInstance = PrimitiveProperty::new("Id", 1_i32).into();
        let element = PayloadElement::from(property);
        assert_eq!(element.element_type(), ElementType::PrimitiveProperty);
    }
}
