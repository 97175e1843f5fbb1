//! Read-only double-dispatch walker over a payload tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! calls [`PayloadVisitor::visit_header`] for the node and then recurses into
//! its children in a fixed order. Override a method to intercept a node kind;
//! call the `walk_*` function from the override to keep recursing.
//!
//! Child order for an entity: media resource, actions, functions, then
//! properties and navigation properties interleaved in original payload order.

use tracing::trace;

use crate::element::{
    BatchPart, BatchRequestPayload, BatchResponsePayload, ComplexInstance, ComplexMultiValue,
    ComplexMultiValueProperty, ComplexProperty, DeferredLink, ElementHeader, ElementType,
    EntityInstance, EntityMember, EntitySetInstance, ExpandedLink, LinkCollection,
    NamedStreamInstance, NavigationPropertyInstance, NavigationValue, ODataErrorPayload,
    ODataInnerError, PayloadElement, PrimitiveMultiValue, PrimitiveMultiValueProperty,
    PrimitiveProperty, PrimitiveValue, PropertyInstance, ResourceCollectionInstance,
    ServiceDocumentInstance, ServiceOperationDescriptor, WorkspaceInstance,
};
use crate::error::{Error, Result};

pub trait PayloadVisitor {
    /// Entry point: dispatch on the element's variant.
    fn visit(&mut self, element: &PayloadElement) -> Result<()> {
        walk_element(self, element)
    }

    /// Called once for every node before its children are walked.
    fn visit_header(&mut self, _header: &ElementHeader) -> Result<()> {
        Ok(())
    }

    /// Failure handler for node kinds a visitor cannot process.
    fn unsupported(&mut self, element_type: ElementType) -> Result<()> {
        Err(Error::UnsupportedPayloadType(element_type))
    }

    fn visit_entity_set(&mut self, set: &EntitySetInstance) -> Result<()> {
        walk_entity_set(self, set)
    }

    fn visit_entity(&mut self, entity: &EntityInstance) -> Result<()> {
        walk_entity(self, entity)
    }

    fn visit_complex_value(&mut self, value: &ComplexInstance) -> Result<()> {
        walk_complex_value(self, value)
    }

    fn visit_primitive_value(&mut self, value: &PrimitiveValue) -> Result<()> {
        self.visit_header(&value.header)
    }

    fn visit_primitive_collection(&mut self, collection: &PrimitiveMultiValue) -> Result<()> {
        walk_primitive_collection(self, collection)
    }

    fn visit_complex_collection(&mut self, collection: &ComplexMultiValue) -> Result<()> {
        walk_complex_collection(self, collection)
    }

    /// Dispatch for properties held by entities and complex values.
    fn visit_property(&mut self, property: &PropertyInstance) -> Result<()> {
        walk_property(self, property)
    }

    fn visit_primitive_property(&mut self, property: &PrimitiveProperty) -> Result<()> {
        self.visit_header(&property.header)?;
        self.visit_primitive_value(&property.value)
    }

    fn visit_complex_property(&mut self, property: &ComplexProperty) -> Result<()> {
        self.visit_header(&property.header)?;
        self.visit_complex_value(&property.value)
    }

    fn visit_primitive_collection_property(
        &mut self,
        property: &PrimitiveMultiValueProperty,
    ) -> Result<()> {
        self.visit_header(&property.header)?;
        self.visit_primitive_collection(&property.value)
    }

    fn visit_complex_collection_property(
        &mut self,
        property: &ComplexMultiValueProperty,
    ) -> Result<()> {
        self.visit_header(&property.header)?;
        self.visit_complex_collection(&property.value)
    }

    fn visit_named_stream(&mut self, stream: &NamedStreamInstance) -> Result<()> {
        self.visit_header(&stream.header)
    }

    fn visit_navigation_property(&mut self, navigation: &NavigationPropertyInstance) -> Result<()> {
        walk_navigation_property(self, navigation)
    }

    fn visit_deferred_link(&mut self, link: &DeferredLink) -> Result<()> {
        self.visit_header(&link.header)
    }

    fn visit_expanded_link(&mut self, link: &ExpandedLink) -> Result<()> {
        walk_expanded_link(self, link)
    }

    fn visit_service_operation(&mut self, operation: &ServiceOperationDescriptor) -> Result<()> {
        self.visit_header(&operation.header)
    }

    fn visit_link_collection(&mut self, links: &LinkCollection) -> Result<()> {
        walk_link_collection(self, links)
    }

    fn visit_error(&mut self, error: &ODataErrorPayload) -> Result<()> {
        walk_error(self, error)
    }

    fn visit_inner_error(&mut self, inner: &ODataInnerError) -> Result<()> {
        walk_inner_error(self, inner)
    }

    fn visit_service_document(&mut self, document: &ServiceDocumentInstance) -> Result<()> {
        walk_service_document(self, document)
    }

    fn visit_workspace(&mut self, workspace: &WorkspaceInstance) -> Result<()> {
        walk_workspace(self, workspace)
    }

    fn visit_entity_set_info(&mut self, info: &ResourceCollectionInstance) -> Result<()> {
        self.visit_header(&info.header)
    }

    fn visit_batch_request(&mut self, batch: &BatchRequestPayload) -> Result<()> {
        walk_batch_request(self, batch)
    }

    fn visit_batch_response(&mut self, batch: &BatchResponsePayload) -> Result<()> {
        walk_batch_response(self, batch)
    }
}

/// Dispatch an element to the visitor method for its variant.
///
/// # Errors
/// Propagates the first error returned by a visitor method.
pub fn walk_element<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    element: &PayloadElement,
) -> Result<()> {
    trace!(element_type = %element.element_type(), id = %element.id(), "visit");
    match element {
        PayloadElement::EntitySet(set) => visitor.visit_entity_set(set),
        PayloadElement::Entity(entity) => visitor.visit_entity(entity),
        PayloadElement::ComplexValue(value) => visitor.visit_complex_value(value),
        PayloadElement::PrimitiveValue(value) => visitor.visit_primitive_value(value),
        PayloadElement::PrimitiveCollection(c) => visitor.visit_primitive_collection(c),
        PayloadElement::ComplexCollection(c) => visitor.visit_complex_collection(c),
        PayloadElement::PrimitiveProperty(p) => visitor.visit_primitive_property(p),
        PayloadElement::ComplexProperty(p) => visitor.visit_complex_property(p),
        PayloadElement::PrimitiveCollectionProperty(p) => {
            visitor.visit_primitive_collection_property(p)
        }
        PayloadElement::ComplexCollectionProperty(p) => {
            visitor.visit_complex_collection_property(p)
        }
        PayloadElement::NamedStream(stream) => visitor.visit_named_stream(stream),
        PayloadElement::NavigationProperty(nav) => visitor.visit_navigation_property(nav),
        PayloadElement::DeferredLink(link) => visitor.visit_deferred_link(link),
        PayloadElement::ExpandedLink(link) => visitor.visit_expanded_link(link),
        PayloadElement::ServiceOperation(op) => visitor.visit_service_operation(op),
        PayloadElement::LinkCollection(links) => visitor.visit_link_collection(links),
        PayloadElement::Error(error) => visitor.visit_error(error),
        PayloadElement::InnerError(inner) => visitor.visit_inner_error(inner),
        PayloadElement::ServiceDocument(doc) => visitor.visit_service_document(doc),
        PayloadElement::Workspace(workspace) => visitor.visit_workspace(workspace),
        PayloadElement::EntitySetInfo(info) => visitor.visit_entity_set_info(info),
        PayloadElement::BatchRequest(batch) => visitor.visit_batch_request(batch),
        PayloadElement::BatchResponse(batch) => visitor.visit_batch_response(batch),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_entity_set<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    set: &EntitySetInstance,
) -> Result<()> {
    visitor.visit_header(&set.header)?;
    for entity in &set.entities {
        visitor.visit_entity(entity)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_entity<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    entity: &EntityInstance,
) -> Result<()> {
    visitor.visit_header(&entity.header)?;
    if let Some(media) = &entity.media_resource {
        visitor.visit_named_stream(media)?;
    }
    for action in entity.actions() {
        visitor.visit_service_operation(action)?;
    }
    for function in entity.functions() {
        visitor.visit_service_operation(function)?;
    }
    walk_entity_members(visitor, entity)
}

/// Walk only the properties and navigation properties, in payload order.
///
/// # Errors
/// Propagates visitor errors.
pub fn walk_entity_members<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    entity: &EntityInstance,
) -> Result<()> {
    for member in entity.members() {
        match member {
            EntityMember::Property(property) => visitor.visit_property(property)?,
            EntityMember::Navigation(navigation) => visitor.visit_navigation_property(navigation)?,
        }
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_complex_value<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    value: &ComplexInstance,
) -> Result<()> {
    visitor.visit_header(&value.header)?;
    for property in &value.properties {
        visitor.visit_property(property)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_primitive_collection<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    collection: &PrimitiveMultiValue,
) -> Result<()> {
    visitor.visit_header(&collection.header)?;
    for item in &collection.items {
        visitor.visit_primitive_value(item)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_complex_collection<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    collection: &ComplexMultiValue,
) -> Result<()> {
    visitor.visit_header(&collection.header)?;
    for item in &collection.items {
        visitor.visit_complex_value(item)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_property<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    property: &PropertyInstance,
) -> Result<()> {
    match property {
        PropertyInstance::Primitive(p) => visitor.visit_primitive_property(p),
        PropertyInstance::Complex(p) => visitor.visit_complex_property(p),
        PropertyInstance::PrimitiveCollection(p) => visitor.visit_primitive_collection_property(p),
        PropertyInstance::ComplexCollection(p) => visitor.visit_complex_collection_property(p),
        PropertyInstance::NamedStream(s) => visitor.visit_named_stream(s),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_navigation_property<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    navigation: &NavigationPropertyInstance,
) -> Result<()> {
    visitor.visit_header(&navigation.header)?;
    if let Some(association) = &navigation.association_link {
        visitor.visit_deferred_link(association)?;
    }
    match &navigation.value {
        NavigationValue::Deferred(link) => visitor.visit_deferred_link(link),
        NavigationValue::Expanded(link) => visitor.visit_expanded_link(link),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_expanded_link<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    link: &ExpandedLink,
) -> Result<()> {
    visitor.visit_header(&link.header)?;
    match link.payload.as_deref() {
        Some(payload) => visitor.visit(payload),
        None => Ok(()),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_link_collection<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    links: &LinkCollection,
) -> Result<()> {
    visitor.visit_header(&links.header)?;
    for link in &links.links {
        visitor.visit_deferred_link(link)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_error<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    error: &ODataErrorPayload,
) -> Result<()> {
    visitor.visit_header(&error.header)?;
    match &error.inner_error {
        Some(inner) => visitor.visit_inner_error(inner),
        None => Ok(()),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_inner_error<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    inner: &ODataInnerError,
) -> Result<()> {
    visitor.visit_header(&inner.header)?;
    match inner.inner_error.as_deref() {
        Some(nested) => visitor.visit_inner_error(nested),
        None => Ok(()),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_service_document<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    document: &ServiceDocumentInstance,
) -> Result<()> {
    visitor.visit_header(&document.header)?;
    for workspace in &document.workspaces {
        visitor.visit_workspace(workspace)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_workspace<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    workspace: &WorkspaceInstance,
) -> Result<()> {
    visitor.visit_header(&workspace.header)?;
    for collection in &workspace.collections {
        visitor.visit_entity_set_info(collection)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_batch_request<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    batch: &BatchRequestPayload,
) -> Result<()> {
    visitor.visit_header(&batch.header)?;
    let payloads = batch
        .parts
        .iter()
        .flat_map(BatchPart::operations)
        .filter_map(|op| op.payload.as_deref());
    for payload in payloads {
        visitor.visit(payload)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_batch_response<V: PayloadVisitor + ?Sized>(
    visitor: &mut V,
    batch: &BatchResponsePayload,
) -> Result<()> {
    visitor.visit_header(&batch.header)?;
    let payloads = batch
        .parts
        .iter()
        .flat_map(BatchPart::operations)
        .filter_map(|op| op.payload.as_deref());
    for payload in payloads {
        visitor.visit(payload)?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::{
        BatchChangeset, BatchRequestOperation, NamedStreamInstance, PayloadNode,
        PrimitiveProperty,
    };

    /// Records element types in visit order.
    #[derive(Default)]
    struct TypeRecorder {
        seen: Vec<ElementType>,
    }

    impl PayloadVisitor for TypeRecorder {
        fn visit_header(&mut self, _header: &ElementHeader) -> Result<()> {
            Ok(())
        }

        fn visit_entity(&mut self, entity: &EntityInstance) -> Result<()> {
            self.seen.push(entity.element_type());
            walk_entity(self, entity)
        }

        fn visit_named_stream(&mut self, stream: &NamedStreamInstance) -> Result<()> {
            self.seen.push(stream.element_type());
            Ok(())
        }

        fn visit_service_operation(&mut self, op: &ServiceOperationDescriptor) -> Result<()> {
            self.seen.push(op.element_type());
            Ok(())
        }

        fn visit_primitive_property(&mut self, p: &PrimitiveProperty) -> Result<()> {
            self.seen.push(p.element_type());
            Ok(())
        }

        fn visit_navigation_property(&mut self, n: &NavigationPropertyInstance) -> Result<()> {
            self.seen.push(n.element_type());
            walk_navigation_property(self, n)
        }
    }

    /// Counts headers, i.e. nodes.
    #[derive(Default)]
    struct NodeCounter(usize);

    impl PayloadVisitor for NodeCounter {
        fn visit_header(&mut self, _header: &ElementHeader) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_entity_child_order() {
        let entity = EntityInstance::new("NS.Photo")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::deferred("Owner", "Owner"))
            .with_operation(ServiceOperationDescriptor::function("#NS.F"))
            .with_operation(ServiceOperationDescriptor::action("#NS.A"))
            .with_media_resource(NamedStreamInstance::media_resource());

        let mut recorder = TypeRecorder::default();
        recorder.visit(&entity.into()).unwrap();

        assert_eq!(
            recorder.seen,
            vec![
                ElementType::EntityInstance,
                ElementType::NamedStreamInstance,
                ElementType::ServiceOperationDescriptor,
                ElementType::ServiceOperationDescriptor,
                ElementType::PrimitiveProperty,
                ElementType::NavigationPropertyInstance,
            ]
        );
    }

    #[test]
    fn test_every_node_header_visited_once() {
        let inner =
            EntityInstance::new("NS.Order").with_property(PrimitiveProperty::new("Id", 7_i32));
        let entity = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::expanded(
                "LastOrder",
                ExpandedLink::new(Some(inner.into())),
            ));

        let mut counter = NodeCounter::default();
        counter.visit(&entity.into()).unwrap();
        // customer, Id prop, Id value, nav, expanded link, order, Id prop, Id value
        assert_eq!(counter.0, 8);
    }

    #[test]
    fn test_batch_payloads_are_walked() {
        let batch = BatchRequestPayload::new()
            .with_part(BatchPart::Operation(
                BatchRequestOperation::new("GET", "Customers(1)"),
            ))
            .with_part(BatchPart::Changeset(BatchChangeset::new("cs").with_operation(
                BatchRequestOperation::new("POST", "Customers")
                    .with_payload(EntityInstance::new("NS.Customer")),
            )));

        let mut recorder = TypeRecorder::default();
        recorder.visit(&batch.into()).unwrap();
        assert_eq!(recorder.seen, vec![ElementType::EntityInstance]);
    }

    #[test]
    fn test_unsupported_handler_reports_type() {
        struct RejectErrors;
        impl PayloadVisitor for RejectErrors {
            fn visit_error(&mut self, error: &ODataErrorPayload) -> Result<()> {
                self.unsupported(error.element_type())
            }
        }

        let err = RejectErrors
            .visit(&ODataErrorPayload::new().into())
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedPayloadType(ElementType::ODataErrorPayload)
        );
        assert!(err.to_string().contains("ODataErrorPayload"));
    }
}
