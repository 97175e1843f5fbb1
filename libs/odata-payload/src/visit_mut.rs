//! Mutable counterpart of [`crate::visitor`], used by normalizers and annotators.
//!
//! Dispatch and child order are identical to the read-only visitor.

use crate::element::{
    BatchPart, BatchRequestPayload, BatchResponsePayload, ComplexInstance, ComplexMultiValue,
    ComplexMultiValueProperty, ComplexProperty, DeferredLink, ElementHeader, ElementType,
    EntityInstance, EntitySetInstance, ExpandedLink, LinkCollection, MemberSlot,
    NamedStreamInstance, NavigationPropertyInstance, NavigationValue, ODataErrorPayload,
    ODataInnerError, PayloadElement, PrimitiveMultiValue, PrimitiveMultiValueProperty,
    PrimitiveProperty, PrimitiveValue, PropertyInstance, ResourceCollectionInstance,
    ServiceDocumentInstance, ServiceOperationDescriptor, WorkspaceInstance,
};
use crate::error::{Error, Result};

pub trait PayloadVisitorMut {
    fn visit_mut(&mut self, element: &mut PayloadElement) -> Result<()> {
        walk_element_mut(self, element)
    }

    fn visit_header_mut(&mut self, _header: &mut ElementHeader) -> Result<()> {
        Ok(())
    }

    fn unsupported(&mut self, element_type: ElementType) -> Result<()> {
        Err(Error::UnsupportedPayloadType(element_type))
    }

    fn visit_entity_set_mut(&mut self, set: &mut EntitySetInstance) -> Result<()> {
        walk_entity_set_mut(self, set)
    }

    fn visit_entity_mut(&mut self, entity: &mut EntityInstance) -> Result<()> {
        walk_entity_mut(self, entity)
    }

    fn visit_complex_value_mut(&mut self, value: &mut ComplexInstance) -> Result<()> {
        walk_complex_value_mut(self, value)
    }

    fn visit_primitive_value_mut(&mut self, value: &mut PrimitiveValue) -> Result<()> {
        self.visit_header_mut(&mut value.header)
    }

    fn visit_primitive_collection_mut(
        &mut self,
        collection: &mut PrimitiveMultiValue,
    ) -> Result<()> {
        self.visit_header_mut(&mut collection.header)?;
        for item in &mut collection.items {
            self.visit_primitive_value_mut(item)?;
        }
        Ok(())
    }

    fn visit_complex_collection_mut(&mut self, collection: &mut ComplexMultiValue) -> Result<()> {
        self.visit_header_mut(&mut collection.header)?;
        for item in &mut collection.items {
            self.visit_complex_value_mut(item)?;
        }
        Ok(())
    }

    fn visit_property_mut(&mut self, property: &mut PropertyInstance) -> Result<()> {
        walk_property_mut(self, property)
    }

    fn visit_primitive_property_mut(&mut self, property: &mut PrimitiveProperty) -> Result<()> {
        self.visit_header_mut(&mut property.header)?;
        self.visit_primitive_value_mut(&mut property.value)
    }

    fn visit_complex_property_mut(&mut self, property: &mut ComplexProperty) -> Result<()> {
        self.visit_header_mut(&mut property.header)?;
        self.visit_complex_value_mut(&mut property.value)
    }

    fn visit_primitive_collection_property_mut(
        &mut self,
        property: &mut PrimitiveMultiValueProperty,
    ) -> Result<()> {
        self.visit_header_mut(&mut property.header)?;
        self.visit_primitive_collection_mut(&mut property.value)
    }

    fn visit_complex_collection_property_mut(
        &mut self,
        property: &mut ComplexMultiValueProperty,
    ) -> Result<()> {
        self.visit_header_mut(&mut property.header)?;
        self.visit_complex_collection_mut(&mut property.value)
    }

    fn visit_named_stream_mut(&mut self, stream: &mut NamedStreamInstance) -> Result<()> {
        self.visit_header_mut(&mut stream.header)
    }

    fn visit_navigation_property_mut(
        &mut self,
        navigation: &mut NavigationPropertyInstance,
    ) -> Result<()> {
        walk_navigation_property_mut(self, navigation)
    }

    fn visit_deferred_link_mut(&mut self, link: &mut DeferredLink) -> Result<()> {
        self.visit_header_mut(&mut link.header)
    }

    fn visit_expanded_link_mut(&mut self, link: &mut ExpandedLink) -> Result<()> {
        self.visit_header_mut(&mut link.header)?;
        match link.payload.as_deref_mut() {
            Some(payload) => self.visit_mut(payload),
            None => Ok(()),
        }
    }

    fn visit_service_operation_mut(
        &mut self,
        operation: &mut ServiceOperationDescriptor,
    ) -> Result<()> {
        self.visit_header_mut(&mut operation.header)
    }

    fn visit_link_collection_mut(&mut self, links: &mut LinkCollection) -> Result<()> {
        self.visit_header_mut(&mut links.header)?;
        for link in &mut links.links {
            self.visit_deferred_link_mut(link)?;
        }
        Ok(())
    }

    fn visit_error_mut(&mut self, error: &mut ODataErrorPayload) -> Result<()> {
        self.visit_header_mut(&mut error.header)?;
        match &mut error.inner_error {
            Some(inner) => self.visit_inner_error_mut(inner),
            None => Ok(()),
        }
    }

    fn visit_inner_error_mut(&mut self, inner: &mut ODataInnerError) -> Result<()> {
        self.visit_header_mut(&mut inner.header)?;
        match inner.inner_error.as_deref_mut() {
            Some(nested) => self.visit_inner_error_mut(nested),
            None => Ok(()),
        }
    }

    fn visit_service_document_mut(&mut self, document: &mut ServiceDocumentInstance) -> Result<()> {
        self.visit_header_mut(&mut document.header)?;
        for workspace in &mut document.workspaces {
            self.visit_workspace_mut(workspace)?;
        }
        Ok(())
    }

    fn visit_workspace_mut(&mut self, workspace: &mut WorkspaceInstance) -> Result<()> {
        self.visit_header_mut(&mut workspace.header)?;
        for collection in &mut workspace.collections {
            self.visit_entity_set_info_mut(collection)?;
        }
        Ok(())
    }

    fn visit_entity_set_info_mut(&mut self, info: &mut ResourceCollectionInstance) -> Result<()> {
        self.visit_header_mut(&mut info.header)
    }

    fn visit_batch_request_mut(&mut self, batch: &mut BatchRequestPayload) -> Result<()> {
        self.visit_header_mut(&mut batch.header)?;
        for op in batch.parts.iter_mut().flat_map(BatchPart::operations_mut) {
            if let Some(payload) = op.payload.as_deref_mut() {
                self.visit_mut(payload)?;
            }
        }
        Ok(())
    }

    fn visit_batch_response_mut(&mut self, batch: &mut BatchResponsePayload) -> Result<()> {
        self.visit_header_mut(&mut batch.header)?;
        for op in batch.parts.iter_mut().flat_map(BatchPart::operations_mut) {
            if let Some(payload) = op.payload.as_deref_mut() {
                self.visit_mut(payload)?;
            }
        }
        Ok(())
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_element_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    element: &mut PayloadElement,
) -> Result<()> {
    match element {
        PayloadElement::EntitySet(set) => visitor.visit_entity_set_mut(set),
        PayloadElement::Entity(entity) => visitor.visit_entity_mut(entity),
        PayloadElement::ComplexValue(value) => visitor.visit_complex_value_mut(value),
        PayloadElement::PrimitiveValue(value) => visitor.visit_primitive_value_mut(value),
        PayloadElement::PrimitiveCollection(c) => visitor.visit_primitive_collection_mut(c),
        PayloadElement::ComplexCollection(c) => visitor.visit_complex_collection_mut(c),
        PayloadElement::PrimitiveProperty(p) => visitor.visit_primitive_property_mut(p),
        PayloadElement::ComplexProperty(p) => visitor.visit_complex_property_mut(p),
        PayloadElement::PrimitiveCollectionProperty(p) => {
            visitor.visit_primitive_collection_property_mut(p)
        }
        PayloadElement::ComplexCollectionProperty(p) => {
            visitor.visit_complex_collection_property_mut(p)
        }
        PayloadElement::NamedStream(stream) => visitor.visit_named_stream_mut(stream),
        PayloadElement::NavigationProperty(nav) => visitor.visit_navigation_property_mut(nav),
        PayloadElement::DeferredLink(link) => visitor.visit_deferred_link_mut(link),
        PayloadElement::ExpandedLink(link) => visitor.visit_expanded_link_mut(link),
        PayloadElement::ServiceOperation(op) => visitor.visit_service_operation_mut(op),
        PayloadElement::LinkCollection(links) => visitor.visit_link_collection_mut(links),
        PayloadElement::Error(error) => visitor.visit_error_mut(error),
        PayloadElement::InnerError(inner) => visitor.visit_inner_error_mut(inner),
        PayloadElement::ServiceDocument(doc) => visitor.visit_service_document_mut(doc),
        PayloadElement::Workspace(workspace) => visitor.visit_workspace_mut(workspace),
        PayloadElement::EntitySetInfo(info) => visitor.visit_entity_set_info_mut(info),
        PayloadElement::BatchRequest(batch) => visitor.visit_batch_request_mut(batch),
        PayloadElement::BatchResponse(batch) => visitor.visit_batch_response_mut(batch),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_entity_set_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    set: &mut EntitySetInstance,
) -> Result<()> {
    visitor.visit_header_mut(&mut set.header)?;
    for entity in &mut set.entities {
        visitor.visit_entity_mut(entity)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_entity_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    entity: &mut EntityInstance,
) -> Result<()> {
    visitor.visit_header_mut(&mut entity.header)?;
    if let Some(media) = &mut entity.media_resource {
        visitor.visit_named_stream_mut(media)?;
    }
    for action in entity.operations.iter_mut().filter(|op| op.is_action) {
        visitor.visit_service_operation_mut(action)?;
    }
    for function in entity.operations.iter_mut().filter(|op| !op.is_action) {
        visitor.visit_service_operation_mut(function)?;
    }
    walk_entity_members_mut(visitor, entity)
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_entity_members_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    entity: &mut EntityInstance,
) -> Result<()> {
    for slot in entity.member_order() {
        match slot {
            MemberSlot::Property(i) => visitor.visit_property_mut(&mut entity.properties[i])?,
            MemberSlot::Navigation(i) => {
                visitor.visit_navigation_property_mut(&mut entity.navigation_properties[i])?;
            }
        }
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_complex_value_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    value: &mut ComplexInstance,
) -> Result<()> {
    visitor.visit_header_mut(&mut value.header)?;
    for property in &mut value.properties {
        visitor.visit_property_mut(property)?;
    }
    Ok(())
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_property_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    property: &mut PropertyInstance,
) -> Result<()> {
    match property {
        PropertyInstance::Primitive(p) => visitor.visit_primitive_property_mut(p),
        PropertyInstance::Complex(p) => visitor.visit_complex_property_mut(p),
        PropertyInstance::PrimitiveCollection(p) => {
            visitor.visit_primitive_collection_property_mut(p)
        }
        PropertyInstance::ComplexCollection(p) => visitor.visit_complex_collection_property_mut(p),
        PropertyInstance::NamedStream(s) => visitor.visit_named_stream_mut(s),
    }
}

/// # Errors
/// Propagates visitor errors.
pub fn walk_navigation_property_mut<V: PayloadVisitorMut + ?Sized>(
    visitor: &mut V,
    navigation: &mut NavigationPropertyInstance,
) -> Result<()> {
    visitor.visit_header_mut(&mut navigation.header)?;
    if let Some(association) = &mut navigation.association_link {
        visitor.visit_deferred_link_mut(association)?;
    }
    match &mut navigation.value {
        NavigationValue::Deferred(link) => visitor.visit_deferred_link_mut(link),
        NavigationValue::Expanded(link) => visitor.visit_expanded_link_mut(link),
    }
}
