use tracing::debug;

use super::ODataWriter;
use super::object_model::{
    ODataCollectionValue, ODataComplexValue, ODataEntitySetInfo, ODataEntry, ODataError,
    ODataFeed, ODataInnerError, ODataNavigationLink, ODataOperation, ODataProperty,
    ODataPropertyValue, ODataServiceDocument, ODataStreamReference,
};
use crate::annotation::{Annotation, AnnotationKind};
use crate::element::{
    BatchRequestPayload, BatchResponsePayload, ComplexInstance, ComplexMultiValue,
    ComplexMultiValueProperty, ComplexProperty, DeferredLink, ElementHeader, ElementType,
    EntityInstance, EntityMember, EntitySetInstance, ExpandedLink, LinkCollection,
    NamedStreamInstance, NavigationPropertyInstance, NavigationValue, ODataErrorPayload,
    ODataInnerError as InnerErrorNode, PayloadElement, PrimitiveMultiValue,
    PrimitiveMultiValueProperty, PrimitiveProperty, PrimitiveValue, PropertyInstance,
    ResourceCollectionInstance, ServiceDocumentInstance, ServiceOperationDescriptor,
    WorkspaceInstance,
};
use crate::error::{Error, Result};
use crate::visitor::PayloadVisitor;

/// Drives an [`ODataWriter`] from a payload tree.
///
/// Only message roots are accepted: feeds, entries, properties, values,
/// errors and service documents. Entity members are written in their
/// original interleaved order.
pub struct PayloadElementODataWriter<'w, W: ODataWriter + ?Sized> {
    writer: &'w mut W,
    include_debug_information: bool,
}

impl<'w, W: ODataWriter + ?Sized> PayloadElementODataWriter<'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        Self {
            writer,
            include_debug_information: true,
        }
    }

    /// Whether error payloads carry their inner error chain.
    #[must_use]
    pub fn with_debug_information(mut self, include: bool) -> Self {
        self.include_debug_information = include;
        self
    }

    /// Write `element` as a complete message.
    ///
    /// # Errors
    /// - [`Error::NotSupportedOperation`] for link collections
    /// - [`Error::UnsupportedPayloadType`] for batches and non-root fragments
    /// - any error raised by the writer
    pub fn write(element: &PayloadElement, writer: &'w mut W) -> Result<()> {
        Self::new(writer).write_root(element)
    }

    /// # Errors
    /// See [`PayloadElementODataWriter::write`].
    pub fn write_root(&mut self, element: &PayloadElement) -> Result<()> {
        debug!(element_type = %element.element_type(), "writing payload");
        self.visit(element)?;
        debug!(element_type = %element.element_type(), "payload written");
        Ok(())
    }

    fn write_feed(&mut self, set: &EntitySetInstance) -> Result<()> {
        let feed = ODataFeed {
            id: self_link(&set.header),
            count: set.inline_count,
            next_page_link: set.next_link.clone(),
        };
        self.writer.write_start_feed(&feed)?;
        for entity in &set.entities {
            self.write_entry(entity)?;
        }
        self.writer.write_end()
    }

    fn write_entry(&mut self, entity: &EntityInstance) -> Result<()> {
        self.writer.write_start_entry(&entry_of(entity))?;
        for member in entity.members() {
            match member {
                EntityMember::Property(property) => {
                    self.writer.write_property(&property_of(property))?;
                }
                EntityMember::Navigation(navigation) => self.write_navigation(navigation)?,
            }
        }
        self.writer.write_end()
    }

    fn write_navigation(&mut self, navigation: &NavigationPropertyInstance) -> Result<()> {
        let is_collection = match &navigation.value {
            NavigationValue::Deferred(_) => None,
            NavigationValue::Expanded(link) => link.is_collection(),
        };
        let link = ODataNavigationLink {
            name: navigation.name.clone(),
            url: navigation.url().map(str::to_owned),
            association_link_url: navigation
                .association_link
                .as_ref()
                .and_then(|link| link.url.clone()),
            is_collection,
        };
        self.writer.write_start_navigation_link(&link)?;
        if let NavigationValue::Expanded(expanded) = &navigation.value {
            match expanded.payload.as_deref() {
                None => self.writer.write_null_entry()?,
                Some(PayloadElement::EntitySet(set)) => self.write_feed(set)?,
                Some(PayloadElement::Entity(entity)) => self.write_entry(entity)?,
                Some(other) => return self.unsupported(other.element_type()),
            }
        }
        self.writer.write_end()
    }
}

impl<W: ODataWriter + ?Sized> PayloadVisitor for PayloadElementODataWriter<'_, W> {
    fn visit_entity_set(&mut self, set: &EntitySetInstance) -> Result<()> {
        self.write_feed(set)
    }

    fn visit_entity(&mut self, entity: &EntityInstance) -> Result<()> {
        self.write_entry(entity)
    }

    fn visit_complex_value(&mut self, value: &ComplexInstance) -> Result<()> {
        self.writer.write_value(&complex_value_of(value))
    }

    fn visit_primitive_value(&mut self, value: &PrimitiveValue) -> Result<()> {
        self.writer.write_value(&primitive_value_of(value))
    }

    fn visit_primitive_collection(&mut self, collection: &PrimitiveMultiValue) -> Result<()> {
        self.writer.write_value(&primitive_collection_of(collection))
    }

    fn visit_complex_collection(&mut self, collection: &ComplexMultiValue) -> Result<()> {
        self.writer.write_value(&complex_collection_of(collection))
    }

    fn visit_primitive_property(&mut self, property: &PrimitiveProperty) -> Result<()> {
        self.writer.write_property(&ODataProperty {
            name: property.name.clone(),
            value: primitive_value_of(&property.value),
        })
    }

    fn visit_complex_property(&mut self, property: &ComplexProperty) -> Result<()> {
        self.writer.write_property(&ODataProperty {
            name: property.name.clone(),
            value: complex_value_of(&property.value),
        })
    }

    fn visit_primitive_collection_property(
        &mut self,
        property: &PrimitiveMultiValueProperty,
    ) -> Result<()> {
        self.writer.write_property(&ODataProperty {
            name: property.name.clone(),
            value: primitive_collection_of(&property.value),
        })
    }

    fn visit_complex_collection_property(
        &mut self,
        property: &ComplexMultiValueProperty,
    ) -> Result<()> {
        self.writer.write_property(&ODataProperty {
            name: property.name.clone(),
            value: complex_collection_of(&property.value),
        })
    }

    fn visit_named_stream(&mut self, _stream: &NamedStreamInstance) -> Result<()> {
        self.unsupported(ElementType::NamedStreamInstance)
    }

    fn visit_navigation_property(
        &mut self,
        _navigation: &NavigationPropertyInstance,
    ) -> Result<()> {
        self.unsupported(ElementType::NavigationPropertyInstance)
    }

    fn visit_deferred_link(&mut self, _link: &DeferredLink) -> Result<()> {
        self.unsupported(ElementType::DeferredLink)
    }

    fn visit_expanded_link(&mut self, _link: &ExpandedLink) -> Result<()> {
        self.unsupported(ElementType::ExpandedLink)
    }

    fn visit_service_operation(&mut self, _operation: &ServiceOperationDescriptor) -> Result<()> {
        self.unsupported(ElementType::ServiceOperationDescriptor)
    }

    fn visit_link_collection(&mut self, _links: &LinkCollection) -> Result<()> {
        Err(Error::NotSupportedOperation(
            "entity reference links cannot be written from a payload tree",
        ))
    }

    fn visit_error(&mut self, error: &ODataErrorPayload) -> Result<()> {
        let error = ODataError {
            error_code: error.code.clone(),
            message: error.message.clone(),
            inner_error: error.inner_error.as_ref().map(inner_error_of),
        };
        self.writer.write_error(&error, self.include_debug_information)
    }

    fn visit_inner_error(&mut self, _inner: &InnerErrorNode) -> Result<()> {
        self.unsupported(ElementType::ODataInnerError)
    }

    fn visit_service_document(&mut self, document: &ServiceDocumentInstance) -> Result<()> {
        let entity_sets = document
            .workspaces
            .iter()
            .flat_map(|workspace| &workspace.collections)
            .map(|collection| ODataEntitySetInfo {
                url: collection.href.clone(),
                name: collection.name.clone(),
                title: collection.title.clone(),
            })
            .collect();
        self.writer
            .write_service_document(&ODataServiceDocument { entity_sets })
    }

    fn visit_workspace(&mut self, _workspace: &WorkspaceInstance) -> Result<()> {
        self.unsupported(ElementType::WorkspaceInstance)
    }

    fn visit_entity_set_info(&mut self, _info: &ResourceCollectionInstance) -> Result<()> {
        self.unsupported(ElementType::ResourceCollectionInstance)
    }

    fn visit_batch_request(&mut self, _batch: &BatchRequestPayload) -> Result<()> {
        self.unsupported(ElementType::BatchRequestPayload)
    }

    fn visit_batch_response(&mut self, _batch: &BatchResponsePayload) -> Result<()> {
        self.unsupported(ElementType::BatchResponsePayload)
    }
}

fn self_link(header: &ElementHeader) -> Option<String> {
    match header.annotation(AnnotationKind::SelfLink) {
        Some(Annotation::SelfLink(link)) => Some(link.clone()),
        _ => None,
    }
}

fn operation_of(operation: &ServiceOperationDescriptor) -> ODataOperation {
    ODataOperation {
        metadata: operation.metadata.clone(),
        target: operation.target.clone(),
        title: operation.title.clone(),
    }
}

fn stream_of(stream: &NamedStreamInstance) -> ODataStreamReference {
    ODataStreamReference {
        content_type: stream.content_type.clone(),
        edit_link: stream.edit_link.clone(),
        read_link: stream.source_link.clone(),
        etag: stream.etag.clone(),
    }
}

fn entry_of(entity: &EntityInstance) -> ODataEntry {
    ODataEntry {
        type_name: entity.type_name.clone(),
        id: entity.entity_id.clone(),
        etag: entity.etag.clone(),
        edit_link: entity.edit_link.clone(),
        read_link: self_link(&entity.header),
        media_resource: entity.media_resource.as_ref().map(stream_of),
        actions: entity.actions().map(operation_of).collect(),
        functions: entity.functions().map(operation_of).collect(),
    }
}

fn primitive_value_of(value: &PrimitiveValue) -> ODataPropertyValue {
    ODataPropertyValue::Primitive {
        type_name: value.type_name.clone(),
        value: value.value.clone(),
    }
}

fn complex_value_of(value: &ComplexInstance) -> ODataPropertyValue {
    if value.is_null {
        return ODataPropertyValue::Null {
            type_name: value.type_name.clone(),
        };
    }
    ODataPropertyValue::Complex(ODataComplexValue {
        type_name: value.type_name.clone(),
        properties: value.properties.iter().map(property_of).collect(),
    })
}

fn primitive_collection_of(collection: &PrimitiveMultiValue) -> ODataPropertyValue {
    if collection.is_null {
        return ODataPropertyValue::Null {
            type_name: collection.type_name.clone(),
        };
    }
    ODataPropertyValue::Collection(ODataCollectionValue {
        type_name: collection.type_name.clone(),
        items: collection.items.iter().map(primitive_value_of).collect(),
    })
}

fn complex_collection_of(collection: &ComplexMultiValue) -> ODataPropertyValue {
    if collection.is_null {
        return ODataPropertyValue::Null {
            type_name: collection.type_name.clone(),
        };
    }
    ODataPropertyValue::Collection(ODataCollectionValue {
        type_name: collection.type_name.clone(),
        items: collection.items.iter().map(complex_value_of).collect(),
    })
}

fn property_of(property: &PropertyInstance) -> ODataProperty {
    let (name, value) = match property {
        PropertyInstance::Primitive(p) => (p.name.clone(), primitive_value_of(&p.value)),
        PropertyInstance::Complex(p) => (p.name.clone(), complex_value_of(&p.value)),
        PropertyInstance::PrimitiveCollection(p) => {
            (p.name.clone(), primitive_collection_of(&p.value))
        }
        PropertyInstance::ComplexCollection(p) => (p.name.clone(), complex_collection_of(&p.value)),
        PropertyInstance::NamedStream(s) => (
            s.name.clone().unwrap_or_default(),
            ODataPropertyValue::Stream(stream_of(s)),
        ),
    };
    ODataProperty { name, value }
}

fn inner_error_of(inner: &InnerErrorNode) -> ODataInnerError {
    ODataInnerError {
        message: inner.message.clone(),
        type_name: inner.type_name.clone(),
        stack_trace: inner.stack_trace.clone(),
        inner_error: inner
            .inner_error
            .as_deref()
            .map(|nested| Box::new(inner_error_of(nested))),
    }
}
