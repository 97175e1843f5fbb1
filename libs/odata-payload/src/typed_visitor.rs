//! Value-producing visitor.
//!
//! Unlike [`crate::PayloadVisitor`] there are no defaults: an implementation
//! must say what every node kind produces, so adding a variant is a compile
//! error in every implementation rather than a runtime failure.

use crate::element::{
    BatchRequestPayload, BatchResponsePayload, ComplexInstance, ComplexMultiValue,
    ComplexMultiValueProperty, ComplexProperty, DeferredLink, EntityInstance, EntitySetInstance,
    ExpandedLink, LinkCollection, NamedStreamInstance, NavigationPropertyInstance,
    NavigationValue, ODataErrorPayload, ODataInnerError, PayloadElement, PrimitiveMultiValue,
    PrimitiveMultiValueProperty, PrimitiveProperty, PrimitiveValue, ResourceCollectionInstance,
    ServiceDocumentInstance, ServiceOperationDescriptor, WorkspaceInstance,
};

pub trait PayloadElementVisitor<T> {
    fn visit_entity_set(&mut self, set: &EntitySetInstance) -> T;
    fn visit_entity(&mut self, entity: &EntityInstance) -> T;
    fn visit_complex_value(&mut self, value: &ComplexInstance) -> T;
    fn visit_primitive_value(&mut self, value: &PrimitiveValue) -> T;
    fn visit_primitive_collection(&mut self, collection: &PrimitiveMultiValue) -> T;
    fn visit_complex_collection(&mut self, collection: &ComplexMultiValue) -> T;
    fn visit_primitive_property(&mut self, property: &PrimitiveProperty) -> T;
    fn visit_complex_property(&mut self, property: &ComplexProperty) -> T;
    fn visit_primitive_collection_property(&mut self, property: &PrimitiveMultiValueProperty)
    -> T;
    fn visit_complex_collection_property(&mut self, property: &ComplexMultiValueProperty) -> T;
    fn visit_named_stream(&mut self, stream: &NamedStreamInstance) -> T;
    fn visit_navigation_property(&mut self, navigation: &NavigationPropertyInstance) -> T;
    fn visit_deferred_link(&mut self, link: &DeferredLink) -> T;
    fn visit_expanded_link(&mut self, link: &ExpandedLink) -> T;
    fn visit_service_operation(&mut self, operation: &ServiceOperationDescriptor) -> T;
    fn visit_link_collection(&mut self, links: &LinkCollection) -> T;
    fn visit_error(&mut self, error: &ODataErrorPayload) -> T;
    fn visit_inner_error(&mut self, inner: &ODataInnerError) -> T;
    fn visit_service_document(&mut self, document: &ServiceDocumentInstance) -> T;
    fn visit_workspace(&mut self, workspace: &WorkspaceInstance) -> T;
    fn visit_entity_set_info(&mut self, info: &ResourceCollectionInstance) -> T;
    fn visit_batch_request(&mut self, batch: &BatchRequestPayload) -> T;
    fn visit_batch_response(&mut self, batch: &BatchResponsePayload) -> T;
}

impl PayloadElement {
    /// Dispatch to the handler for this element's variant.
    pub fn accept<T, V: PayloadElementVisitor<T> + ?Sized>(&self, visitor: &mut V) -> T {
        match self {
            PayloadElement::EntitySet(n) => visitor.visit_entity_set(n),
            PayloadElement::Entity(n) => visitor.visit_entity(n),
            PayloadElement::ComplexValue(n) => visitor.visit_complex_value(n),
            PayloadElement::PrimitiveValue(n) => visitor.visit_primitive_value(n),
            PayloadElement::PrimitiveCollection(n) => visitor.visit_primitive_collection(n),
            PayloadElement::ComplexCollection(n) => visitor.visit_complex_collection(n),
            PayloadElement::PrimitiveProperty(n) => visitor.visit_primitive_property(n),
            PayloadElement::ComplexProperty(n) => visitor.visit_complex_property(n),
            PayloadElement::PrimitiveCollectionProperty(n) => {
                visitor.visit_primitive_collection_property(n)
            }
            PayloadElement::ComplexCollectionProperty(n) => {
                visitor.visit_complex_collection_property(n)
            }
            PayloadElement::NamedStream(n) => visitor.visit_named_stream(n),
            PayloadElement::NavigationProperty(n) => visitor.visit_navigation_property(n),
            PayloadElement::DeferredLink(n) => visitor.visit_deferred_link(n),
            PayloadElement::ExpandedLink(n) => visitor.visit_expanded_link(n),
            PayloadElement::ServiceOperation(n) => visitor.visit_service_operation(n),
            PayloadElement::LinkCollection(n) => visitor.visit_link_collection(n),
            PayloadElement::Error(n) => visitor.visit_error(n),
            PayloadElement::InnerError(n) => visitor.visit_inner_error(n),
            PayloadElement::ServiceDocument(n) => visitor.visit_service_document(n),
            PayloadElement::Workspace(n) => visitor.visit_workspace(n),
            PayloadElement::EntitySetInfo(n) => visitor.visit_entity_set_info(n),
            PayloadElement::BatchRequest(n) => visitor.visit_batch_request(n),
            PayloadElement::BatchResponse(n) => visitor.visit_batch_response(n),
        }
    }

    /// One-line human readable description, used in failure messages.
    #[must_use]
    pub fn summary(&self) -> String {
        self.accept(&mut PayloadSummary)
    }
}

/// Produces a short description of a node without descending into it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadSummary;

fn or_untyped(type_name: Option<&String>) -> &str {
    type_name.map_or("<untyped>", String::as_str)
}

impl PayloadElementVisitor<String> for PayloadSummary {
    fn visit_entity_set(&mut self, set: &EntitySetInstance) -> String {
        format!("EntitySet[{} entities]", set.entities.len())
    }

    fn visit_entity(&mut self, entity: &EntityInstance) -> String {
        format!(
            "Entity({}, {} properties, {} links)",
            or_untyped(entity.type_name.as_ref()),
            entity.properties.len(),
            entity.navigation_properties.len()
        )
    }

    fn visit_complex_value(&mut self, value: &ComplexInstance) -> String {
        if value.is_null {
            return format!("Complex({}, null)", or_untyped(value.type_name.as_ref()));
        }
        format!(
            "Complex({}, {} properties)",
            or_untyped(value.type_name.as_ref()),
            value.properties.len()
        )
    }

    fn visit_primitive_value(&mut self, value: &PrimitiveValue) -> String {
        format!("Primitive({} {})", or_untyped(value.type_name.as_ref()), value.value)
    }

    fn visit_primitive_collection(&mut self, collection: &PrimitiveMultiValue) -> String {
        format!(
            "PrimitiveCollection({}, {} items)",
            or_untyped(collection.type_name.as_ref()),
            collection.items.len()
        )
    }

    fn visit_complex_collection(&mut self, collection: &ComplexMultiValue) -> String {
        format!(
            "ComplexCollection({}, {} items)",
            or_untyped(collection.type_name.as_ref()),
            collection.items.len()
        )
    }

    fn visit_primitive_property(&mut self, property: &PrimitiveProperty) -> String {
        format!("Property({} = {})", property.name, property.value.value)
    }

    fn visit_complex_property(&mut self, property: &ComplexProperty) -> String {
        format!("ComplexProperty({})", property.name)
    }

    fn visit_primitive_collection_property(
        &mut self,
        property: &PrimitiveMultiValueProperty,
    ) -> String {
        format!(
            "PrimitiveCollectionProperty({}, {} items)",
            property.name,
            property.value.items.len()
        )
    }

    fn visit_complex_collection_property(
        &mut self,
        property: &ComplexMultiValueProperty,
    ) -> String {
        format!(
            "ComplexCollectionProperty({}, {} items)",
            property.name,
            property.value.items.len()
        )
    }

    fn visit_named_stream(&mut self, stream: &NamedStreamInstance) -> String {
        match &stream.name {
            Some(name) => format!("NamedStream({name})"),
            None => "MediaResource".to_owned(),
        }
    }

    fn visit_navigation_property(&mut self, navigation: &NavigationPropertyInstance) -> String {
        let form = match navigation.value {
            NavigationValue::Deferred(_) => "deferred",
            NavigationValue::Expanded(_) => "expanded",
        };
        format!("Navigation({}, {form})", navigation.name)
    }

    fn visit_deferred_link(&mut self, link: &DeferredLink) -> String {
        format!("DeferredLink({})", link.url.as_deref().unwrap_or_default())
    }

    fn visit_expanded_link(&mut self, link: &ExpandedLink) -> String {
        match link.payload.as_deref() {
            Some(payload) => format!("ExpandedLink({})", payload.summary()),
            None => "ExpandedLink(null)".to_owned(),
        }
    }

    fn visit_service_operation(&mut self, operation: &ServiceOperationDescriptor) -> String {
        let kind = if operation.is_action {
            "Action"
        } else {
            "Function"
        };
        format!("{kind}({})", operation.metadata)
    }

    fn visit_link_collection(&mut self, links: &LinkCollection) -> String {
        format!("LinkCollection[{} links]", links.links.len())
    }

    fn visit_error(&mut self, error: &ODataErrorPayload) -> String {
        format!(
            "Error({}: {})",
            error.code.as_deref().unwrap_or_default(),
            error.message.as_deref().unwrap_or_default()
        )
    }

    fn visit_inner_error(&mut self, inner: &ODataInnerError) -> String {
        format!("InnerError(depth {})", inner.depth())
    }

    fn visit_service_document(&mut self, document: &ServiceDocumentInstance) -> String {
        format!("ServiceDocument[{} workspaces]", document.workspaces.len())
    }

    fn visit_workspace(&mut self, workspace: &WorkspaceInstance) -> String {
        format!("Workspace[{} collections]", workspace.collections.len())
    }

    fn visit_entity_set_info(&mut self, info: &ResourceCollectionInstance) -> String {
        format!("EntitySetInfo({})", info.href)
    }

    fn visit_batch_request(&mut self, batch: &BatchRequestPayload) -> String {
        format!("BatchRequest[{} parts]", batch.parts.len())
    }

    fn visit_batch_response(&mut self, batch: &BatchResponsePayload) -> String {
        format!("BatchResponse[{} parts]", batch.parts.len())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::PrimitiveProperty;

    #[test]
    fn test_summaries() {
        let entity: PayloadElement = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .into();
        assert_eq!(entity.summary(), "Entity(NS.Customer, 1 properties, 0 links)");

        let value: PayloadElement = PrimitiveValue::new(5_i32).into();
        assert_eq!(value.summary(), "Primitive(Edm.Int32 5)");

        let link: PayloadElement = ExpandedLink::new(None).into();
        assert_eq!(link.summary(), "ExpandedLink(null)");
    }

    #[test]
    fn test_custom_typed_visitor_counts_depth() {
        struct Depth;
        impl PayloadElementVisitor<usize> for Depth {
            fn visit_entity_set(&mut self, s: &EntitySetInstance) -> usize {
                1 + s
                    .entities
                    .iter()
                    .map(|e| self.visit_entity(e))
                    .max()
                    .unwrap_or(0)
            }
            fn visit_entity(&mut self, _: &EntityInstance) -> usize {
                1
            }
            fn visit_complex_value(&mut self, _: &ComplexInstance) -> usize {
                1
            }
            fn visit_primitive_value(&mut self, _: &PrimitiveValue) -> usize {
                1
            }
            fn visit_primitive_collection(&mut self, _: &PrimitiveMultiValue) -> usize {
                1
            }
            fn visit_complex_collection(&mut self, _: &ComplexMultiValue) -> usize {
                1
            }
            fn visit_primitive_property(&mut self, _: &PrimitiveProperty) -> usize {
                1
            }
            fn visit_complex_property(&mut self, _: &ComplexProperty) -> usize {
                1
            }
            fn visit_primitive_collection_property(
                &mut self,
                _: &PrimitiveMultiValueProperty,
            ) -> usize {
                1
            }
            fn visit_complex_collection_property(
                &mut self,
                _: &ComplexMultiValueProperty,
            ) -> usize {
                1
            }
            fn visit_named_stream(&mut self, _: &NamedStreamInstance) -> usize {
                1
            }
            fn visit_navigation_property(&mut self, _: &NavigationPropertyInstance) -> usize {
                1
            }
            fn visit_deferred_link(&mut self, _: &DeferredLink) -> usize {
                1
            }
            fn visit_expanded_link(&mut self, _: &ExpandedLink) -> usize {
                1
            }
            fn visit_service_operation(&mut self, _: &ServiceOperationDescriptor) -> usize {
                1
            }
            fn visit_link_collection(&mut self, _: &LinkCollection) -> usize {
                1
            }
            fn visit_error(&mut self, _: &ODataErrorPayload) -> usize {
                1
            }
            fn visit_inner_error(&mut self, e: &ODataInnerError) -> usize {
                e.depth()
            }
            fn visit_service_document(&mut self, _: &ServiceDocumentInstance) -> usize {
                1
            }
            fn visit_workspace(&mut self, _: &WorkspaceInstance) -> usize {
                1
            }
            fn visit_entity_set_info(&mut self, _: &ResourceCollectionInstance) -> usize {
                1
            }
            fn visit_batch_request(&mut self, _: &BatchRequestPayload) -> usize {
                1
            }
            fn visit_batch_response(&mut self, _: &BatchResponsePayload) -> usize {
                1
            }
        }

        let set: PayloadElement = EntitySetInstance::new()
            .with_entity(EntityInstance::new("NS.T"))
            .into();
        assert_eq!(set.accept(&mut Depth), 2);

        let empty: PayloadElement = EntitySetInstance::new().into();
        assert_eq!(empty.accept(&mut Depth), 1);
    }
}
