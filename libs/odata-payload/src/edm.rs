//! A minimal EDM model and the visitor that types payloads against it.

use std::collections::HashSet;

use tracing::warn;

use crate::annotation::Annotation;
use crate::annotation_table::AnnotationTable;
use crate::element::{
    ComplexInstance, ComplexMultiValueProperty, ComplexProperty, EntityInstance,
    EntitySetInstance, NavigationPropertyInstance, NodeId, PayloadElement,
    PrimitiveMultiValueProperty, PrimitiveProperty, collection_type_name,
};
use crate::error::Result;
use crate::visit_mut::{
    PayloadVisitorMut, walk_complex_value_mut, walk_entity_mut, walk_navigation_property_mut,
};

/// Declared type of a structural property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdmTypeRef {
    /// Full primitive type name, e.g. `Edm.Int32`
    Primitive(String),
    /// Full name of a complex type
    Complex(String),
    Collection(Box<EdmTypeRef>),
}

impl EdmTypeRef {
    pub fn primitive(name: impl Into<String>) -> Self {
        EdmTypeRef::Primitive(name.into())
    }

    pub fn complex(name: impl Into<String>) -> Self {
        EdmTypeRef::Complex(name.into())
    }

    #[must_use]
    pub fn collection(item: EdmTypeRef) -> Self {
        EdmTypeRef::Collection(Box::new(item))
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            EdmTypeRef::Primitive(name) | EdmTypeRef::Complex(name) => name.clone(),
            EdmTypeRef::Collection(item) => collection_type_name(&item.full_name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmProperty {
    pub name: String,
    pub type_ref: EdmTypeRef,
    pub nullable: bool,
}

impl EdmProperty {
    pub fn new(name: impl Into<String>, type_ref: EdmTypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            nullable: true,
        }
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmNavigationProperty {
    pub name: String,
    /// Full name of the target entity type
    pub target_type: String,
    pub is_collection: bool,
}

impl EdmNavigationProperty {
    pub fn single(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            is_collection: false,
        }
    }

    pub fn many(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            is_collection: true,
            ..Self::single(name, target_type)
        }
    }
}

/// An entity or complex type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdmStructuredType {
    /// Full (namespace-qualified) name
    pub name: String,
    pub base_type: Option<String>,
    pub key: Vec<String>,
    pub has_stream: bool,
    pub properties: Vec<EdmProperty>,
    pub navigation_properties: Vec<EdmNavigationProperty>,
}

impl EdmStructuredType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    #[must_use]
    pub fn with_key(mut self, property: impl Into<String>) -> Self {
        self.key.push(property.into());
        self
    }

    #[must_use]
    pub fn with_stream(mut self) -> Self {
        self.has_stream = true;
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: EdmProperty) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_navigation_property(mut self, navigation: EdmNavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmEntitySet {
    pub name: String,
    pub entity_type: String,
}

impl EdmEntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdmModel {
    pub namespace: String,
    pub entity_types: Vec<EdmStructuredType>,
    pub complex_types: Vec<EdmStructuredType>,
    pub entity_sets: Vec<EdmEntitySet>,
}

impl EdmModel {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Namespace-qualify a simple name.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{name}", self.namespace)
    }

    #[must_use]
    pub fn with_entity_type(mut self, entity_type: EdmStructuredType) -> Self {
        self.entity_types.push(entity_type);
        self
    }

    #[must_use]
    pub fn with_complex_type(mut self, complex_type: EdmStructuredType) -> Self {
        self.complex_types.push(complex_type);
        self
    }

    #[must_use]
    pub fn with_entity_set(mut self, entity_set: EdmEntitySet) -> Self {
        self.entity_sets.push(entity_set);
        self
    }

    #[must_use]
    pub fn entity_type(&self, name: &str) -> Option<&EdmStructuredType> {
        self.entity_types.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn complex_type(&self, name: &str) -> Option<&EdmStructuredType> {
        self.complex_types.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&EdmEntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    /// Structural property of `owner`, searching base types.
    #[must_use]
    pub fn find_property<'m>(
        &'m self,
        owner: &'m EdmStructuredType,
        name: &str,
    ) -> Option<(&'m EdmStructuredType, &'m EdmProperty)> {
        self.type_chain(owner)
            .into_iter()
            .find_map(|t| t.properties.iter().find(|p| p.name == name).map(|p| (t, p)))
    }

    /// Navigation property of `owner`, searching base types.
    #[must_use]
    pub fn find_navigation<'m>(
        &'m self,
        owner: &'m EdmStructuredType,
        name: &str,
    ) -> Option<&'m EdmNavigationProperty> {
        self.type_chain(owner)
            .into_iter()
            .find_map(|t| t.navigation_properties.iter().find(|n| n.name == name))
    }

    /// `owner` followed by its base types, stopping at an unknown or repeated name.
    fn type_chain<'m>(&'m self, owner: &'m EdmStructuredType) -> Vec<&'m EdmStructuredType> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(owner);
        while let Some(t) = current {
            if !seen.insert(t.name.as_str()) {
                break;
            }
            chain.push(t);
            current = t
                .base_type
                .as_deref()
                .and_then(|base| self.entity_type(base).or_else(|| self.complex_type(base)));
        }
        chain
    }
}

/// Side-table record linking a property node to its model declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdmPropertyBinding {
    pub declaring_type: String,
    pub property: EdmProperty,
}

/// Fills in type names from an [`EdmModel`] and records property bindings.
///
/// Existing type names are kept. Nodes whose type the model does not know
/// are left untouched and reported with a warning.
pub struct TypeAnnotator<'a> {
    model: &'a EdmModel,
    table: &'a AnnotationTable,
    scope: Vec<Option<&'a EdmStructuredType>>,
    /// Type expected for the next entity or complex value, from its context
    hint: Option<String>,
    unresolved: usize,
}

impl<'a> TypeAnnotator<'a> {
    #[must_use]
    pub fn new(model: &'a EdmModel, table: &'a AnnotationTable) -> Self {
        Self {
            model,
            table,
            scope: Vec::new(),
            hint: None,
            unresolved: 0,
        }
    }

    /// Annotate `element` in place, returning how many names went unresolved.
    ///
    /// # Errors
    /// Propagates visitor errors.
    pub fn annotate(
        model: &'a EdmModel,
        table: &'a AnnotationTable,
        element: &mut PayloadElement,
    ) -> Result<usize> {
        let mut annotator = Self::new(model, table);
        annotator.visit_mut(element)?;
        Ok(annotator.unresolved)
    }

    /// Start an entity-set or entity payload at a named entity set of the model.
    #[must_use]
    pub fn for_entity_set(mut self, entity_set: &str) -> Self {
        self.hint = self.model.entity_set(entity_set).map(|s| s.entity_type.clone());
        self
    }

    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    fn current(&self) -> Option<&'a EdmStructuredType> {
        self.scope.last().copied().flatten()
    }

    /// Look up `name` in the current type scope and bind `node` to it.
    fn resolve_property(&mut self, node: NodeId, name: &str) -> Option<&'a EdmProperty> {
        let owner = self.current()?;
        let Some((declaring, property)) = self.model.find_property(owner, name) else {
            warn!(owner = %owner.name, property = name, "property not found in model");
            self.unresolved += 1;
            return None;
        };
        self.table.set(
            node,
            EdmPropertyBinding {
                declaring_type: declaring.name.clone(),
                property: property.clone(),
            },
        );
        Some(property)
    }

    fn lookup(
        &mut self,
        explicit: Option<&String>,
        find: fn(&'a EdmModel, &str) -> Option<&'a EdmStructuredType>,
        what: &'static str,
    ) -> Option<&'a EdmStructuredType> {
        let hint = self.hint.take();
        let name = explicit.cloned().or(hint)?;
        let found = find(self.model, &name);
        if found.is_none() {
            warn!(type_name = %name, kind = what, "type not found in model");
            self.unresolved += 1;
        }
        found
    }
}

impl PayloadVisitorMut for TypeAnnotator<'_> {
    fn visit_entity_set_mut(&mut self, set: &mut EntitySetInstance) -> Result<()> {
        let hint = self.hint.take();
        self.visit_header_mut(&mut set.header)?;
        for entity in &mut set.entities {
            self.hint.clone_from(&hint);
            self.visit_entity_mut(entity)?;
        }
        self.hint = None;
        Ok(())
    }

    fn visit_entity_mut(&mut self, entity: &mut EntityInstance) -> Result<()> {
        let resolved = self.lookup(entity.type_name.as_ref(), EdmModel::entity_type, "entity");
        if let Some(entity_type) = resolved {
            entity.type_name.get_or_insert_with(|| entity_type.name.clone());
            entity
                .header
                .set_annotation(Annotation::EdmType(entity_type.name.clone()));
        }
        self.scope.push(resolved);
        let result = walk_entity_mut(self, entity);
        self.scope.pop();
        result
    }

    fn visit_complex_value_mut(&mut self, value: &mut ComplexInstance) -> Result<()> {
        let resolved = self.lookup(value.type_name.as_ref(), EdmModel::complex_type, "complex");
        if let Some(complex_type) = resolved {
            value.type_name.get_or_insert_with(|| complex_type.name.clone());
            value
                .header
                .set_annotation(Annotation::EdmType(complex_type.name.clone()));
        }
        self.scope.push(resolved);
        let result = walk_complex_value_mut(self, value);
        self.scope.pop();
        result
    }

    fn visit_primitive_property_mut(&mut self, property: &mut PrimitiveProperty) -> Result<()> {
        if let Some(declared) = self.resolve_property(property.header.id(), &property.name) {
            if let EdmTypeRef::Primitive(type_name) = &declared.type_ref {
                property.value.type_name.get_or_insert_with(|| type_name.clone());
            }
        }
        self.visit_header_mut(&mut property.header)?;
        self.visit_primitive_value_mut(&mut property.value)
    }

    fn visit_complex_property_mut(&mut self, property: &mut ComplexProperty) -> Result<()> {
        if let Some(declared) = self.resolve_property(property.header.id(), &property.name) {
            if let EdmTypeRef::Complex(type_name) = &declared.type_ref {
                self.hint = Some(type_name.clone());
            }
        }
        self.visit_header_mut(&mut property.header)?;
        self.visit_complex_value_mut(&mut property.value)
    }

    fn visit_primitive_collection_property_mut(
        &mut self,
        property: &mut PrimitiveMultiValueProperty,
    ) -> Result<()> {
        if let Some(declared) = self.resolve_property(property.header.id(), &property.name) {
            if let EdmTypeRef::Collection(item) = &declared.type_ref {
                if let EdmTypeRef::Primitive(item_type) = item.as_ref() {
                    let collection = &mut property.value;
                    collection
                        .type_name
                        .get_or_insert_with(|| collection_type_name(item_type));
                    for value in &mut collection.items {
                        value.type_name.get_or_insert_with(|| item_type.clone());
                    }
                }
            }
        }
        self.visit_header_mut(&mut property.header)?;
        self.visit_primitive_collection_mut(&mut property.value)
    }

    fn visit_complex_collection_property_mut(
        &mut self,
        property: &mut ComplexMultiValueProperty,
    ) -> Result<()> {
        let mut item_hint = None;
        if let Some(declared) = self.resolve_property(property.header.id(), &property.name) {
            if let EdmTypeRef::Collection(item) = &declared.type_ref {
                if let EdmTypeRef::Complex(item_type) = item.as_ref() {
                    property
                        .value
                        .type_name
                        .get_or_insert_with(|| collection_type_name(item_type));
                    item_hint = Some(item_type.clone());
                }
            }
        }
        self.visit_header_mut(&mut property.header)?;
        self.visit_header_mut(&mut property.value.header)?;
        for item in &mut property.value.items {
            self.hint.clone_from(&item_hint);
            self.visit_complex_value_mut(item)?;
        }
        self.hint = None;
        Ok(())
    }

    fn visit_navigation_property_mut(
        &mut self,
        navigation: &mut NavigationPropertyInstance,
    ) -> Result<()> {
        let mut target = None;
        if let Some(owner) = self.current() {
            target = self.model.find_navigation(owner, &navigation.name);
            if target.is_none() {
                warn!(
                    owner = %owner.name,
                    navigation = %navigation.name,
                    "navigation property not found in model"
                );
                self.unresolved += 1;
            }
        }
        self.hint = target.map(|t| t.target_type.clone());
        let result = walk_navigation_property_mut(self, navigation);
        self.hint = None;
        result
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::{
        ComplexMultiValue, ExpandedLink, PayloadNode, PrimitiveMultiValue, PrimitiveValue,
        PropertyInstance,
    };
    use tracing_test::traced_test;

    fn model() -> EdmModel {
        let address = EdmStructuredType::new("NS.Address")
            .with_property(EdmProperty::new("City", EdmTypeRef::primitive("Edm.String")));
        let order = EdmStructuredType::new("NS.Order")
            .with_key("Id")
            .with_property(EdmProperty::new("Id", EdmTypeRef::primitive("Edm.Int32")).not_null());
        let customer = EdmStructuredType::new("NS.Customer")
            .with_key("Id")
            .with_property(EdmProperty::new("Id", EdmTypeRef::primitive("Edm.Int32")).not_null())
            .with_property(EdmProperty::new("Address", EdmTypeRef::complex("NS.Address")))
            .with_property(EdmProperty::new(
                "Tags",
                EdmTypeRef::collection(EdmTypeRef::primitive("Edm.String")),
            ))
            .with_property(EdmProperty::new(
                "Addresses",
                EdmTypeRef::collection(EdmTypeRef::complex("NS.Address")),
            ))
            .with_navigation_property(EdmNavigationProperty::many("Orders", "NS.Order"));
        EdmModel::new("NS")
            .with_complex_type(address)
            .with_entity_type(customer)
            .with_entity_type(order)
            .with_entity_set(EdmEntitySet::new("Customers", "NS.Customer"))
    }

    fn untyped_customer() -> EntityInstance {
        EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::from_value("Id", PrimitiveValue::untyped(1_i32)))
            .with_property(ComplexProperty::new(
                "Address",
                ComplexInstance::untyped().with_property(PrimitiveProperty::from_value(
                    "City",
                    PrimitiveValue::untyped("Oslo"),
                )),
            ))
            .with_property(PrimitiveMultiValueProperty::new(
                "Tags",
                PrimitiveMultiValue::untyped().with_item(PrimitiveValue::untyped("vip")),
            ))
            .with_property(ComplexMultiValueProperty::new(
                "Addresses",
                ComplexMultiValue {
                    type_name: None,
                    ..ComplexMultiValue::new("NS.Address")
                }
                .with_item(ComplexInstance::untyped()),
            ))
            .with_navigation_property(NavigationPropertyInstance::expanded(
                "Orders",
                ExpandedLink::new(Some(
                    EntitySetInstance::new()
                        .with_entity(EntityInstance::untyped().with_property(
                            PrimitiveProperty::from_value("Id", PrimitiveValue::untyped(9_i32)),
                        ))
                        .into(),
                )),
            ))
    }

    #[test]
    fn test_fills_missing_type_names() {
        let table = AnnotationTable::new();
        let mut element: PayloadElement = untyped_customer().into();
        let unresolved = TypeAnnotator::annotate(&model(), &table, &mut element).unwrap();
        assert_eq!(unresolved, 0);

        let entity = element.as_entity().unwrap();
        assert_eq!(
            entity.header.annotation(crate::annotation::AnnotationKind::EdmType),
            Some(&Annotation::EdmType("NS.Customer".into()))
        );

        let PropertyInstance::Primitive(id) = &entity.properties[0] else {
            panic!("expected primitive");
        };
        assert_eq!(id.value.type_name.as_deref(), Some("Edm.Int32"));

        let PropertyInstance::Complex(address) = &entity.properties[1] else {
            panic!("expected complex");
        };
        assert_eq!(address.value.type_name.as_deref(), Some("NS.Address"));
        let PropertyInstance::Primitive(city) = &address.value.properties[0] else {
            panic!("expected primitive");
        };
        assert_eq!(city.value.type_name.as_deref(), Some("Edm.String"));

        let PropertyInstance::PrimitiveCollection(tags) = &entity.properties[2] else {
            panic!("expected collection");
        };
        assert_eq!(tags.value.type_name.as_deref(), Some("Collection(Edm.String)"));
        assert_eq!(tags.value.items[0].type_name.as_deref(), Some("Edm.String"));

        let PropertyInstance::ComplexCollection(addresses) = &entity.properties[3] else {
            panic!("expected complex collection");
        };
        assert_eq!(
            addresses.value.type_name.as_deref(),
            Some("Collection(NS.Address)")
        );
        assert_eq!(addresses.value.items[0].type_name.as_deref(), Some("NS.Address"));
    }

    #[test]
    fn test_expanded_entities_take_navigation_target() {
        let table = AnnotationTable::new();
        let mut element: PayloadElement = untyped_customer().into();
        TypeAnnotator::annotate(&model(), &table, &mut element).unwrap();

        let entity = element.as_entity().unwrap();
        let crate::element::NavigationValue::Expanded(link) = &entity.navigation_properties[0].value
        else {
            panic!("expected expanded link");
        };
        let orders = link.payload.as_deref().and_then(PayloadElement::as_entity_set).unwrap();
        assert_eq!(orders.entities[0].type_name.as_deref(), Some("NS.Order"));
    }

    #[test]
    fn test_records_property_bindings() {
        let table = AnnotationTable::new();
        let mut element: PayloadElement = untyped_customer().into();
        TypeAnnotator::annotate(&model(), &table, &mut element).unwrap();

        let id_node = element.as_entity().unwrap().properties[0].header().id();
        let binding = table.get::<EdmPropertyBinding>(id_node).unwrap();
        assert_eq!(binding.declaring_type, "NS.Customer");
        assert!(!binding.property.nullable);
    }

    #[test]
    fn test_entity_set_hint_types_untyped_entities() {
        let table = AnnotationTable::new();
        let model = model();
        let mut element: PayloadElement = EntitySetInstance::new()
            .with_entity(EntityInstance::untyped())
            .into();
        TypeAnnotator::new(&model, &table)
            .for_entity_set("Customers")
            .visit_mut(&mut element)
            .unwrap();
        let set = element.as_entity_set().unwrap();
        assert_eq!(set.entities[0].type_name.as_deref(), Some("NS.Customer"));
    }

    #[traced_test]
    #[test]
    fn test_unknown_type_is_reported() {
        let table = AnnotationTable::new();
        let mut element: PayloadElement = EntityInstance::new("NS.Missing")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .into();
        let unresolved = TypeAnnotator::annotate(&model(), &table, &mut element).unwrap();
        assert_eq!(unresolved, 1);
        assert!(element.annotations().is_empty());
        assert!(logs_contain("type not found in model"));
    }

    #[test]
    fn test_base_type_properties_resolve() {
        let model = EdmModel::new("NS")
            .with_entity_type(
                EdmStructuredType::new("NS.Person")
                    .with_property(EdmProperty::new("Name", EdmTypeRef::primitive("Edm.String"))),
            )
            .with_entity_type(EdmStructuredType::new("NS.Employee").with_base_type("NS.Person"));
        let employee = model.entity_type("NS.Employee").unwrap();
        let (declaring, property) = model.find_property(employee, "Name").unwrap();
        assert_eq!(declaring.name, "NS.Person");
        assert_eq!(property.type_ref.full_name(), "Edm.String");
    }
}
