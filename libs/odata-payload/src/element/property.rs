use super::{ElementHeader, ElementType, NamedStreamInstance, PayloadNode};
use crate::value::ODataValue;

/// Type name of a collection of `item_type`, e.g. `Collection(Edm.String)`.
#[must_use]
pub fn collection_type_name(item_type: &str) -> String {
    format!("Collection({item_type})")
}

#[derive(Clone, Debug)]
pub struct PrimitiveValue {
    pub header: ElementHeader,
    pub type_name: Option<String>,
    pub value: ODataValue,
}

impl PrimitiveValue {
    /// Typed primitive; the type name is taken from the value.
    pub fn new(value: impl Into<ODataValue>) -> Self {
        let value = value.into();
        Self {
            header: ElementHeader::new(),
            type_name: value.edm_type_name().map(str::to_owned),
            value,
        }
    }

    /// Primitive without a type name, as read from a payload that carries none.
    pub fn untyped(value: impl Into<ODataValue>) -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: None,
            value: value.into(),
        }
    }

    pub fn null(type_name: impl Into<String>) -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: Some(type_name.into()),
            value: ODataValue::Null,
        }
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ComplexInstance {
    pub header: ElementHeader,
    pub type_name: Option<String>,
    pub is_null: bool,
    pub properties: Vec<PropertyInstance>,
}

impl ComplexInstance {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: Some(type_name.into()),
            is_null: false,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn untyped() -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: None,
            is_null: false,
            properties: Vec::new(),
        }
    }

    pub fn null(type_name: impl Into<String>) -> Self {
        Self {
            is_null: true,
            ..Self::new(type_name)
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<PropertyInstance>) -> Self {
        self.properties.push(property.into());
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyInstance> {
        self.properties.iter().find(|p| p.name() == Some(name))
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveProperty {
    pub header: ElementHeader,
    pub name: String,
    pub value: PrimitiveValue,
}

impl PrimitiveProperty {
    pub fn new(name: impl Into<String>, value: impl Into<ODataValue>) -> Self {
        Self::from_value(name, PrimitiveValue::new(value))
    }

    pub fn from_value(name: impl Into<String>, value: PrimitiveValue) -> Self {
        Self {
            header: ElementHeader::new(),
            name: name.into(),
            value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ComplexProperty {
    pub header: ElementHeader,
    pub name: String,
    pub value: ComplexInstance,
}

impl ComplexProperty {
    pub fn new(name: impl Into<String>, value: ComplexInstance) -> Self {
        Self {
            header: ElementHeader::new(),
            name: name.into(),
            value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveMultiValue {
    pub header: ElementHeader,
    pub type_name: Option<String>,
    pub is_null: bool,
    pub items: Vec<PrimitiveValue>,
}

impl PrimitiveMultiValue {
    /// Empty collection of `item_type` (an EDM primitive type name).
    pub fn new(item_type: &str) -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: Some(collection_type_name(item_type)),
            is_null: false,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn untyped() -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: None,
            is_null: false,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: PrimitiveValue) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = PrimitiveValue>) -> Self {
        self.items.extend(items);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ComplexMultiValue {
    pub header: ElementHeader,
    pub type_name: Option<String>,
    pub is_null: bool,
    pub items: Vec<ComplexInstance>,
}

impl ComplexMultiValue {
    /// Empty collection of complex type `item_type`.
    pub fn new(item_type: &str) -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: Some(collection_type_name(item_type)),
            is_null: false,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: ComplexInstance) -> Self {
        self.items.push(item);
        self
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveMultiValueProperty {
    pub header: ElementHeader,
    pub name: String,
    pub value: PrimitiveMultiValue,
}

impl PrimitiveMultiValueProperty {
    pub fn new(name: impl Into<String>, value: PrimitiveMultiValue) -> Self {
        Self {
            header: ElementHeader::new(),
            name: name.into(),
            value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ComplexMultiValueProperty {
    pub header: ElementHeader,
    pub name: String,
    pub value: ComplexMultiValue,
}

impl ComplexMultiValueProperty {
    pub fn new(name: impl Into<String>, value: ComplexMultiValue) -> Self {
        Self {
            header: ElementHeader::new(),
            name: name.into(),
            value,
        }
    }
}

/// A structural property of an entity or complex value.
///
/// Navigation properties are kept apart on [`super::EntityInstance`] so that
/// their payload positions can be tracked.
#[derive(Clone, Debug)]
pub enum PropertyInstance {
    Primitive(PrimitiveProperty),
    Complex(ComplexProperty),
    PrimitiveCollection(PrimitiveMultiValueProperty),
    ComplexCollection(ComplexMultiValueProperty),
    NamedStream(NamedStreamInstance),
}

impl PropertyInstance {
    /// Property name; `None` only for an unnamed stream (a media resource).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            PropertyInstance::Primitive(p) => Some(&p.name),
            PropertyInstance::Complex(p) => Some(&p.name),
            PropertyInstance::PrimitiveCollection(p) => Some(&p.name),
            PropertyInstance::ComplexCollection(p) => Some(&p.name),
            PropertyInstance::NamedStream(s) => s.name.as_deref(),
        }
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            PropertyInstance::Primitive(p) => p.element_type(),
            PropertyInstance::Complex(p) => p.element_type(),
            PropertyInstance::PrimitiveCollection(p) => p.element_type(),
            PropertyInstance::ComplexCollection(p) => p.element_type(),
            PropertyInstance::NamedStream(s) => s.element_type(),
        }
    }

    #[must_use]
    pub fn header(&self) -> &ElementHeader {
        match self {
            PropertyInstance::Primitive(p) => p.header(),
            PropertyInstance::Complex(p) => p.header(),
            PropertyInstance::PrimitiveCollection(p) => p.header(),
            PropertyInstance::ComplexCollection(p) => p.header(),
            PropertyInstance::NamedStream(s) => s.header(),
        }
    }
}

impl From<PrimitiveProperty> for PropertyInstance {
    fn from(p: PrimitiveProperty) -> Self {
        PropertyInstance::Primitive(p)
    }
}

impl From<ComplexProperty> for PropertyInstance {
    fn from(p: ComplexProperty) -> Self {
        PropertyInstance::Complex(p)
    }
}

impl From<PrimitiveMultiValueProperty> for PropertyInstance {
    fn from(p: PrimitiveMultiValueProperty) -> Self {
        PropertyInstance::PrimitiveCollection(p)
    }
}

impl From<ComplexMultiValueProperty> for PropertyInstance {
    fn from(p: ComplexMultiValueProperty) -> Self {
        PropertyInstance::ComplexCollection(p)
    }
}

impl From<NamedStreamInstance> for PropertyInstance {
    fn from(s: NamedStreamInstance) -> Self {
        PropertyInstance::NamedStream(s)
    }
}
