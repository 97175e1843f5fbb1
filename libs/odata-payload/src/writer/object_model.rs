//! Message-level object model handed to an [`super::ODataWriter`].
//!
//! These types mirror what a message writer consumes: they carry only the
//! information that reaches the wire, not node identity or annotations.

use crate::value::ODataValue;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataFeed {
    pub id: Option<String>,
    pub count: Option<i64>,
    pub next_page_link: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataStreamReference {
    pub content_type: Option<String>,
    pub edit_link: Option<String>,
    pub read_link: Option<String>,
    pub etag: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataOperation {
    pub metadata: String,
    pub target: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataEntry {
    pub type_name: Option<String>,
    pub id: Option<String>,
    pub etag: Option<String>,
    pub edit_link: Option<String>,
    pub read_link: Option<String>,
    pub media_resource: Option<ODataStreamReference>,
    pub actions: Vec<ODataOperation>,
    pub functions: Vec<ODataOperation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ODataProperty {
    pub name: String,
    pub value: ODataPropertyValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ODataPropertyValue {
    Primitive {
        type_name: Option<String>,
        value: ODataValue,
    },
    Complex(ODataComplexValue),
    Collection(ODataCollectionValue),
    Stream(ODataStreamReference),
    /// A null complex value or null collection
    Null { type_name: Option<String> },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataComplexValue {
    pub type_name: Option<String>,
    pub properties: Vec<ODataProperty>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataCollectionValue {
    pub type_name: Option<String>,
    pub items: Vec<ODataPropertyValue>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataNavigationLink {
    pub name: String,
    pub url: Option<String>,
    pub association_link_url: Option<String>,
    /// `None` when unknown, as for a deferred link
    pub is_collection: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataInnerError {
    pub message: Option<String>,
    pub type_name: Option<String>,
    pub stack_trace: Option<String>,
    pub inner_error: Option<Box<ODataInnerError>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataError {
    pub error_code: Option<String>,
    pub message: Option<String>,
    pub inner_error: Option<ODataInnerError>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataEntitySetInfo {
    pub url: String,
    pub name: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataServiceDocument {
    pub entity_sets: Vec<ODataEntitySetInfo>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataEntityReferenceLinks {
    pub count: Option<i64>,
    pub next_page_link: Option<String>,
    pub links: Vec<String>,
}
