use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::ODataWriter;
use super::object_model::{
    ODataEntityReferenceLinks, ODataEntry, ODataError, ODataFeed, ODataInnerError,
    ODataNavigationLink, ODataProperty, ODataPropertyValue, ODataServiceDocument,
    ODataStreamReference,
};
use crate::error::{Error, Result};
use crate::value::ODataValue;

enum Frame {
    Feed {
        count: Option<i64>,
        next_page_link: Option<String>,
        entries: Vec<Value>,
    },
    Entry(Map<String, Value>),
    Link {
        link: ODataNavigationLink,
        content: Option<Value>,
    },
}

/// Reference [`ODataWriter`] that builds a JSON message in memory.
///
/// Int64 and Decimal values are written as strings and binary values as
/// base64. Primitive values whose type JSON cannot carry get an
/// `@odata.type` annotation.
#[derive(Default)]
pub struct JsonPayloadWriter {
    stack: Vec<Frame>,
    output: Option<Value>,
}

fn misuse(message: impl Into<String>) -> Error {
    Error::Writer(message.into())
}

impl JsonPayloadWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished message.
    ///
    /// # Errors
    /// Returns [`Error::Writer`] when a scope is still open or nothing was written.
    pub fn finish(self) -> Result<Value> {
        if !self.stack.is_empty() {
            return Err(misuse(format!(
                "{} scope(s) still open at end of message",
                self.stack.len()
            )));
        }
        let output = self
            .output
            .ok_or_else(|| misuse("nothing was written"))?;
        debug!("json message finished");
        Ok(output)
    }

    fn set_root(&mut self, value: Value) -> Result<()> {
        if self.output.is_some() {
            return Err(misuse("message already has a root"));
        }
        self.output = Some(value);
        Ok(())
    }

    fn at_root(&self) -> bool {
        self.stack.is_empty() && self.output.is_none()
    }

    /// Hand a finished feed or entry to the enclosing scope.
    fn place(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None => self.set_root(value),
            Some(Frame::Feed { entries, .. }) => {
                entries.push(value);
                Ok(())
            }
            Some(Frame::Link { content, link }) => {
                if content.is_some() {
                    return Err(misuse(format!(
                        "navigation link '{}' already has content",
                        link.name
                    )));
                }
                *content = Some(value);
                Ok(())
            }
            Some(Frame::Entry(_)) => {
                Err(misuse("an entry cannot directly contain a feed or entry"))
            }
        }
    }
}

impl ODataWriter for JsonPayloadWriter {
    fn write_start_feed(&mut self, feed: &ODataFeed) -> Result<()> {
        let allowed = self.at_root() || matches!(self.stack.last(), Some(Frame::Link { .. }));
        if !allowed {
            return Err(misuse("a feed must be the root or the content of a navigation link"));
        }
        self.stack.push(Frame::Feed {
            count: feed.count,
            next_page_link: feed.next_page_link.clone(),
            entries: Vec::new(),
        });
        Ok(())
    }

    fn write_start_entry(&mut self, entry: &ODataEntry) -> Result<()> {
        let allowed = self.at_root()
            || matches!(
                self.stack.last(),
                Some(Frame::Feed { .. } | Frame::Link { .. })
            );
        if !allowed {
            return Err(misuse("an entry must be the root, in a feed, or in a navigation link"));
        }
        self.stack.push(Frame::Entry(entry_metadata(entry)));
        Ok(())
    }

    fn write_null_entry(&mut self) -> Result<()> {
        if !matches!(self.stack.last(), Some(Frame::Link { .. })) {
            return Err(misuse("a null entry is only valid inside a navigation link"));
        }
        self.place(Value::Null)
    }

    fn write_property(&mut self, property: &ODataProperty) -> Result<()> {
        if let Some(Frame::Entry(object)) = self.stack.last_mut() {
            insert_property(object, property);
            return Ok(());
        }
        if self.at_root() {
            let mut object = Map::new();
            insert_property(&mut object, property);
            return self.set_root(Value::Object(object));
        }
        Err(misuse(format!(
            "property '{}' must be written in an entry or as the root",
            property.name
        )))
    }

    fn write_start_navigation_link(&mut self, link: &ODataNavigationLink) -> Result<()> {
        if !matches!(self.stack.last(), Some(Frame::Entry(_))) {
            return Err(misuse(format!(
                "navigation link '{}' must be written in an entry",
                link.name
            )));
        }
        self.stack.push(Frame::Link {
            link: link.clone(),
            content: None,
        });
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| misuse("write_end without an open scope"))?;
        match frame {
            Frame::Feed {
                count,
                next_page_link,
                entries,
            } => {
                if matches!(self.stack.last(), Some(Frame::Link { .. })) {
                    return self.place(Value::Array(entries));
                }
                let mut object = Map::new();
                if let Some(count) = count {
                    object.insert("odata.count".into(), Value::String(count.to_string()));
                }
                object.insert("value".into(), Value::Array(entries));
                if let Some(next) = next_page_link {
                    object.insert("odata.nextLink".into(), Value::String(next));
                }
                self.place(Value::Object(object))
            }
            Frame::Entry(object) => self.place(Value::Object(object)),
            Frame::Link { link, content } => {
                let Some(Frame::Entry(object)) = self.stack.last_mut() else {
                    return Err(misuse("navigation link closed outside an entry"));
                };
                if let Some(url) = link.association_link_url {
                    object.insert(
                        format!("{}@odata.associationLinkUrl", link.name),
                        Value::String(url),
                    );
                }
                match content {
                    Some(content) => {
                        object.insert(link.name, content);
                    }
                    None => {
                        if let Some(url) = link.url {
                            object.insert(
                                format!("{}@odata.navigationLinkUrl", link.name),
                                Value::String(url),
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn write_value(&mut self, value: &ODataPropertyValue) -> Result<()> {
        if !self.at_root() {
            return Err(misuse("a value must be the root of the message"));
        }
        let mut object = Map::new();
        if let Some(type_name) = value_type_name(value) {
            object.insert("odata.type".into(), Value::String(type_name));
        }
        object.insert("value".into(), property_value_json(value));
        self.set_root(Value::Object(object))
    }

    fn write_error(&mut self, error: &ODataError, include_debug_information: bool) -> Result<()> {
        if !self.at_root() {
            return Err(misuse("an error must be the root of the message"));
        }
        let mut body = Map::new();
        body.insert(
            "code".into(),
            Value::String(error.error_code.clone().unwrap_or_default()),
        );
        body.insert(
            "message".into(),
            json!({
                "lang": "en-US",
                "value": error.message.clone().unwrap_or_default(),
            }),
        );
        if let Some(inner) = error.inner_error.as_ref().filter(|_| include_debug_information) {
            body.insert("innererror".into(), inner_error_json(inner));
        }
        self.set_root(json!({ "odata.error": body }))
    }

    fn write_service_document(&mut self, document: &ODataServiceDocument) -> Result<()> {
        if !self.at_root() {
            return Err(misuse("a service document must be the root of the message"));
        }
        let sets: Vec<Value> = document
            .entity_sets
            .iter()
            .map(|set| {
                let mut object = Map::new();
                object.insert(
                    "name".into(),
                    Value::String(set.name.clone().unwrap_or_else(|| set.url.clone())),
                );
                if let Some(title) = &set.title {
                    object.insert("title".into(), Value::String(title.clone()));
                }
                object.insert("url".into(), Value::String(set.url.clone()));
                Value::Object(object)
            })
            .collect();
        self.set_root(json!({ "value": sets }))
    }

    fn write_entity_reference_links(&mut self, links: &ODataEntityReferenceLinks) -> Result<()> {
        if !self.at_root() {
            return Err(misuse("entity reference links must be the root of the message"));
        }
        let mut object = Map::new();
        if let Some(count) = links.count {
            object.insert("odata.count".into(), Value::String(count.to_string()));
        }
        let urls = links.links.iter().map(|url| json!({ "url": url })).collect();
        object.insert("value".into(), Value::Array(urls));
        if let Some(next) = &links.next_page_link {
            object.insert("odata.nextLink".into(), Value::String(next.clone()));
        }
        self.set_root(Value::Object(object))
    }
}

fn insert_opt(object: &mut Map<String, Value>, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        object.insert(key.to_owned(), Value::String(value.clone()));
    }
}

fn entry_metadata(entry: &ODataEntry) -> Map<String, Value> {
    let mut object = Map::new();
    insert_opt(&mut object, "odata.type", entry.type_name.as_ref());
    insert_opt(&mut object, "odata.id", entry.id.as_ref());
    insert_opt(&mut object, "odata.etag", entry.etag.as_ref());
    insert_opt(&mut object, "odata.editLink", entry.edit_link.as_ref());
    insert_opt(&mut object, "odata.readLink", entry.read_link.as_ref());
    if let Some(media) = &entry.media_resource {
        insert_stream(&mut object, "odata.", media);
    }
    for operation in entry.actions.iter().chain(&entry.functions) {
        let fragment = operation.metadata.rsplit('#').next().unwrap_or_default();
        let mut body = Map::new();
        insert_opt(&mut body, "title", operation.title.as_ref());
        insert_opt(&mut body, "target", operation.target.as_ref());
        object.insert(format!("#{fragment}"), Value::Object(body));
    }
    object
}

fn insert_stream(object: &mut Map<String, Value>, prefix: &str, stream: &ODataStreamReference) {
    insert_opt(object, &format!("{prefix}mediaEditLink"), stream.edit_link.as_ref());
    insert_opt(object, &format!("{prefix}mediaReadLink"), stream.read_link.as_ref());
    insert_opt(object, &format!("{prefix}mediaContentType"), stream.content_type.as_ref());
    insert_opt(object, &format!("{prefix}mediaEtag"), stream.etag.as_ref());
}

fn insert_property(object: &mut Map<String, Value>, property: &ODataProperty) {
    match &property.value {
        ODataPropertyValue::Stream(stream) => {
            insert_stream(object, &format!("{}@odata.", property.name), stream);
        }
        ODataPropertyValue::Primitive { type_name, value } => {
            if needs_type_annotation(value) {
                let declared = type_name.as_deref().or_else(|| value.edm_type_name());
                if let Some(declared) = declared {
                    object.insert(
                        format!("{}@odata.type", property.name),
                        Value::String(declared.to_owned()),
                    );
                }
            }
            object.insert(property.name.clone(), primitive_json(value));
        }
        other => {
            object.insert(property.name.clone(), property_value_json(other));
        }
    }
}

fn value_type_name(value: &ODataPropertyValue) -> Option<String> {
    match value {
        ODataPropertyValue::Primitive { type_name, value } => type_name
            .clone()
            .or_else(|| value.edm_type_name().map(str::to_owned)),
        ODataPropertyValue::Complex(complex) => complex.type_name.clone(),
        ODataPropertyValue::Collection(collection) => collection.type_name.clone(),
        ODataPropertyValue::Null { type_name } => type_name.clone(),
        ODataPropertyValue::Stream(_) => None,
    }
}

fn property_value_json(value: &ODataPropertyValue) -> Value {
    match value {
        ODataPropertyValue::Primitive { value, .. } => primitive_json(value),
        ODataPropertyValue::Complex(complex) => {
            let mut object = Map::new();
            insert_opt(&mut object, "odata.type", complex.type_name.as_ref());
            for property in &complex.properties {
                insert_property(&mut object, property);
            }
            Value::Object(object)
        }
        ODataPropertyValue::Collection(collection) => {
            Value::Array(collection.items.iter().map(property_value_json).collect())
        }
        ODataPropertyValue::Stream(stream) => {
            let mut object = Map::new();
            insert_stream(&mut object, "odata.", stream);
            Value::Object(object)
        }
        ODataPropertyValue::Null { .. } => Value::Null,
    }
}

/// Types JSON has no native representation for.
fn needs_type_annotation(value: &ODataValue) -> bool {
    !matches!(
        value,
        ODataValue::Null
            | ODataValue::Boolean(_)
            | ODataValue::Int32(_)
            | ODataValue::Double(_)
            | ODataValue::String(_)
    )
}

fn float_json(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or_else(
        || {
            let special = if value.is_nan() {
                "NaN"
            } else if value > 0.0 {
                "INF"
            } else {
                "-INF"
            };
            Value::String(special.to_owned())
        },
        Value::Number,
    )
}

fn primitive_json(value: &ODataValue) -> Value {
    match value {
        ODataValue::Null => Value::Null,
        ODataValue::Boolean(v) => Value::Bool(*v),
        ODataValue::Byte(v) => json!(v),
        ODataValue::Int16(v) => json!(v),
        ODataValue::Int32(v) => json!(v),
        ODataValue::Int64(v) => Value::String(v.to_string()),
        ODataValue::Single(v) => float_json(f64::from(*v)),
        ODataValue::Double(v) => float_json(*v),
        ODataValue::Decimal(v) => Value::String(v.to_string()),
        ODataValue::Guid(v) => Value::String(v.to_string()),
        ODataValue::DateTimeOffset(v) => Value::String(v.to_rfc3339()),
        ODataValue::Date(v) => Value::String(v.to_string()),
        ODataValue::TimeOfDay(v) => Value::String(v.to_string()),
        ODataValue::String(v) => Value::String(v.clone()),
        ODataValue::Binary(v) => Value::String(STANDARD.encode(v)),
    }
}

fn inner_error_json(inner: &ODataInnerError) -> Value {
    let mut object = Map::new();
    object.insert(
        "message".into(),
        Value::String(inner.message.clone().unwrap_or_default()),
    );
    object.insert(
        "type".into(),
        Value::String(inner.type_name.clone().unwrap_or_default()),
    );
    object.insert(
        "stacktrace".into(),
        Value::String(inner.stack_trace.clone().unwrap_or_default()),
    );
    if let Some(nested) = &inner.inner_error {
        object.insert("internalexception".into(), inner_error_json(nested));
    }
    Value::Object(object)
}
