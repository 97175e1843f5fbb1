#![allow(clippy::unwrap_used, clippy::expect_used)]

use odata_payload::writer::{JsonPayloadWriter, PayloadElementODataWriter};
use odata_payload::{
    EntityInstance, EntitySetInstance, Error, ExpandedLink, LinkCollection,
    NavigationPropertyInstance, ODataErrorPayload, ODataInnerError, PayloadElement,
    PrimitiveProperty, PrimitiveValue,
};
use serde_json::json;

fn write(element: &PayloadElement) -> serde_json::Value {
    let mut json = JsonPayloadWriter::new();
    PayloadElementODataWriter::write(element, &mut json).unwrap();
    json.finish().unwrap()
}

#[test]
fn feed_keeps_member_interleaving() {
    let mut entity = EntityInstance::new("NS.Customer").with_id("Customers(1)");
    entity.push_property(PrimitiveProperty::new("Id", 1_i32));
    entity.push_navigation_property(NavigationPropertyInstance::deferred(
        "Orders",
        "Customers(1)/Orders",
    ));
    entity.push_property(PrimitiveProperty::new("Name", "Ann"));
    entity.push_navigation_property(NavigationPropertyInstance::expanded(
        "BestFriend",
        ExpandedLink::new(None),
    ));

    let feed: PayloadElement = EntitySetInstance::new()
        .with_entity(entity)
        .with_inline_count(1)
        .into();

    let value = write(&feed);
    assert_eq!(
        value,
        json!({
            "odata.count": "1",
            "value": [{
                "odata.type": "NS.Customer",
                "odata.id": "Customers(1)",
                "Id": 1,
                "Orders@odata.navigationLinkUrl": "Customers(1)/Orders",
                "Name": "Ann",
                "BestFriend": null,
            }],
        })
    );
}

#[test]
fn error_without_debug_information_omits_inner_error() {
    let error: PayloadElement = ODataErrorPayload::new()
        .with_code("404")
        .with_message("not found")
        .with_inner_error(ODataInnerError::new().with_message("stack"))
        .into();

    let mut json = JsonPayloadWriter::new();
    PayloadElementODataWriter::new(&mut json)
        .with_debug_information(false)
        .write_root(&error)
        .unwrap();
    assert_eq!(
        json.finish().unwrap(),
        json!({
            "odata.error": {
                "code": "404",
                "message": { "lang": "en-US", "value": "not found" },
            }
        })
    );

    let with_debug = write(&error);
    assert_eq!(with_debug["odata.error"]["innererror"]["message"], "stack");
}

#[test]
fn top_level_primitive_value() {
    let value: PayloadElement = PrimitiveValue::new(42_i64).into();
    assert_eq!(
        write(&value),
        json!({ "odata.type": "Edm.Int64", "value": "42" })
    );
}

#[test]
fn link_collection_is_not_supported() {
    let links: PayloadElement = LinkCollection::new().with_link("Orders(1)").into();
    let mut json = JsonPayloadWriter::new();
    let err = PayloadElementODataWriter::write(&links, &mut json).unwrap_err();
    assert!(matches!(err, Error::NotSupportedOperation(_)));
}
