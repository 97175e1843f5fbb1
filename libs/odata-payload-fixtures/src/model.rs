//! The EDM model every generated fixture is typed against.

use odata_payload::EdmModel;
use odata_payload::edm::{
    EdmEntitySet, EdmNavigationProperty, EdmProperty, EdmStructuredType, EdmTypeRef,
};

pub const NAMESPACE: &str = "TestModel";
pub const CUSTOMER: &str = "TestModel.Customer";
pub const VIP_CUSTOMER: &str = "TestModel.VipCustomer";
pub const ORDER: &str = "TestModel.Order";
pub const ADDRESS: &str = "TestModel.Address";
pub const CUSTOMERS: &str = "Customers";
pub const ORDERS: &str = "Orders";

/// `Customer` (with the derived `VipCustomer`), `Order` and the complex
/// `Address`, exposed through the `Customers` and `Orders` sets.
#[must_use]
pub fn sample_model() -> EdmModel {
    let address = EdmStructuredType::new(ADDRESS)
        .with_property(EdmProperty::new("Street", EdmTypeRef::primitive("Edm.String")))
        .with_property(EdmProperty::new("City", EdmTypeRef::primitive("Edm.String")));

    let customer = EdmStructuredType::new(CUSTOMER)
        .with_key("Id")
        .with_stream()
        .with_property(EdmProperty::new("Id", EdmTypeRef::primitive("Edm.Int32")).not_null())
        .with_property(EdmProperty::new("Name", EdmTypeRef::primitive("Edm.String")))
        .with_property(EdmProperty::new("Address", EdmTypeRef::complex(ADDRESS)))
        .with_property(EdmProperty::new(
            "Tags",
            EdmTypeRef::collection(EdmTypeRef::primitive("Edm.String")),
        ))
        .with_property(EdmProperty::new(
            "Addresses",
            EdmTypeRef::collection(EdmTypeRef::complex(ADDRESS)),
        ))
        .with_property(EdmProperty::new("Photo", EdmTypeRef::primitive("Edm.Stream")))
        .with_navigation_property(EdmNavigationProperty::many("Orders", ORDER))
        .with_navigation_property(EdmNavigationProperty::single("BestFriend", CUSTOMER));

    let vip = EdmStructuredType::new(VIP_CUSTOMER)
        .with_base_type(CUSTOMER)
        .with_property(EdmProperty::new("Level", EdmTypeRef::primitive("Edm.Int16")));

    let order = EdmStructuredType::new(ORDER)
        .with_key("Id")
        .with_property(EdmProperty::new("Id", EdmTypeRef::primitive("Edm.Int32")).not_null())
        .with_property(EdmProperty::new("Amount", EdmTypeRef::primitive("Edm.Decimal")))
        .with_navigation_property(EdmNavigationProperty::single("Customer", CUSTOMER));

    EdmModel::new(NAMESPACE)
        .with_entity_type(customer)
        .with_entity_type(vip)
        .with_entity_type(order)
        .with_complex_type(address)
        .with_entity_set(EdmEntitySet::new(CUSTOMERS, CUSTOMER))
        .with_entity_set(EdmEntitySet::new(ORDERS, ORDER))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_derived_type_sees_base_members() {
        let model = sample_model();
        let vip = model.entity_type(VIP_CUSTOMER).unwrap();

        let (declaring, _) = model.find_property(vip, "Name").unwrap();
        assert_eq!(declaring.name, CUSTOMER);
        assert!(model.find_navigation(vip, "Orders").unwrap().is_collection);
        assert_eq!(model.qualify("Order"), ORDER);
    }
}
