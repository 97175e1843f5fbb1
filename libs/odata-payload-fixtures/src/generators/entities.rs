use odata_payload::{
    ComplexInstance, ComplexMultiValue, ComplexMultiValueProperty, ComplexProperty,
    EntityInstance, EntitySetInstance, ExpandedLink, NamedStreamInstance,
    NavigationPropertyInstance, PrimitiveMultiValue, PrimitiveMultiValueProperty,
    PrimitiveProperty, PrimitiveValue, ServiceOperationDescriptor,
};
use tracing::debug;

use crate::combinatorics::column_combinations;
use crate::model::{ADDRESS, CUSTOMER, ORDER, VIP_CUSTOMER};
use crate::settings::FixtureSettings;

/// Structural member kinds an entity may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemberKind {
    Primitive,
    Complex,
    Navigation,
    Stream,
    PrimitiveCollection,
    ComplexCollection,
}

impl MemberKind {
    fn push(self, entity: &mut EntityInstance, id: i32) {
        match self {
            MemberKind::Primitive => {
                entity.push_property(PrimitiveProperty::new("Id", id));
                entity.push_property(PrimitiveProperty::new("Name", format!("Customer {id}")));
            }
            MemberKind::Complex => {
                entity.push_property(ComplexProperty::new("Address", address(id)));
            }
            MemberKind::Navigation => {
                entity.push_navigation_property(NavigationPropertyInstance::deferred(
                    "Orders",
                    format!("Customers({id})/Orders"),
                ));
            }
            MemberKind::Stream => {
                entity.push_property(
                    NamedStreamInstance::new("Photo")
                        .with_content_type("image/png")
                        .with_edit_link(format!("Customers({id})/Photo")),
                );
            }
            MemberKind::PrimitiveCollection => {
                entity.push_property(PrimitiveMultiValueProperty::new(
                    "Tags",
                    PrimitiveMultiValue::new("Edm.String")
                        .with_item(PrimitiveValue::new(format!("tag{id}")))
                        .with_item(PrimitiveValue::new("shared")),
                ));
            }
            MemberKind::ComplexCollection => {
                entity.push_property(ComplexMultiValueProperty::new(
                    "Addresses",
                    ComplexMultiValue::new(ADDRESS)
                        .with_item(address(id))
                        .with_item(address(id + 100)),
                ));
            }
        }
    }
}

/// Optional parts layered onto a base customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Decoration {
    ETag,
    EditLink,
    MediaResource,
    Action,
    Function,
}

impl Decoration {
    fn apply(self, entity: EntityInstance, id: i32) -> EntityInstance {
        match self {
            Decoration::ETag => entity.with_etag(format!("W/\"{id}\"")),
            Decoration::EditLink => entity.with_edit_link(format!("Customers({id})")),
            Decoration::MediaResource => entity.with_media_resource(
                NamedStreamInstance::media_resource()
                    .with_content_type("image/jpeg")
                    .with_edit_link(format!("Customers({id})/$value")),
            ),
            Decoration::Action => entity.with_operation(
                ServiceOperationDescriptor::action("#TestModel.Promote")
                    .with_target(format!("Customers({id})/Promote")),
            ),
            Decoration::Function => entity.with_operation(
                ServiceOperationDescriptor::function("#TestModel.TotalSpent")
                    .with_title("Total spent"),
            ),
        }
    }
}

fn address(id: i32) -> ComplexInstance {
    ComplexInstance::new(ADDRESS)
        .with_property(PrimitiveProperty::new("Street", format!("{id} Main St")))
        .with_property(PrimitiveProperty::new("City", "Redmond"))
}

/// A fully populated customer with a deferred `Orders` link between its
/// properties.
#[must_use]
pub fn customer(id: i32, name: &str) -> EntityInstance {
    let mut entity = EntityInstance::new(CUSTOMER).with_id(format!("Customers({id})"));
    entity.push_property(PrimitiveProperty::new("Id", id));
    entity.push_property(PrimitiveProperty::new("Name", name));
    entity.push_navigation_property(NavigationPropertyInstance::deferred(
        "Orders",
        format!("Customers({id})/Orders"),
    ));
    entity.push_property(ComplexProperty::new("Address", address(id)));
    entity.push_property(PrimitiveMultiValueProperty::new(
        "Tags",
        PrimitiveMultiValue::new("Edm.String").with_item(PrimitiveValue::new(format!("tag{id}"))),
    ));
    entity
}

fn order(id: i32) -> EntityInstance {
    EntityInstance::new(ORDER)
        .with_id(format!("Orders({id})"))
        .with_property(PrimitiveProperty::new("Id", id))
        .with_property(PrimitiveProperty::new("Amount", bigdecimal::BigDecimal::from(id * 10)))
}

/// Customers covering every combination of member kinds, then every
/// combination of entity-level parts on a full customer, then customers with
/// expanded navigation links. Each combination family is capped at
/// `max_combinations`.
#[must_use]
pub fn entity_instances(settings: &FixtureSettings) -> Vec<EntityInstance> {
    // navigation sits between property kinds so links land mid-sequence
    let member_columns = vec![
        vec![MemberKind::Primitive, MemberKind::Complex],
        vec![MemberKind::Navigation],
        vec![
            MemberKind::Stream,
            MemberKind::PrimitiveCollection,
            MemberKind::ComplexCollection,
        ],
    ];
    let mut entities: Vec<EntityInstance> =
        column_combinations(&member_columns, settings.max_combinations)
            .into_iter()
            .zip(100..)
            .map(|(kinds, id)| {
                let mut entity = EntityInstance::new(CUSTOMER).with_id(format!("Customers({id})"));
                for kind in kinds {
                    kind.push(&mut entity, id);
                }
                entity
            })
            .collect();

    let decoration_columns = vec![
        vec![Decoration::ETag, Decoration::EditLink],
        vec![Decoration::MediaResource],
        vec![Decoration::Action, Decoration::Function],
    ];
    entities.extend(
        column_combinations(&decoration_columns, settings.max_combinations)
            .into_iter()
            .map(|decorations| {
                decorations
                    .into_iter()
                    .fold(customer(1, "Ann"), |entity, decoration| decoration.apply(entity, 1))
            }),
    );

    let mut with_friend = customer(2, "Bob");
    with_friend.push_navigation_property(NavigationPropertyInstance::expanded(
        "BestFriend",
        ExpandedLink::new(Some(customer(3, "Cid").into())).with_url("Customers(2)/BestFriend"),
    ));
    entities.push(with_friend);

    let mut without_friend = customer(4, "Dee");
    without_friend.push_navigation_property(NavigationPropertyInstance::expanded(
        "BestFriend",
        ExpandedLink::new(None).with_url("Customers(4)/BestFriend"),
    ));
    entities.push(without_friend);

    let mut with_orders = EntityInstance::new(CUSTOMER).with_id("Customers(5)");
    with_orders.push_navigation_property(
        NavigationPropertyInstance::expanded(
            "Orders",
            ExpandedLink::new(Some(
                EntitySetInstance::new()
                    .with_entities([order(1), order(2)])
                    .into(),
            )),
        )
        .with_association_link("Customers(5)/$links/Orders"),
    );
    with_orders.push_property(PrimitiveProperty::new("Id", 5_i32));
    entities.push(with_orders);

    debug!(count = entities.len(), "generated entity instances");
    entities
}

/// Entity sets of 0, 1 and 3 customers. In the 3-entity set the middle
/// entity is a `VipCustomer` with an extra property and an etag, so
/// positional mix-ups are detectable.
#[must_use]
pub fn entity_sets() -> Vec<EntitySetInstance> {
    let vip = EntityInstance::new(VIP_CUSTOMER)
        .with_id("Customers(2)")
        .with_etag("W/\"vip\"")
        .with_property(PrimitiveProperty::new("Id", 2_i32))
        .with_property(PrimitiveProperty::new("Name", "Vip"))
        .with_property(PrimitiveProperty::new("Level", 7_i16));

    let sets = vec![
        EntitySetInstance::new(),
        EntitySetInstance::new().with_entity(customer(1, "Ann")),
        EntitySetInstance::new().with_entities([customer(1, "Ann"), vip, customer(3, "Cid")]),
    ];
    debug!(count = sets.len(), "generated entity sets");
    sets
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use odata_payload::{EntityMember, PayloadElement, PropertyInstance, assert_payload_eq};

    use super::*;

    fn member_names(entity: &EntityInstance) -> Vec<String> {
        entity
            .members()
            .into_iter()
            .map(|member| match member {
                EntityMember::Property(p) => p.name().unwrap_or_default().to_owned(),
                EntityMember::Navigation(n) => n.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_combinations_are_capped() {
        let all = entity_instances(&FixtureSettings::default());
        // 2^6 member-kind subsets, 2^5 decoration subsets, three navigation variants
        assert_eq!(all.len(), 99);

        let capped = entity_instances(&FixtureSettings {
            max_combinations: 4,
            ..FixtureSettings::default()
        });
        assert_eq!(capped.len(), 11);
        assert_eq!(capped[0].member_count(), 0);
        assert!(capped[4].etag.is_none());
        assert!(capped[5].etag.is_some());
    }

    #[test]
    fn test_every_member_kind_appears() {
        let all = entity_instances(&FixtureSettings::default());
        let properties = || all.iter().flat_map(|e| e.properties.iter());

        assert!(properties().any(|p| matches!(p, PropertyInstance::Primitive(_))));
        assert!(properties().any(|p| matches!(p, PropertyInstance::Complex(_))));
        assert!(properties().any(|p| matches!(p, PropertyInstance::NamedStream(_))));
        assert!(properties().any(|p| matches!(p, PropertyInstance::PrimitiveCollection(_))));
        assert!(properties().any(|p| matches!(p, PropertyInstance::ComplexCollection(_))));
        assert!(all.iter().any(|e| e.navigation_property("Orders").is_some()));
    }

    #[test]
    fn test_member_kind_combinations_are_distinct() {
        let all = entity_instances(&FixtureSettings::default());
        let shapes: HashSet<Vec<String>> = all[..64].iter().map(member_names).collect();
        assert_eq!(shapes.len(), 64);

        let full = &all[63];
        assert_eq!(
            member_names(full),
            vec!["Id", "Name", "Address", "Orders", "Photo", "Tags", "Addresses"]
        );
    }

    #[test]
    fn test_customer_keeps_link_between_properties() {
        let entity = customer(1, "Ann");
        let members = entity.members();
        assert!(matches!(members[2], EntityMember::Navigation(n) if n.name == "Orders"));
        assert!(matches!(members[3], EntityMember::Property(p) if p.name() == Some("Address")));
    }

    #[test]
    fn test_middle_entity_is_distinguished() {
        let sets = entity_sets();
        assert_eq!(
            sets.iter().map(|s| s.entities.len()).collect::<Vec<_>>(),
            vec![0, 1, 3]
        );
        let middle = &sets[2].entities[1];
        assert_eq!(middle.type_name.as_deref(), Some(VIP_CUSTOMER));

        let expected: PayloadElement = sets[2].clone().into();
        let mut swapped = sets[2].clone();
        swapped.entities.swap(0, 1);
        assert!(assert_payload_eq(&expected, &swapped.into()).is_err());
    }
}
