use super::{ElementHeader, PayloadElement, PayloadNode, PropertyInstance};
use crate::annotation::{Annotation, AnnotationKind};

#[derive(Clone, Debug, Default)]
pub struct EntitySetInstance {
    pub header: ElementHeader,
    pub entities: Vec<EntityInstance>,
    pub inline_count: Option<i64>,
    pub next_link: Option<String>,
}

impl EntitySetInstance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityInstance) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn with_entities(mut self, entities: impl IntoIterator<Item = EntityInstance>) -> Self {
        self.entities.extend(entities);
        self
    }

    #[must_use]
    pub fn with_inline_count(mut self, count: i64) -> Self {
        self.inline_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_next_link(mut self, link: impl Into<String>) -> Self {
        self.next_link = Some(link.into());
        self
    }
}

/// Reference to a member of an entity, in payload order.
#[derive(Clone, Copy, Debug)]
pub enum EntityMember<'a> {
    Property(&'a PropertyInstance),
    Navigation(&'a NavigationPropertyInstance),
}

/// Index-based form of [`EntityMember`], usable when the entity is borrowed mutably.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberSlot {
    Property(usize),
    Navigation(usize),
}

#[derive(Clone, Debug)]
pub struct EntityInstance {
    pub header: ElementHeader,
    pub type_name: Option<String>,
    pub entity_id: Option<String>,
    pub etag: Option<String>,
    pub edit_link: Option<String>,
    /// Default stream of a media link entry
    pub media_resource: Option<NamedStreamInstance>,
    pub operations: Vec<ServiceOperationDescriptor>,
    pub properties: Vec<PropertyInstance>,
    pub navigation_properties: Vec<NavigationPropertyInstance>,
}

impl EntityInstance {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::untyped()
        }
    }

    #[must_use]
    pub fn untyped() -> Self {
        Self {
            header: ElementHeader::new(),
            type_name: None,
            entity_id: None,
            etag: None,
            edit_link: None,
            media_resource: None,
            operations: Vec::new(),
            properties: Vec::new(),
            navigation_properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    #[must_use]
    pub fn with_edit_link(mut self, link: impl Into<String>) -> Self {
        self.edit_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_media_resource(mut self, stream: NamedStreamInstance) -> Self {
        self.media_resource = Some(stream);
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: ServiceOperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<PropertyInstance>) -> Self {
        self.push_property(property);
        self
    }

    #[must_use]
    pub fn with_navigation_property(mut self, navigation: NavigationPropertyInstance) -> Self {
        self.push_navigation_property(navigation);
        self
    }

    pub fn push_property(&mut self, property: impl Into<PropertyInstance>) {
        self.properties.push(property.into());
    }

    /// Append a navigation property, recording its payload position unless
    /// one was already captured (e.g. by a reader).
    pub fn push_navigation_property(&mut self, mut navigation: NavigationPropertyInstance) {
        if navigation.payload_position().is_none() {
            let position = self.member_count();
            navigation
                .header
                .annotations
                .push(Annotation::PayloadPosition(position));
        }
        self.navigation_properties.push(navigation);
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.properties.len() + self.navigation_properties.len()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ServiceOperationDescriptor> {
        self.operations.iter().filter(|op| op.is_action)
    }

    pub fn functions(&self) -> impl Iterator<Item = &ServiceOperationDescriptor> {
        self.operations.iter().filter(|op| !op.is_action)
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyInstance> {
        self.properties.iter().find(|p| p.name() == Some(name))
    }

    #[must_use]
    pub fn navigation_property(&self, name: &str) -> Option<&NavigationPropertyInstance> {
        self.navigation_properties.iter().find(|n| n.name == name)
    }

    /// Properties and navigation properties re-interleaved into their
    /// original payload order.
    ///
    /// Each navigation property's `PayloadPosition` annotation is its index in
    /// the combined sequence. Properties fill the remaining slots in list order.
    #[must_use]
    pub fn member_order(&self) -> Vec<MemberSlot> {
        let mut navigations: Vec<(usize, usize)> = self
            .navigation_properties
            .iter()
            .enumerate()
            .map(|(index, nav)| {
                let position = nav.payload_position();
                debug_assert!(
                    position.is_some(),
                    "navigation property '{}' has no recorded payload position",
                    nav.name
                );
                (position.unwrap_or(usize::MAX), index)
            })
            .collect();
        navigations.sort_unstable();

        let total = self.member_count();
        let mut order = Vec::with_capacity(total);
        let mut next_property = 0;
        let mut navigations = navigations.into_iter().peekable();
        while order.len() < total {
            let take_navigation = match navigations.peek() {
                Some(&(position, _)) => {
                    position <= order.len() || next_property >= self.properties.len()
                }
                None => false,
            };
            if take_navigation {
                if let Some((_, index)) = navigations.next() {
                    order.push(MemberSlot::Navigation(index));
                }
            } else {
                order.push(MemberSlot::Property(next_property));
                next_property += 1;
            }
        }
        order
    }

    /// Members in original payload order.
    #[must_use]
    pub fn members(&self) -> Vec<EntityMember<'_>> {
        self.member_order()
            .into_iter()
            .map(|slot| match slot {
                MemberSlot::Property(i) => EntityMember::Property(&self.properties[i]),
                MemberSlot::Navigation(i) => {
                    EntityMember::Navigation(&self.navigation_properties[i])
                }
            })
            .collect()
    }
}

/// A stream property, or the default stream of a media link entry when unnamed.
#[derive(Clone, Debug, Default)]
pub struct NamedStreamInstance {
    pub header: ElementHeader,
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub edit_link: Option<String>,
    pub source_link: Option<String>,
    pub etag: Option<String>,
}

impl NamedStreamInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The unnamed default stream of a media link entry.
    #[must_use]
    pub fn media_resource() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_edit_link(mut self, link: impl Into<String>) -> Self {
        self.edit_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_source_link(mut self, link: impl Into<String>) -> Self {
        self.source_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

/// An action or function advertised by an entity.
#[derive(Clone, Debug)]
pub struct ServiceOperationDescriptor {
    pub header: ElementHeader,
    pub is_action: bool,
    pub metadata: String,
    pub target: Option<String>,
    pub title: Option<String>,
}

impl ServiceOperationDescriptor {
    pub fn action(metadata: impl Into<String>) -> Self {
        Self::new(true, metadata)
    }

    pub fn function(metadata: impl Into<String>) -> Self {
        Self::new(false, metadata)
    }

    fn new(is_action: bool, metadata: impl Into<String>) -> Self {
        Self {
            header: ElementHeader::new(),
            is_action,
            metadata: metadata.into(),
            target: None,
            title: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeferredLink {
    pub header: ElementHeader,
    pub url: Option<String>,
}

impl DeferredLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            header: ElementHeader::new(),
            url: Some(url.into()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpandedLink {
    pub header: ElementHeader,
    pub url: Option<String>,
    /// An entity, an entity set, or `None` for an expanded null entity
    pub payload: Option<Box<PayloadElement>>,
}

impl ExpandedLink {
    pub fn new(payload: Option<PayloadElement>) -> Self {
        Self {
            header: ElementHeader::new(),
            url: None,
            payload: payload.map(Box::new),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `Some(true)` for an expanded feed, `Some(false)` for an expanded entry.
    #[must_use]
    pub fn is_collection(&self) -> Option<bool> {
        match self.payload.as_deref() {
            Some(PayloadElement::EntitySet(_)) => Some(true),
            Some(PayloadElement::Entity(_)) => Some(false),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NavigationValue {
    Deferred(DeferredLink),
    Expanded(ExpandedLink),
}

#[derive(Clone, Debug)]
pub struct NavigationPropertyInstance {
    pub header: ElementHeader,
    pub name: String,
    pub value: NavigationValue,
    pub association_link: Option<DeferredLink>,
}

impl NavigationPropertyInstance {
    pub fn deferred(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, NavigationValue::Deferred(DeferredLink::new(url)))
    }

    pub fn expanded(name: impl Into<String>, link: ExpandedLink) -> Self {
        Self::new(name, NavigationValue::Expanded(link))
    }

    pub fn new(name: impl Into<String>, value: NavigationValue) -> Self {
        Self {
            header: ElementHeader::new(),
            name: name.into(),
            value,
            association_link: None,
        }
    }

    #[must_use]
    pub fn with_association_link(mut self, url: impl Into<String>) -> Self {
        self.association_link = Some(DeferredLink::new(url));
        self
    }

    /// Recorded index in the owning entity's combined member sequence.
    #[must_use]
    pub fn payload_position(&self) -> Option<usize> {
        match self.header().annotation(AnnotationKind::PayloadPosition) {
            Some(Annotation::PayloadPosition(position)) => Some(*position),
            _ => None,
        }
    }

    /// URL of the link, whichever form it takes.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.value {
            NavigationValue::Deferred(link) => link.url.as_deref(),
            NavigationValue::Expanded(link) => link.url.as_deref(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::PrimitiveProperty;

    fn names(entity: &EntityInstance) -> Vec<String> {
        entity
            .members()
            .into_iter()
            .map(|m| match m {
                EntityMember::Property(p) => p.name().unwrap_or_default().to_owned(),
                EntityMember::Navigation(n) => format!("nav:{}", n.name),
            })
            .collect()
    }

    #[test]
    fn test_interleaving_follows_construction_order() {
        let entity = EntityInstance::new("NS.Customer")
            .with_navigation_property(NavigationPropertyInstance::deferred("Orders", "Orders"))
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::deferred("Best", "Best"))
            .with_property(PrimitiveProperty::new("Name", "Bob"))
            .with_property(PrimitiveProperty::new("Age", 30_i32));

        assert_eq!(
            names(&entity),
            vec!["nav:Orders", "Id", "nav:Best", "Name", "Age"]
        );
    }

    #[test]
    fn test_trailing_navigation_after_properties() {
        let entity = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::deferred("Orders", "Orders"));

        assert_eq!(
            entity.member_order(),
            vec![MemberSlot::Property(0), MemberSlot::Navigation(0)]
        );
    }

    #[test]
    fn test_preset_position_is_kept() {
        let nav = NavigationPropertyInstance::deferred("Orders", "Orders")
            .with_annotation(Annotation::PayloadPosition(0));
        let entity = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(nav);

        assert_eq!(names(&entity), vec!["nav:Orders", "Id"]);
    }

    #[test]
    fn test_operations_split_into_actions_and_functions() {
        let entity = EntityInstance::new("NS.Customer")
            .with_operation(ServiceOperationDescriptor::function("#NS.F"))
            .with_operation(ServiceOperationDescriptor::action("#NS.A"));

        assert_eq!(entity.actions().count(), 1);
        assert_eq!(entity.functions().count(), 1);
    }

    #[test]
    fn test_expanded_link_collection_flag() {
        let feed = ExpandedLink::new(Some(EntitySetInstance::new().into()));
        let entry = ExpandedLink::new(Some(EntityInstance::new("NS.T").into()));
        let null = ExpandedLink::new(None);

        assert_eq!(feed.is_collection(), Some(true));
        assert_eq!(entry.is_collection(), Some(false));
        assert_eq!(null.is_collection(), None);
    }
}
