//! Tree-wide rewrites of embedded annotations.

use crate::annotation::{AnnotationKind, sort_canonical};
use crate::element::{ElementHeader, PayloadElement};
use crate::error::{Error, Result};
use crate::visit_mut::PayloadVisitorMut;

/// Sorts every node's annotations into canonical kind order.
///
/// The sort is stable, so annotations of the same kind keep their order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnotationOrderNormalizer;

impl AnnotationOrderNormalizer {
    /// # Errors
    /// Propagates visitor errors.
    pub fn normalize(element: &mut PayloadElement) -> Result<()> {
        Self.visit_mut(element)
    }
}

impl PayloadVisitorMut for AnnotationOrderNormalizer {
    fn visit_header_mut(&mut self, header: &mut ElementHeader) -> Result<()> {
        sort_canonical(&mut header.annotations);
        Ok(())
    }
}

/// Removes every annotation of one kind from a tree.
#[derive(Clone, Copy, Debug)]
pub struct AnnotationStripper {
    kind: AnnotationKind,
    removed: usize,
}

impl AnnotationStripper {
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for [`AnnotationKind::PayloadPosition`]:
    /// entities need it to restore member order.
    pub fn new(kind: AnnotationKind) -> Result<Self> {
        if kind == AnnotationKind::PayloadPosition {
            return Err(Error::invalid_argument(
                "kind",
                "payload positions define entity member order and cannot be stripped",
            ));
        }
        Ok(Self { kind, removed: 0 })
    }

    /// Strip `kind` from `element`, returning how many annotations were removed.
    ///
    /// # Errors
    /// See [`AnnotationStripper::new`].
    pub fn strip(kind: AnnotationKind, element: &mut PayloadElement) -> Result<usize> {
        let mut stripper = Self::new(kind)?;
        stripper.visit_mut(element)?;
        Ok(stripper.removed)
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl PayloadVisitorMut for AnnotationStripper {
    fn visit_header_mut(&mut self, header: &mut ElementHeader) -> Result<()> {
        let before = header.annotations.len();
        header.remove_annotations(self.kind);
        self.removed += before - header.annotations.len();
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::element::{
        EntityInstance, NavigationPropertyInstance, PayloadNode, PrimitiveProperty,
    };

    fn annotated() -> PayloadElement {
        EntityInstance::new("NS.Customer")
            .with_annotation(Annotation::XmlFragment("<a/>".into()))
            .with_annotation(Annotation::SelfLink("Customers(1)".into()))
            .with_annotation(Annotation::EdmType("NS.Customer".into()))
            .with_annotation(Annotation::SelfLink("Customers(1)/alt".into()))
            .with_property(
                PrimitiveProperty::new("Id", 1_i32)
                    .with_annotation(Annotation::XmlFragment("<d:Id/>".into())),
            )
            .with_navigation_property(NavigationPropertyInstance::deferred("Orders", "Orders"))
            .into()
    }

    #[test]
    fn test_normalizer_sorts_by_kind_stably() {
        let mut element = annotated();
        AnnotationOrderNormalizer::normalize(&mut element).unwrap();

        let kinds: Vec<_> = element.annotations().iter().map(Annotation::kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnnotationKind::EdmType,
                AnnotationKind::SelfLink,
                AnnotationKind::SelfLink,
                AnnotationKind::XmlFragment,
            ]
        );
        assert_eq!(
            element.annotations()[1],
            Annotation::SelfLink("Customers(1)".into())
        );
    }

    #[test]
    fn test_stripper_removes_only_one_kind() {
        let mut element = annotated();
        let removed = AnnotationStripper::strip(AnnotationKind::XmlFragment, &mut element).unwrap();
        assert_eq!(removed, 2);

        let entity = element.as_entity().unwrap();
        assert_eq!(entity.annotations().len(), 3);
        assert!(entity.properties[0].header().annotations.is_empty());
        assert!(entity.navigation_properties[0].payload_position().is_some());
    }

    #[test]
    fn test_stripper_rejects_payload_position() {
        let err = AnnotationStripper::new(AnnotationKind::PayloadPosition).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "kind", .. }));
    }
}
