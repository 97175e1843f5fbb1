//! Annotations embedded in a node's header.
//!
//! These travel with the node (and with its clones). Arbitrary typed side data
//! that must not touch the node lives in [`crate::AnnotationTable`] instead.

use std::fmt;

use crate::version::ODataVersion;

/// Discriminant of an [`Annotation`], in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    EdmType,
    VersionRequirement,
    PayloadPosition,
    SelfLink,
    ContentType,
    XmlFragment,
    Custom,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    /// Full name of the EDM type the node is expected to have
    EdmType(String),
    /// Minimum protocol version needed to represent the node
    VersionRequirement(ODataVersion),
    /// Index of a navigation property in the combined member sequence of its entity
    PayloadPosition(usize),
    SelfLink(String),
    ContentType(String),
    /// Raw XML the node was read from
    XmlFragment(String),
    Custom {
        name: String,
        value: serde_json::Value,
    },
}

impl Annotation {
    #[must_use]
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::EdmType(_) => AnnotationKind::EdmType,
            Annotation::VersionRequirement(_) => AnnotationKind::VersionRequirement,
            Annotation::PayloadPosition(_) => AnnotationKind::PayloadPosition,
            Annotation::SelfLink(_) => AnnotationKind::SelfLink,
            Annotation::ContentType(_) => AnnotationKind::ContentType,
            Annotation::XmlFragment(_) => AnnotationKind::XmlFragment,
            Annotation::Custom { .. } => AnnotationKind::Custom,
        }
    }

    pub fn custom(name: impl Into<String>, value: serde_json::Value) -> Self {
        Annotation::Custom {
            name: name.into(),
            value,
        }
    }

    /// Kind-aware equality used by the comparer.
    ///
    /// XML fragments ignore whitespace between tags; everything else is
    /// compared field by field.
    #[must_use]
    pub fn matches(&self, other: &Annotation) -> bool {
        match (self, other) {
            (Annotation::XmlFragment(a), Annotation::XmlFragment(b)) => {
                normalize_xml(a) == normalize_xml(b)
            }
            (Annotation::ContentType(a), Annotation::ContentType(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::EdmType(name) => write!(f, "EdmType({name})"),
            Annotation::VersionRequirement(v) => write!(f, "VersionRequirement({v})"),
            Annotation::PayloadPosition(i) => write!(f, "PayloadPosition({i})"),
            Annotation::SelfLink(uri) => write!(f, "SelfLink({uri})"),
            Annotation::ContentType(mime) => write!(f, "ContentType({mime})"),
            Annotation::XmlFragment(xml) => write!(f, "XmlFragment({xml})"),
            Annotation::Custom { name, value } => write!(f, "Custom({name}={value})"),
        }
    }
}

fn normalize_xml(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    for segment in xml.split('<').filter(|s| !s.trim().is_empty()) {
        out.push('<');
        match segment.split_once('>') {
            Some((tag, text)) => {
                out.push_str(&tag.split_whitespace().collect::<Vec<_>>().join(" "));
                out.push('>');
                out.push_str(text.trim());
            }
            None => out.push_str(segment.trim()),
        }
    }
    if out.is_empty() {
        xml.trim().to_owned()
    } else {
        out
    }
}

/// Sort an annotation list into canonical kind order, keeping the relative
/// order of annotations of the same kind.
pub fn sort_canonical(annotations: &mut [Annotation]) {
    annotations.sort_by_key(Annotation::kind);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_xml_fragments_ignore_whitespace() {
        let a = Annotation::XmlFragment("<m:properties>\n  <d:Id>1</d:Id>\n</m:properties>".into());
        let b = Annotation::XmlFragment("<m:properties><d:Id>1</d:Id></m:properties>".into());
        assert!(a.matches(&b));

        let c = Annotation::XmlFragment("<m:properties><d:Id>2</d:Id></m:properties>".into());
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_content_type_case_insensitive() {
        let a = Annotation::ContentType("Application/JSON".into());
        let b = Annotation::ContentType("application/json".into());
        assert!(a.matches(&b));
    }

    #[test]
    fn test_different_kinds_never_match() {
        let a = Annotation::SelfLink("http://x".into());
        let b = Annotation::EdmType("http://x".into());
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_sort_canonical_is_stable_within_kind() {
        let mut list = vec![
            Annotation::custom("b", serde_json::json!(2)),
            Annotation::SelfLink("s".into()),
            Annotation::custom("a", serde_json::json!(1)),
            Annotation::EdmType("NS.T".into()),
        ];
        sort_canonical(&mut list);
        assert_eq!(list[0], Annotation::EdmType("NS.T".into()));
        assert_eq!(list[1], Annotation::SelfLink("s".into()));
        assert_eq!(list[2], Annotation::custom("b", serde_json::json!(2)));
        assert_eq!(list[3], Annotation::custom("a", serde_json::json!(1)));
    }
}
