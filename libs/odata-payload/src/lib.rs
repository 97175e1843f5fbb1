#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! In-memory object model for OData payloads used by protocol tests.
//!
//! A payload is a tree of [`PayloadElement`] nodes. Each node carries an
//! [`ElementHeader`] with a process-unique [`NodeId`] and an ordered list of
//! [`Annotation`]s. Out-of-tree facts live in an [`AnnotationTable`] keyed by
//! node identity.
//!
//! The tree is consumed through visitors ([`visitor::PayloadVisitor`],
//! [`visit_mut::PayloadVisitorMut`], [`PayloadElementVisitor`]), compared with
//! [`PayloadComparer`], and pushed through a message writer with
//! [`writer::PayloadElementODataWriter`].

pub mod annotation;
mod annotation_table;
pub mod comparer;
mod copy;
pub mod edm;
pub mod element;
mod error;
mod normalize;
mod typed_visitor;
mod value;
pub mod version;
pub mod visit_mut;
pub mod visitor;
pub mod writer;

pub use annotation::{Annotation, AnnotationKind, sort_canonical};
pub use annotation_table::AnnotationTable;
pub use comparer::{
    AssertionHandler, CollectFailures, FailFast, PayloadComparer, assert_payload_eq,
};
pub use edm::{EdmModel, TypeAnnotator};
pub use element::{
    BatchChangeset, BatchPart, BatchRequestOperation, BatchRequestPayload, BatchResponseOperation,
    BatchResponsePayload, ComplexInstance, ComplexMultiValue, ComplexMultiValueProperty,
    ComplexProperty, DeferredLink, ElementHeader, ElementType, EntityInstance, EntityMember,
    EntitySetInstance, ExpandedLink, LinkCollection, MemberSlot, NamedStreamInstance,
    NavigationPropertyInstance, NavigationValue, NodeId, ODataErrorPayload, ODataInnerError,
    PayloadElement, PayloadNode, PrimitiveMultiValue, PrimitiveMultiValueProperty,
    PrimitiveProperty, PrimitiveValue, PropertyInstance, ResourceCollectionInstance,
    ServiceDocumentInstance, ServiceOperationDescriptor, WorkspaceInstance, collection_type_name,
};
pub use error::{ComparisonFailure, Error, Result};
pub use normalize::{AnnotationOrderNormalizer, AnnotationStripper};
pub use typed_visitor::{PayloadElementVisitor, PayloadSummary};
pub use value::ODataValue;
pub use version::{ODataVersion, VersionCalculator};
