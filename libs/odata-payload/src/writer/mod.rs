//! Writing payload trees through a message writer.
//!
//! [`ODataWriter`] is the seam for the message writer under test.
//! [`PayloadElementODataWriter`] converts a tree into the object model and
//! drives any writer; [`JsonPayloadWriter`] is a reference writer producing
//! JSON.

mod json;
mod object_model;
mod payload_writer;

pub use json::JsonPayloadWriter;
pub use object_model::{
    ODataCollectionValue, ODataComplexValue, ODataEntitySetInfo, ODataEntityReferenceLinks,
    ODataEntry, ODataError, ODataFeed, ODataInnerError, ODataNavigationLink, ODataOperation,
    ODataProperty, ODataPropertyValue, ODataServiceDocument, ODataStreamReference,
};
pub use payload_writer::PayloadElementODataWriter;

use crate::error::Result;

/// Streaming writer for a single message.
///
/// Feeds, entries and navigation links are scopes opened by a `write_start_*`
/// call and closed by [`ODataWriter::write_end`]. The remaining methods write
/// a complete item.
pub trait ODataWriter {
    /// # Errors
    /// Implementations reject misplaced scopes.
    fn write_start_feed(&mut self, feed: &ODataFeed) -> Result<()>;

    /// # Errors
    /// Implementations reject misplaced scopes.
    fn write_start_entry(&mut self, entry: &ODataEntry) -> Result<()>;

    /// Content of an expanded single-valued link with no target.
    ///
    /// # Errors
    /// Implementations reject a null entry outside a navigation link.
    fn write_null_entry(&mut self) -> Result<()>;

    /// # Errors
    /// Implementations reject a property outside an entry or at a second root.
    fn write_property(&mut self, property: &ODataProperty) -> Result<()>;

    /// # Errors
    /// Implementations reject a link outside an entry.
    fn write_start_navigation_link(&mut self, link: &ODataNavigationLink) -> Result<()>;

    /// # Errors
    /// Implementations reject an end without an open scope.
    fn write_end(&mut self) -> Result<()>;

    /// Top-level value: a primitive, complex value or collection.
    ///
    /// # Errors
    /// Implementations reject a value that is not the message root.
    fn write_value(&mut self, value: &ODataPropertyValue) -> Result<()>;

    /// # Errors
    /// Implementations reject an error that is not the message root.
    fn write_error(&mut self, error: &ODataError, include_debug_information: bool) -> Result<()>;

    /// # Errors
    /// Implementations reject a document that is not the message root.
    fn write_service_document(&mut self, document: &ODataServiceDocument) -> Result<()>;

    /// # Errors
    /// Implementations reject links that are not the message root.
    fn write_entity_reference_links(&mut self, links: &ODataEntityReferenceLinks) -> Result<()>;
}
