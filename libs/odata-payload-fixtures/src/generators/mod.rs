//! Generators for representative payload trees.
//!
//! Every call builds new trees, so results never alias each other.

mod batches;
mod documents;
mod entities;
mod errors;
mod values;

use std::sync::Arc;

use odata_payload::{EdmModel, PayloadElement};
use tracing::debug;

pub use batches::{batch_payloads, batch_request, batch_response};
pub use documents::{link_collections, service_documents};
pub use entities::{customer, entity_instances, entity_sets};
pub use errors::{error_payloads, inner_error_chain};
pub use values::{primitive_collections, primitive_values};

use crate::descriptor::{MessageKind, PayloadTestDescriptor};
use crate::model::sample_model;
use crate::settings::FixtureSettings;

fn describe<I, T>(
    label: &str,
    items: I,
    model: &Arc<EdmModel>,
    kind: Option<MessageKind>,
) -> impl Iterator<Item = PayloadTestDescriptor>
where
    I: IntoIterator<Item = T>,
    T: Into<PayloadElement>,
{
    let label = label.to_owned();
    let model = Arc::clone(model);
    items.into_iter().enumerate().map(move |(i, item)| {
        let descriptor = PayloadTestDescriptor::new(format!("{label} #{i}"), item)
            .with_model(Arc::clone(&model));
        match kind {
            Some(kind) => descriptor.only(kind),
            None => descriptor,
        }
    })
}

/// Every generated payload wrapped as a descriptor over the sample model.
///
/// Errors, service documents, link collections and batch responses are
/// response-only. Batch requests are request-only.
#[must_use]
pub fn all_descriptors(settings: &FixtureSettings) -> Vec<PayloadTestDescriptor> {
    let model = Arc::new(sample_model());
    let response = Some(MessageKind::Response);

    let mut descriptors: Vec<PayloadTestDescriptor> = Vec::new();
    descriptors.extend(describe("entity", entity_instances(settings), &model, None));
    descriptors.extend(describe("entity set", entity_sets(), &model, response));
    descriptors.extend(describe("primitive", primitive_values(), &model, None));
    descriptors.extend(describe(
        "primitive collection",
        primitive_collections(settings),
        &model,
        None,
    ));
    descriptors.extend(describe("error", error_payloads(settings), &model, response));
    descriptors.extend(describe(
        "service document",
        service_documents(settings),
        &model,
        response,
    ));
    descriptors.extend(describe("links", link_collections(), &model, response));
    for batch in batch_payloads(settings) {
        let kind = match batch {
            PayloadElement::BatchRequest(_) => MessageKind::Request,
            _ => MessageKind::Response,
        };
        descriptors.extend(describe("batch", [batch], &model, Some(kind)));
    }

    debug!(count = descriptors.len(), "generated test descriptors");
    descriptors
}
