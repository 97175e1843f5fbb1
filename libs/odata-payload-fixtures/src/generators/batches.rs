use odata_payload::{
    BatchChangeset, BatchPart, BatchRequestOperation, BatchRequestPayload, BatchResponseOperation,
    BatchResponsePayload, PayloadElement,
};
use tracing::debug;

use super::entities::customer;
use crate::settings::FixtureSettings;

const JSON: &str = "application/json";

/// A query followed by a changeset that creates and replaces customers.
#[must_use]
pub fn batch_request() -> BatchRequestPayload {
    BatchRequestPayload::new()
        .with_part(BatchPart::Operation(
            BatchRequestOperation::new("GET", "Customers(1)").with_header("Accept", JSON),
        ))
        .with_part(BatchPart::Changeset(
            BatchChangeset::new("changeset_1")
                .with_operation(
                    BatchRequestOperation::new("POST", "Customers")
                        .with_header("Content-Type", JSON)
                        .with_payload(customer(10, "New")),
                )
                .with_operation(
                    BatchRequestOperation::new("PUT", "Customers(1)")
                        .with_header("Content-Type", JSON)
                        .with_header("If-Match", "W/\"1\"")
                        .with_payload(customer(1, "Renamed")),
                ),
        ))
}

/// Responses matching [`batch_request`].
#[must_use]
pub fn batch_response() -> BatchResponsePayload {
    BatchResponsePayload::new()
        .with_part(BatchPart::Operation(
            BatchResponseOperation::new(200)
                .with_header("Content-Type", JSON)
                .with_payload(customer(1, "Ann")),
        ))
        .with_part(BatchPart::Changeset(
            BatchChangeset::new("changeset_1")
                .with_operation(
                    BatchResponseOperation::new(201)
                        .with_header("Location", "Customers(10)")
                        .with_payload(customer(10, "New")),
                )
                .with_operation(BatchResponseOperation::new(204)),
        ))
}

/// The batch response, preceded by the request when requests are enabled.
#[must_use]
pub fn batch_payloads(settings: &FixtureSettings) -> Vec<PayloadElement> {
    let mut batches = Vec::with_capacity(2);
    if settings.include_requests {
        batches.push(batch_request().into());
    }
    batches.push(batch_response().into());
    debug!(count = batches.len(), "generated batch payloads");
    batches
}
