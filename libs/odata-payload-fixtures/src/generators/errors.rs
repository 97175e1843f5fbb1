use odata_payload::{ODataErrorPayload, ODataInnerError};
use tracing::debug;

use crate::settings::FixtureSettings;

/// A chain of `depth` inner errors, outermost first. `None` for depth 0.
#[must_use]
pub fn inner_error_chain(depth: usize) -> Option<ODataInnerError> {
    (1..=depth).rev().fold(None, |nested, level| {
        let inner = ODataInnerError::new()
            .with_message(format!("inner error level {level}"))
            .with_type_name(format!("System.Level{level}Exception"))
            .with_stack_trace(format!("at Level{level}.Throw()"));
        Some(match nested {
            Some(nested) => inner.with_inner_error(nested),
            None => inner,
        })
    })
}

/// Errors with no inner error, then with inner error chains of depth 1
/// through `max_inner_error_depth`.
#[must_use]
pub fn error_payloads(settings: &FixtureSettings) -> Vec<ODataErrorPayload> {
    let mut errors = vec![
        ODataErrorPayload::new(),
        ODataErrorPayload::new()
            .with_code("400")
            .with_message("Bad request"),
    ];
    for depth in 1..=settings.max_inner_error_depth {
        let mut error = ODataErrorPayload::new()
            .with_code("500")
            .with_message(format!("Internal error with {depth} inner error(s)"));
        error.inner_error = inner_error_chain(depth);
        errors.push(error);
    }
    debug!(count = errors.len(), "generated error payloads");
    errors
}
