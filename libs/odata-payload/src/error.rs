use std::fmt;

use crate::element::ElementType;

/// A single expected-vs-observed disagreement found by the comparer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonFailure {
    /// Slash-separated location of the disagreeing node, e.g. `EntitySet/Entity[1]`
    pub path: String,
    /// Name of the field that differs
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' differs (expected {}, actual {})",
            self.path, self.field, self.expected, self.actual
        )
    }
}

/// Unified error type for payload model operations.
///
/// Every variant is either a programming error at the call site or a test
/// assertion failure. None of them are retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A visitor met a node kind it has no handler for.
    #[error("unsupported payload element type: {0}")]
    UnsupportedPayloadType(ElementType),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("payload comparison failed: {0}")]
    DataComparison(ComparisonFailure),

    #[error(
        "payload comparison failed with {} mismatch(es); first: {}",
        .0.len(),
        first_failure(.0)
    )]
    ComparisonFailed(Vec<ComparisonFailure>),

    #[error("operation not supported: {0}")]
    NotSupportedOperation(&'static str),

    #[error("writer error: {0}")]
    Writer(String),
}

fn first_failure(failures: &[ComparisonFailure]) -> String {
    failures
        .first()
        .map_or_else(|| "(none)".to_owned(), ToString::to_string)
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
