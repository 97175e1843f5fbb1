use std::collections::BTreeMap;

use super::{DeferredLink, ElementHeader, PayloadElement};

#[derive(Clone, Debug, Default)]
pub struct LinkCollection {
    pub header: ElementHeader,
    pub links: Vec<DeferredLink>,
    pub inline_count: Option<i64>,
    pub next_link: Option<String>,
}

impl LinkCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.links.push(DeferredLink::new(url));
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

/// Top-level error payload.
#[derive(Clone, Debug, Default)]
pub struct ODataErrorPayload {
    pub header: ElementHeader,
    pub code: Option<String>,
    pub message: Option<String>,
    pub inner_error: Option<ODataInnerError>,
}

impl ODataErrorPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_inner_error(mut self, inner: ODataInnerError) -> Self {
        self.inner_error = Some(inner);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct ODataInnerError {
    pub header: ElementHeader,
    pub message: Option<String>,
    pub type_name: Option<String>,
    pub stack_trace: Option<String>,
    pub inner_error: Option<Box<ODataInnerError>>,
}

impl ODataInnerError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    #[must_use]
    pub fn with_inner_error(mut self, inner: ODataInnerError) -> Self {
        self.inner_error = Some(Box::new(inner));
        self
    }

    /// Number of errors in the chain starting at (and including) this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |e| e.inner_error.as_deref()).count()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ServiceDocumentInstance {
    pub header: ElementHeader,
    pub workspaces: Vec<WorkspaceInstance>,
}

impl ServiceDocumentInstance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: WorkspaceInstance) -> Self {
        self.workspaces.push(workspace);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct WorkspaceInstance {
    pub header: ElementHeader,
    pub title: Option<String>,
    pub collections: Vec<ResourceCollectionInstance>,
}

impl WorkspaceInstance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: ResourceCollectionInstance) -> Self {
        self.collections.push(collection);
        self
    }
}

/// An entity set advertised by a service document.
#[derive(Clone, Debug)]
pub struct ResourceCollectionInstance {
    pub header: ElementHeader,
    pub href: String,
    pub title: Option<String>,
    pub name: Option<String>,
}

impl ResourceCollectionInstance {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            header: ElementHeader::new(),
            href: href.into(),
            title: None,
            name: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One top-level part of a batch: a single operation or a changeset.
#[derive(Clone, Debug)]
pub enum BatchPart<O> {
    Operation(O),
    Changeset(BatchChangeset<O>),
}

#[derive(Clone, Debug)]
pub struct BatchChangeset<O> {
    pub boundary: String,
    pub operations: Vec<O>,
}

impl<O> BatchChangeset<O> {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_operation(mut self, operation: O) -> Self {
        self.operations.push(operation);
        self
    }
}

impl<O> BatchPart<O> {
    /// Operations of this part, flattening a changeset.
    pub fn operations(&self) -> impl Iterator<Item = &O> {
        let slice = match self {
            BatchPart::Operation(op) => std::slice::from_ref(op),
            BatchPart::Changeset(changeset) => changeset.operations.as_slice(),
        };
        slice.iter()
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut O> {
        let slice = match self {
            BatchPart::Operation(op) => std::slice::from_mut(op),
            BatchPart::Changeset(changeset) => changeset.operations.as_mut_slice(),
        };
        slice.iter_mut()
    }
}

#[derive(Clone, Debug)]
pub struct BatchRequestOperation {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Box<PayloadElement>>,
}

impl BatchRequestOperation {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers: BTreeMap::new(),
            payload: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<PayloadElement>) -> Self {
        self.payload = Some(Box::new(payload.into()));
        self
    }
}

#[derive(Clone, Debug)]
pub struct BatchResponseOperation {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Box<PayloadElement>>,
}

impl BatchResponseOperation {
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            payload: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<PayloadElement>) -> Self {
        self.payload = Some(Box::new(payload.into()));
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchRequestPayload {
    pub header: ElementHeader,
    pub parts: Vec<BatchPart<BatchRequestOperation>>,
}

impl BatchRequestPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_part(mut self, part: BatchPart<BatchRequestOperation>) -> Self {
        self.parts.push(part);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchResponsePayload {
    pub header: ElementHeader,
    pub parts: Vec<BatchPart<BatchResponseOperation>>,
}

impl BatchResponsePayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_part(mut self, part: BatchPart<BatchResponseOperation>) -> Self {
        self.parts.push(part);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_inner_error_depth() {
        let chain = ODataInnerError::new()
            .with_message("outer")
            .with_inner_error(ODataInnerError::new().with_inner_error(ODataInnerError::new()));
        assert_eq!(chain.depth(), 3);
        assert_eq!(ODataInnerError::new().depth(), 1);
    }

    #[test]
    fn test_changeset_operations_flatten() {
        let part = BatchPart::Changeset(
            BatchChangeset::new("cs_1")
                .with_operation(BatchRequestOperation::new("POST", "Customers"))
                .with_operation(BatchRequestOperation::new("DELETE", "Customers(1)")),
        );
        let methods: Vec<_> = part.operations().map(|op| op.method.as_str()).collect();
        assert_eq!(methods, vec!["POST", "DELETE"]);

        let single = BatchPart::Operation(BatchRequestOperation::new("GET", "Customers"));
        assert_eq!(single.operations().count(), 1);
    }
}
