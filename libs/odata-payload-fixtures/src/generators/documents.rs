use odata_payload::{
    LinkCollection, ResourceCollectionInstance, ServiceDocumentInstance, WorkspaceInstance,
};
use tracing::debug;

use crate::settings::FixtureSettings;

/// One service document per configured size, each with a single workspace
/// listing that many entity sets.
#[must_use]
pub fn service_documents(settings: &FixtureSettings) -> Vec<ServiceDocumentInstance> {
    let documents: Vec<_> = settings
        .service_document_sizes
        .iter()
        .map(|&size| {
            let workspace = (0..size).fold(
                WorkspaceInstance::new().with_title("Default"),
                |workspace, i| {
                    let mut collection = ResourceCollectionInstance::new(format!("Set{i}"))
                        .with_name(format!("Set{i}"));
                    if i % 2 == 1 {
                        collection = collection.with_title(format!("Entity set {i}"));
                    }
                    workspace.with_collection(collection)
                },
            );
            ServiceDocumentInstance::new().with_workspace(workspace)
        })
        .collect();
    debug!(count = documents.len(), "generated service documents");
    documents
}

/// Empty, single-link and paged link collections.
#[must_use]
pub fn link_collections() -> Vec<LinkCollection> {
    let links = vec![
        LinkCollection::new(),
        LinkCollection::new().with_link("Orders(1)"),
        LinkCollection::new()
            .with_link("Orders(1)")
            .with_link("Orders(2)")
            .with_link("Orders(3)")
            .with_inline_count(5)
            .with_next_link("Customers(1)/$links/Orders?$skiptoken=3"),
    ];
    debug!(count = links.len(), "generated link collections");
    links
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_document_sizes_follow_settings() {
        let documents = service_documents(&FixtureSettings::default());
        let sizes: Vec<usize> = documents
            .iter()
            .map(|d| d.workspaces[0].collections.len())
            .collect();
        assert_eq!(sizes, vec![0, 1, 3]);
        assert_eq!(
            documents[2].workspaces[0].collections[1].title.as_deref(),
            Some("Entity set 1")
        );
    }

    #[test]
    fn test_paged_link_collection() {
        let links = link_collections();
        assert_eq!(links[2].links.len(), 3);
        assert_eq!(links[2].inline_count, Some(5));
    }
}
