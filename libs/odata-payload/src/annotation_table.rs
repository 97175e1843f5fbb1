//! Out-of-band annotations keyed by node identity.
//!
//! The table stores at most one value per annotation type per node. Keys are
//! [`NodeId`]s, so two nodes with identical content are annotated
//! independently. Access is safe from parallel test executions.
//!
//! Rows are not tied to the lifetime of their nodes. Dropping a tree leaves
//! its rows in place until [`AnnotationTable::strip_tree`] removes them or
//! the table itself is dropped.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;

use crate::element::{NodeId, PayloadElement};
use crate::error::Result;

type Slot = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct AnnotationTable {
    entries: DashMap<NodeId, HashMap<TypeId, Slot>>,
    inherits: DashMap<NodeId, NodeId>,
}

impl std::fmt::Debug for AnnotationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationTable")
            .field("annotated_nodes", &self.entries.len())
            .field("inheritance_links", &self.inherits.len())
            .finish()
    }
}

impl AnnotationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` as the `T` annotation of `node`, returning the previous one.
    pub fn set<T: Any + Send + Sync>(&self, node: NodeId, value: T) -> Option<Arc<T>> {
        let previous = self
            .entries
            .entry(node)
            .or_default()
            .insert(TypeId::of::<T>(), Arc::new(value));
        previous.and_then(|slot| slot.downcast::<T>().ok())
    }

    /// The `T` annotation of `node`, falling back along `inherit_from` links.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, node: NodeId) -> Option<Arc<T>> {
        let mut visited = HashSet::new();
        let mut current = node;
        loop {
            if let Some(value) = self.get_own::<T>(current) {
                return Some(value);
            }
            if !visited.insert(current) {
                return None;
            }
            current = *self.inherits.get(&current)?;
        }
    }

    /// The `T` annotation set directly on `node`, ignoring inheritance.
    #[must_use]
    pub fn get_own<T: Any + Send + Sync>(&self, node: NodeId) -> Option<Arc<T>> {
        let slot = self.entries.get(&node)?.get(&TypeId::of::<T>())?.clone();
        slot.downcast::<T>().ok()
    }

    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self, node: NodeId) -> bool {
        self.get::<T>(node).is_some()
    }

    pub fn remove<T: Any + Send + Sync>(&self, node: NodeId) -> Option<Arc<T>> {
        let removed = {
            let mut slots = self.entries.get_mut(&node)?;
            slots.remove(&TypeId::of::<T>())
        };
        self.entries.remove_if(&node, |_, slots| slots.is_empty());
        removed.and_then(|slot| slot.downcast::<T>().ok())
    }

    /// Drop every annotation of `node` and its inheritance link.
    pub fn strip(&self, node: NodeId) {
        self.entries.remove(&node);
        self.inherits.remove(&node);
    }

    /// [`strip`](Self::strip) every node of `tree`.
    ///
    /// # Errors
    /// Propagates errors from the tree walk.
    pub fn strip_tree(&self, tree: &PayloadElement) -> Result<()> {
        for node in tree.node_ids()? {
            self.strip(node);
        }
        Ok(())
    }

    /// Drop the `T` annotation from every node. Other kinds are untouched.
    pub fn clear_kind<T: Any + Send + Sync>(&self) {
        let type_id = TypeId::of::<T>();
        self.entries.retain(|_, slots| {
            slots.remove(&type_id);
            !slots.is_empty()
        });
    }

    /// Make lookups on `node` fall back to `source` for kinds `node` lacks.
    ///
    /// The link is lookup-only; it does not keep `source` alive or copy anything.
    pub fn inherit_from(&self, node: NodeId, source: NodeId) {
        self.inherits.insert(node, source);
    }

    /// Copy every annotation set directly on `from` onto `to`, replacing
    /// kinds `to` already has.
    pub fn copy_annotations(&self, from: NodeId, to: NodeId) {
        let Some(source) = self.entries.get(&from).map(|slots| slots.clone()) else {
            return;
        };
        self.entries.entry(to).or_default().extend(source);
    }

    /// Number of nodes carrying at least one annotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::element::{
        EntityInstance, NavigationPropertyInstance, PayloadNode, PrimitiveProperty, PrimitiveValue,
    };

    #[derive(Debug, PartialEq)]
    struct TypeHint(&'static str);

    #[derive(Debug, PartialEq)]
    struct Origin(u32);

    #[test]
    fn test_set_then_get() {
        let table = AnnotationTable::new();
        let node = PrimitiveValue::new(1_i32);
        table.set(node.id(), TypeHint("Edm.Int32"));
        assert_eq!(
            table.get::<TypeHint>(node.id()).as_deref(),
            Some(&TypeHint("Edm.Int32"))
        );
    }

    #[test]
    fn test_identical_nodes_annotated_independently() {
        let table = AnnotationTable::new();
        let a = PrimitiveValue::new("same");
        let b = PrimitiveValue::new("same");
        table.set(a.id(), TypeHint("a"));

        assert!(table.get::<TypeHint>(b.id()).is_none());
    }

    #[test]
    fn test_set_replaces_and_returns_previous() {
        let table = AnnotationTable::new();
        let node = NodeId::fresh();
        assert!(table.set(node, Origin(1)).is_none());
        let previous = table.set(node, Origin(2));
        assert_eq!(previous.as_deref(), Some(&Origin(1)));
        assert_eq!(table.get::<Origin>(node).as_deref(), Some(&Origin(2)));
    }

    #[test]
    fn test_clear_kind_keeps_other_kinds() {
        let table = AnnotationTable::new();
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        table.set(a, TypeHint("a"));
        table.set(a, Origin(1));
        table.set(b, TypeHint("b"));

        table.clear_kind::<TypeHint>();

        assert!(table.get::<TypeHint>(a).is_none());
        assert!(table.get::<TypeHint>(b).is_none());
        assert_eq!(table.get::<Origin>(a).as_deref(), Some(&Origin(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_single_kind() {
        let table = AnnotationTable::new();
        let node = NodeId::fresh();
        table.set(node, TypeHint("x"));
        table.set(node, Origin(3));

        assert_eq!(table.remove::<TypeHint>(node).as_deref(), Some(&TypeHint("x")));
        assert!(table.contains::<Origin>(node));
        table.remove::<Origin>(node);
        assert!(table.is_empty());
    }

    #[test]
    fn test_inheritance_is_lookup_only() {
        let table = AnnotationTable::new();
        let parent = NodeId::fresh();
        let child = NodeId::fresh();
        table.set(parent, TypeHint("parent"));
        table.inherit_from(child, parent);

        assert_eq!(
            table.get::<TypeHint>(child).as_deref(),
            Some(&TypeHint("parent"))
        );
        assert!(table.get_own::<TypeHint>(child).is_none());

        table.set(child, TypeHint("child"));
        assert_eq!(
            table.get::<TypeHint>(child).as_deref(),
            Some(&TypeHint("child"))
        );
        assert_eq!(
            table.get::<TypeHint>(parent).as_deref(),
            Some(&TypeHint("parent"))
        );
    }

    #[test]
    fn test_strip_tree_drops_only_its_own_rows() {
        let table = AnnotationTable::new();
        let entity = EntityInstance::new("NS.Customer")
            .with_property(PrimitiveProperty::new("Id", 1_i32))
            .with_navigation_property(NavigationPropertyInstance::deferred(
                "Orders",
                "C(1)/Orders",
            ));
        let property = entity.properties[0].header().id();
        let navigation = entity.navigation_properties[0].header.id();
        let tree: PayloadElement = entity.into();
        let outsider = NodeId::fresh();

        table.set(tree.id(), TypeHint("entity"));
        table.set(property, Origin(1));
        table.set(navigation, Origin(2));
        table.inherit_from(property, tree.id());
        table.set(outsider, Origin(3));

        table.strip_tree(&tree).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.get::<TypeHint>(property).is_none());
        assert_eq!(table.get::<Origin>(outsider).as_deref(), Some(&Origin(3)));
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let table = AnnotationTable::new();
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        table.inherit_from(a, b);
        table.inherit_from(b, a);
        assert!(table.get::<TypeHint>(a).is_none());
    }

    #[test]
    fn test_parallel_access() {
        let table = Arc::new(AnnotationTable::new());
        let nodes: Vec<NodeId> = (0..64).map(|_| NodeId::fresh()).collect();

        let handles: Vec<_> = (0..4_u32)
            .map(|worker| {
                let table = Arc::clone(&table);
                let nodes = nodes.clone();
                std::thread::spawn(move || {
                    for (i, node) in nodes.iter().enumerate() {
                        if i % 4 == worker as usize {
                            table.set(*node, Origin(worker));
                        }
                        let _ = table.get::<Origin>(*node);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.len(), 64);
        for (i, node) in nodes.iter().enumerate() {
            let expected = u32::try_from(i % 4).unwrap();
            assert_eq!(table.get::<Origin>(*node).as_deref(), Some(&Origin(expected)));
        }
    }
}
