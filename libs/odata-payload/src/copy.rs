//! Deep copies with fresh node identities.
//!
//! `Clone` keeps every [`NodeId`], so a clone aliases the original in the
//! annotation table. A deep copy is structurally equal but a distinct tree.

use crate::annotation_table::AnnotationTable;
use crate::element::{ElementHeader, NodeId, PayloadElement};
use crate::error::Result;
use crate::visit_mut::PayloadVisitorMut;
use crate::visitor::PayloadVisitor;

/// Renumbers every node, recording `(old, new)` pairs in walk order.
#[derive(Default)]
struct Renumber {
    pairs: Vec<(NodeId, NodeId)>,
}

impl PayloadVisitorMut for Renumber {
    fn visit_header_mut(&mut self, header: &mut ElementHeader) -> Result<()> {
        let old = header.renumber();
        self.pairs.push((old, header.id()));
        Ok(())
    }
}

/// Collects node ids in walk order.
#[derive(Default)]
struct IdCollector {
    ids: Vec<NodeId>,
}

impl PayloadVisitor for IdCollector {
    fn visit_header(&mut self, header: &ElementHeader) -> Result<()> {
        self.ids.push(header.id());
        Ok(())
    }
}

impl PayloadElement {
    /// Structurally equal copy in which every node has a new identity.
    ///
    /// # Errors
    /// Propagates visitor errors; the default walk never fails.
    pub fn deep_copy(&self) -> Result<PayloadElement> {
        Ok(self.renumbered_copy()?.0)
    }

    /// Deep copy that also carries each node's side-table entries over to
    /// the corresponding copied node.
    ///
    /// # Errors
    /// Propagates visitor errors.
    pub fn deep_copy_with_annotations(&self, table: &AnnotationTable) -> Result<PayloadElement> {
        let (copy, pairs) = self.renumbered_copy()?;
        for (from, to) in pairs {
            table.copy_annotations(from, to);
        }
        Ok(copy)
    }

    fn renumbered_copy(&self) -> Result<(PayloadElement, Vec<(NodeId, NodeId)>)> {
        let mut copy = self.clone();
        let mut renumber = Renumber::default();
        renumber.visit_mut(&mut copy)?;
        Ok((copy, renumber.pairs))
    }

    /// Every node id in the tree, in walk order.
    ///
    /// # Errors
    /// Propagates visitor errors.
    pub fn node_ids(&self) -> Result<Vec<NodeId>> {
        let mut collector = IdCollector::default();
        collector.visit(self)?;
        Ok(collector.ids)
    }
}
