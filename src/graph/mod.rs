use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::core::{Association, Node, NodeId, NodeKind};

pub mod builder;
pub mod ops;
pub mod project;
pub mod summary;

pub use builder::build_graph;
pub use project::{project, Projection};
pub use summary::{
    rank_nodes, top_associations, Conditionals, NodeSummary, RankedAssociation, WeightTotals,
};

/// Drug-disease graph. Edges only ever join a drug to a disease.
#[derive(Debug, Default)]
pub struct BipartiteGraph {
    inner: UnGraph<Node, Association>,
    index: BTreeMap<NodeId, NodeIndex>,
}

impl BipartiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &UnGraph<Node, Association> {
        &self.inner
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index
            .get(id)
            .and_then(|idx| self.inner.node_weight(*idx))
    }

    pub fn display_name<'a>(&'a self, id: &'a NodeId) -> &'a str {
        self.node(id)
            .map(Node::display_name)
            .unwrap_or_else(|| id.as_str())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_indices().map(move |idx| &self.inner[idx])
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.inner.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub(crate) fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeIndex {
        if let Some(idx) = self.index.get(&node.id) {
            return *idx;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub(crate) fn insert_association(&mut self, association: Association) -> Option<()> {
        let drug = self.index_of(&association.drug)?;
        let disease = self.index_of(&association.disease)?;
        self.inner.add_edge(drug, disease, association);
        Some(())
    }
}
