use std::collections::{BTreeMap, BTreeSet};

use petgraph::visit::EdgeRef;

use crate::core::{Association, NodeId, NodeKind};
use crate::graph::BipartiteGraph;

pub fn incident_associations<'g>(graph: &'g BipartiteGraph, id: &NodeId) -> Vec<&'g Association> {
    let Some(idx) = graph.index_of(id) else {
        return Vec::new();
    };
    graph
        .inner()
        .edges(idx)
        .map(|edge| edge.weight())
        .collect()
}

pub fn neighbor_ids(graph: &BipartiteGraph, id: &NodeId) -> BTreeSet<NodeId> {
    let Some(idx) = graph.index_of(id) else {
        return BTreeSet::new();
    };
    graph
        .inner()
        .neighbors(idx)
        .map(|nbr| graph.inner()[nbr].id.clone())
        .collect()
}

pub fn degree(graph: &BipartiteGraph, id: &NodeId) -> usize {
    neighbor_ids(graph, id).len()
}

/// Neighbor sets for every node of `kind` that has at least one edge.
pub fn neighbor_sets(graph: &BipartiteGraph, kind: NodeKind) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    graph
        .nodes_of(kind)
        .map(|node| (node.id.clone(), neighbor_ids(graph, &node.id)))
        .filter(|(_, neighbors)| !neighbors.is_empty())
        .collect()
}

pub fn jaccard(a: &BTreeSet<NodeId>, b: &BTreeSet<NodeId>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::{degree, incident_associations, jaccard, neighbor_ids, neighbor_sets};
    use crate::core::{Association, NodeId, NodeKind};
    use crate::graph::build_graph;

    fn ids(values: &[&str]) -> BTreeSet<NodeId> {
        values.iter().map(|v| NodeId::new(*v)).collect()
    }

    fn assoc(drug: &str, disease: &str, weight: u64) -> Association {
        Association::new(NodeId::new(drug), NodeId::new(disease), weight, 1)
    }

    #[test]
    fn neighbors_ignore_edge_weight() {
        let graph = build_graph(
            &BTreeMap::new(),
            &[assoc("A", "X", 100), assoc("A", "Y", 1), assoc("B", "X", 0)],
        )
        .expect("build graph");

        assert_eq!(neighbor_ids(&graph, &NodeId::new("A")), ids(&["X", "Y"]));
        assert_eq!(neighbor_ids(&graph, &NodeId::new("X")), ids(&["A", "B"]));
        assert_eq!(degree(&graph, &NodeId::new("B")), 1);
        assert_eq!(incident_associations(&graph, &NodeId::new("A")).len(), 2);
        assert!(neighbor_ids(&graph, &NodeId::new("missing")).is_empty());

        let diseases = neighbor_sets(&graph, NodeKind::Disease);
        assert_eq!(diseases.len(), 2);
    }

    #[test]
    fn jaccard_bounds() {
        assert_eq!(jaccard(&ids(&["X", "Y", "Z"]), &ids(&["X", "Y", "W"])), 0.5);
        assert_eq!(jaccard(&ids(&["X", "Y"]), &ids(&["Y", "X"])), 1.0);
        assert_eq!(jaccard(&ids(&["X"]), &ids(&["Y"])), 0.0);
        assert_eq!(jaccard(&ids(&[]), &ids(&[])), 0.0);
    }
}
