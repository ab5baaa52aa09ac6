use std::collections::BTreeMap;

use crate::core::{NodeId, NodeKind, ProjectionEdge};
use crate::graph::ops::{neighbor_ids, neighbor_sets};
use crate::graph::BipartiteGraph;

#[derive(Debug, Clone)]
pub struct Projection {
    pub kind: NodeKind,
    pub min_shared: usize,
    pub edges: Vec<ProjectionEdge>,
}

impl Projection {
    /// Node identifiers touched by a retained pair, ascending.
    pub fn node_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self
            .edges
            .iter()
            .flat_map(|edge| [&edge.a, &edge.b])
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Same-kind projection of the bipartite graph. Pairs are counted by
/// walking each opposite-kind node's neighbor list, so only pairs with at
/// least one shared neighbor are ever considered.
pub fn project(graph: &BipartiteGraph, kind: NodeKind, min_shared: usize) -> Projection {
    let neighbors = neighbor_sets(graph, kind);
    let mut shared: BTreeMap<(NodeId, NodeId), usize> = BTreeMap::new();

    for pivot in graph.nodes_of(kind.opposite()) {
        let members: Vec<NodeId> = neighbor_ids(graph, &pivot.id).into_iter().collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                *shared.entry((a.clone(), b.clone())).or_insert(0) += 1;
            }
        }
    }

    let mut edges: Vec<ProjectionEdge> = shared
        .into_iter()
        .filter(|(_, count)| *count >= min_shared)
        .map(|((a, b), count)| {
            let degree_a = neighbors.get(&a).map_or(0, |set| set.len());
            let degree_b = neighbors.get(&b).map_or(0, |set| set.len());
            let union = degree_a + degree_b - count;
            ProjectionEdge {
                a,
                b,
                shared_count: count,
                jaccard: count as f64 / union as f64,
                degree_a,
                degree_b,
            }
        })
        .collect();

    edges.sort_by(|x, y| {
        y.shared_count
            .cmp(&x.shared_count)
            .then_with(|| y.jaccard.total_cmp(&x.jaccard))
            .then_with(|| x.a.cmp(&y.a))
            .then_with(|| x.b.cmp(&y.b))
    });

    Projection {
        kind,
        min_shared,
        edges,
    }
}
