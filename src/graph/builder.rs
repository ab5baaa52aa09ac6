use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::core::{Association, Node, NodeId, NodeKind};
use crate::error::Result;
use crate::graph::BipartiteGraph;

/// Joins node attributes onto the aggregated associations. Every declared
/// node is kept, and edge endpoints missing from `nodes` get a bare record.
pub fn build_graph(
    nodes: &BTreeMap<NodeId, Node>,
    associations: &[Association],
) -> Result<BipartiteGraph> {
    let mut ordered: BTreeMap<(NodeKind, NodeId), Node> = nodes
        .values()
        .map(|node| ((node.kind, node.id.clone()), node.clone()))
        .collect();

    for association in associations {
        for kind in [NodeKind::Drug, NodeKind::Disease] {
            let id = association.endpoint(kind);
            if let Some(declared) = nodes.get(id) {
                if declared.kind != kind {
                    return Err(anyhow!(
                        "{} is declared as a {} but used as a {}",
                        id,
                        declared.kind,
                        kind
                    )
                    .into());
                }
                continue;
            }
            ordered
                .entry((kind, id.clone()))
                .or_insert_with(|| Node::bare(id.clone(), kind));
        }
    }

    let mut graph = BipartiteGraph::new();
    for ((kind, id), node) in ordered {
        if graph.node(&id).is_some() {
            return Err(anyhow!("{} is used as both drug and disease (as {})", id, kind).into());
        }
        graph.insert_node(node);
    }

    let mut associations = associations.to_vec();
    associations.sort_by(|a, b| (&a.drug, &a.disease).cmp(&(&b.drug, &b.disease)));
    for association in associations {
        let pair = format!("{} -> {}", association.drug, association.disease);
        graph
            .insert_association(association)
            .ok_or_else(|| anyhow!("association {pair} references an unknown node"))?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::build_graph;
    use crate::core::{Association, Node, NodeId, NodeKind};

    fn assoc(drug: &str, disease: &str, weight: u64) -> Association {
        Association::new(NodeId::new(drug), NodeId::new(disease), weight, 1)
    }

    fn declared(id: &str, kind: NodeKind, name: &str) -> (NodeId, Node) {
        let mut node = Node::bare(NodeId::new(id), kind);
        node.name = Some(name.to_string());
        (NodeId::new(id), node)
    }

    #[test]
    fn adds_bare_nodes_for_undeclared_endpoints() {
        let nodes: BTreeMap<_, _> = [declared("ASP", NodeKind::Drug, "Aspirin")]
            .into_iter()
            .collect();
        let graph = build_graph(&nodes, &[assoc("ASP", "FLU", 3)]).expect("build graph");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let flu = graph.node(&NodeId::new("FLU")).expect("influenza node");
        assert_eq!(flu.kind, NodeKind::Disease);
        assert_eq!(flu.display_name(), "FLU");
        assert_eq!(graph.display_name(&NodeId::new("ASP")), "Aspirin");
    }

    #[test]
    fn keeps_declared_nodes_without_edges() {
        let nodes: BTreeMap<_, _> = [
            declared("ASP", NodeKind::Drug, "Aspirin"),
            declared("GOUT", NodeKind::Disease, "Gout"),
        ]
        .into_iter()
        .collect();
        let graph = build_graph(&nodes, &[]).expect("build graph");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn edges_never_join_nodes_of_the_same_kind() {
        let graph = build_graph(
            &BTreeMap::new(),
            &[assoc("A", "X", 1), assoc("B", "X", 2), assoc("A", "Y", 1)],
        )
        .expect("build graph");

        let inner = graph.inner();
        for edge in inner.edge_indices() {
            let (a, b) = inner.edge_endpoints(edge).expect("endpoints");
            assert_ne!(inner[a].kind, inner[b].kind);
        }
        let drugs: Vec<_> = graph
            .nodes_of(NodeKind::Drug)
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(drugs, vec!["A", "B"]);
    }

    #[test]
    fn rejects_endpoint_declared_with_other_kind() {
        let nodes: BTreeMap<_, _> = [declared("X", NodeKind::Drug, "Not a disease")]
            .into_iter()
            .collect();
        assert!(build_graph(&nodes, &[assoc("A", "X", 1)]).is_err());
    }

    #[test]
    fn rejects_identifier_used_as_both_kinds() {
        assert!(build_graph(&BTreeMap::new(), &[assoc("A", "X", 1), assoc("X", "Y", 1)]).is_err());
    }
}
