use std::collections::BTreeMap;

use crate::core::{Association, NodeId, NodeKind};
use crate::graph::ops::{degree, incident_associations};
use crate::graph::BipartiteGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub total_weight: u64,
    pub total_patients: u64,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedAssociation {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: u64,
    pub patients: u64,
    pub rank: usize,
    pub source_name: String,
    pub target_name: String,
    pub probabilities: Conditionals,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditionals {
    pub disease_given_drug: f64,
    pub drug_given_disease: f64,
}

/// Total association weight per node, used to derive conditional
/// probabilities that edges.csv did not supply.
#[derive(Debug, Clone, Default)]
pub struct WeightTotals {
    totals: BTreeMap<NodeId, u64>,
}

impl WeightTotals {
    pub fn new(graph: &BipartiteGraph) -> Self {
        let mut totals: BTreeMap<NodeId, u64> = BTreeMap::new();
        for assoc in graph.associations() {
            for id in [&assoc.drug, &assoc.disease] {
                let total = totals.entry(id.clone()).or_insert(0);
                *total = total.saturating_add(assoc.weight);
            }
        }
        Self { totals }
    }

    pub fn total(&self, id: &NodeId) -> u64 {
        self.totals.get(id).copied().unwrap_or(0)
    }

    /// Reported values win; otherwise the association's share of the
    /// conditioning node's total weight.
    pub fn conditionals(&self, assoc: &Association) -> Conditionals {
        Conditionals {
            disease_given_drug: assoc
                .reported
                .disease_given_drug
                .unwrap_or_else(|| share(assoc.weight, self.total(&assoc.drug))),
            drug_given_disease: assoc
                .reported
                .drug_given_disease
                .unwrap_or_else(|| share(assoc.weight, self.total(&assoc.disease))),
        }
    }
}

fn share(weight: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        weight as f64 / total as f64
    }
}

fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

/// Nodes of `kind` with at least one edge, by total weight descending and
/// identifier ascending on ties.
pub fn rank_nodes(graph: &BipartiteGraph, kind: NodeKind) -> Vec<NodeSummary> {
    let mut summaries: Vec<NodeSummary> = graph
        .nodes_of(kind)
        .filter_map(|node| {
            let incident = incident_associations(graph, &node.id);
            if incident.is_empty() {
                return None;
            }
            Some(NodeSummary {
                id: node.id.clone(),
                name: node.display_name().to_string(),
                total_weight: saturating_total(incident.iter().map(|assoc| assoc.weight)),
                total_patients: saturating_total(incident.iter().map(|assoc| assoc.patients)),
                degree: degree(graph, &node.id),
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_weight
            .cmp(&a.total_weight)
            .then_with(|| a.id.cmp(&b.id))
    });
    summaries
}

/// For each node of `kind`, its `k` heaviest associations. Rows are grouped
/// by source identifier; ranks start at 1.
pub fn top_associations(graph: &BipartiteGraph, kind: NodeKind, k: usize) -> Vec<RankedAssociation> {
    let other = kind.opposite();
    let totals = WeightTotals::new(graph);
    let mut rows = Vec::new();

    for node in graph.nodes_of(kind) {
        let mut incident = incident_associations(graph, &node.id);
        incident.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.endpoint(other).cmp(b.endpoint(other)))
        });

        for (idx, assoc) in incident.into_iter().take(k).enumerate() {
            let target = assoc.endpoint(other);
            rows.push(RankedAssociation {
                source: node.id.clone(),
                target: target.clone(),
                weight: assoc.weight,
                patients: assoc.patients,
                rank: idx + 1,
                source_name: node.display_name().to_string(),
                target_name: graph.display_name(target).to_string(),
                probabilities: totals.conditionals(assoc),
            });
        }
    }

    rows
}
