use crate::core::node::{NodeId, NodeKind};

/// Conditional probabilities supplied by edges.csv, averaged per pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportedProbabilities {
    pub disease_given_drug: Option<f64>,
    pub drug_given_disease: Option<f64>,
}

/// Aggregated drug-disease link.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub drug: NodeId,
    pub disease: NodeId,
    pub weight: u64,
    pub patients: u64,
    pub reported: ReportedProbabilities,
}

impl Association {
    pub fn new(drug: NodeId, disease: NodeId, weight: u64, patients: u64) -> Self {
        Self {
            drug,
            disease,
            weight,
            patients,
            reported: ReportedProbabilities::default(),
        }
    }

    pub fn endpoint(&self, kind: NodeKind) -> &NodeId {
        match kind {
            NodeKind::Drug => &self.drug,
            NodeKind::Disease => &self.disease,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionEdge {
    pub a: NodeId,
    pub b: NodeId,
    pub shared_count: usize,
    pub jaccard: f64,
    pub degree_a: usize,
    pub degree_b: usize,
}
