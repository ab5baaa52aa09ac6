use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::graph::{BipartiteGraph, NodeSummary, Projection, RankedAssociation};
use crate::error::{MedgraphError, Result};

pub const DISEASE_SUMMARY_HEADERS: &[&str] = &[
    "id",
    "name",
    "total_weight",
    "total_patients",
    "distinct_drugs",
];
pub const DRUG_SUMMARY_HEADERS: &[&str] = &[
    "id",
    "name",
    "total_weight",
    "total_patients",
    "distinct_diseases",
];
pub const TOP_HEADERS: &[&str] = &[
    "source_id",
    "target_id",
    "weight",
    "rank",
    "patients",
    "source_name",
    "target_name",
    "p_disease_given_drug",
    "p_drug_given_disease",
];
pub const PROJECTION_HEADERS: &[&str] = &[
    "id_a",
    "id_b",
    "shared_count",
    "jaccard",
    "degree_a",
    "degree_b",
    "name_a",
    "name_b",
];

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    id: &'a str,
    name: &'a str,
    total_weight: u64,
    total_patients: u64,
    distinct_neighbors: usize,
}

#[derive(Debug, Serialize)]
struct TopRow<'a> {
    source_id: &'a str,
    target_id: &'a str,
    weight: u64,
    rank: usize,
    patients: u64,
    source_name: &'a str,
    target_name: &'a str,
    p_disease_given_drug: f64,
    p_drug_given_disease: f64,
}

#[derive(Debug, Serialize)]
struct ProjectionRow<'a> {
    id_a: &'a str,
    id_b: &'a str,
    shared_count: usize,
    jaccard: f64,
    degree_a: usize,
    degree_b: usize,
    name_a: &'a str,
    name_b: &'a str,
}

pub fn write_summary(path: &Path, headers: &[&str], summaries: &[NodeSummary]) -> Result<usize> {
    let rows = summaries.iter().map(|summary| SummaryRow {
        id: summary.id.as_str(),
        name: &summary.name,
        total_weight: summary.total_weight,
        total_patients: summary.total_patients,
        distinct_neighbors: summary.degree,
    });
    write_table(path, headers, rows)
}

pub fn write_top(path: &Path, ranked: &[RankedAssociation]) -> Result<usize> {
    let rows = ranked.iter().map(|row| TopRow {
        source_id: row.source.as_str(),
        target_id: row.target.as_str(),
        weight: row.weight,
        rank: row.rank,
        patients: row.patients,
        source_name: &row.source_name,
        target_name: &row.target_name,
        p_disease_given_drug: row.probabilities.disease_given_drug,
        p_drug_given_disease: row.probabilities.drug_given_disease,
    });
    write_table(path, TOP_HEADERS, rows)
}

pub fn write_projection(path: &Path, graph: &BipartiteGraph, projection: &Projection) -> Result<usize> {
    let rows = projection.edges.iter().map(|edge| ProjectionRow {
        id_a: edge.a.as_str(),
        id_b: edge.b.as_str(),
        shared_count: edge.shared_count,
        jaccard: edge.jaccard,
        degree_a: edge.degree_a,
        degree_b: edge.degree_b,
        name_a: graph.display_name(&edge.a),
        name_b: graph.display_name(&edge.b),
    });
    write_table(path, PROJECTION_HEADERS, rows)
}

/// Header row is written explicitly so empty tables still carry it.
fn write_table<R, I>(path: &Path, headers: &[&str], rows: I) -> Result<usize>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| MedgraphError::output(path, err))?;
    writer
        .write_record(headers)
        .map_err(|err| MedgraphError::output(path, err))?;

    let mut count = 0;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| MedgraphError::output(path, err))?;
        count += 1;
    }
    writer
        .flush()
        .map_err(|err| MedgraphError::output(path, err))?;
    Ok(count)
}
