use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::core::NodeKind;
use crate::error::{MedgraphError, Result};
use crate::graph::{BipartiteGraph, NodeSummary, Projection, RankedAssociation};
use crate::util::template::render_template;

pub mod graphml;
pub mod tables;

pub const GRAPH_FILE: &str = "graph.graphml";
pub const DISEASE_PROJECTION_GRAPH_FILE: &str = "disease_disease_projection.graphml";
pub const DRUG_PROJECTION_GRAPH_FILE: &str = "drug_drug_projection.graphml";
pub const DISEASE_SUMMARY_FILE: &str = "summary_diseases_by_frequency.csv";
pub const DRUG_SUMMARY_FILE: &str = "summary_drugs_by_admissions.csv";
pub const TOP_DISEASES_FILE: &str = "top_diseases_per_drug.csv";
pub const TOP_DRUGS_FILE: &str = "top_drugs_per_disease.csv";
pub const DISEASE_PROJECTION_FILE: &str = "disease_disease_projection.csv";
pub const DRUG_PROJECTION_FILE: &str = "drug_drug_projection.csv";
pub const README_FILE: &str = "README.txt";

const README_TEMPLATE: &str = "\
Inputs: {{ edges }}, {{ nodes }}
Graph: {{ drugs }} drugs, {{ diseases }} diseases, {{ associations }} drug-disease edges
Outputs:
- {{ files.graph }} (drug-disease), {{ files.disease_graph }}, {{ files.drug_graph }}
- {{ files.disease_summary }}, {{ files.drug_summary }}
- {{ files.top_diseases }}, {{ files.top_drugs }} (top {{ top_k }} per node)
- {{ files.disease_projection }} (shared drugs >= {{ min_shared }}, Jaccard), \
{{ files.drug_projection }} (shared diseases >= {{ min_shared }}, Jaccard)
Notes: weight = admission count; patients = distinct subjects per edge; Jaccard on neighbor sets.
p_disease_given_drug / p_drug_given_disease: mean of edges.csv values, else weight / node total weight.
";

/// Everything the writer needs, computed before the first file is touched.
#[derive(Debug)]
pub struct Artifacts<'a> {
    pub graph: &'a BipartiteGraph,
    pub disease_summary: &'a [NodeSummary],
    pub drug_summary: &'a [NodeSummary],
    pub top_diseases_per_drug: &'a [RankedAssociation],
    pub top_drugs_per_disease: &'a [RankedAssociation],
    pub disease_projection: &'a Projection,
    pub drug_projection: &'a Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Graph,
    Table,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub kind: OutputKind,
    /// Rows for tables, edges for graphs.
    pub records: usize,
}

impl WrittenFile {
    pub fn is_empty(&self) -> bool {
        self.kind != OutputKind::Text && self.records == 0
    }
}

#[derive(Debug, Clone)]
pub struct ReadmeContext<'a> {
    pub edges_path: &'a Path,
    pub nodes_path: &'a Path,
    pub min_shared: usize,
    pub top_k: usize,
}

/// Writes every output into `outdir`. The first failure aborts the run.
pub fn write_outputs(
    outdir: &Path,
    artifacts: &Artifacts<'_>,
    readme: &ReadmeContext<'_>,
) -> Result<Vec<WrittenFile>> {
    fs::create_dir_all(outdir).map_err(|err| MedgraphError::output(outdir, err))?;
    let mut written = Vec::new();
    let graph = artifacts.graph;

    let doc = graphml::bipartite_document(graph);
    written.push(write_graph(outdir.join(GRAPH_FILE), &doc)?);
    let doc = graphml::projection_document(graph, artifacts.disease_projection);
    written.push(write_graph(outdir.join(DISEASE_PROJECTION_GRAPH_FILE), &doc)?);
    let doc = graphml::projection_document(graph, artifacts.drug_projection);
    written.push(write_graph(outdir.join(DRUG_PROJECTION_GRAPH_FILE), &doc)?);

    let path = outdir.join(DISEASE_SUMMARY_FILE);
    let records = tables::write_summary(
        &path,
        tables::DISEASE_SUMMARY_HEADERS,
        artifacts.disease_summary,
    )?;
    written.push(table(path, records));

    let path = outdir.join(DRUG_SUMMARY_FILE);
    let records =
        tables::write_summary(&path, tables::DRUG_SUMMARY_HEADERS, artifacts.drug_summary)?;
    written.push(table(path, records));

    let path = outdir.join(TOP_DISEASES_FILE);
    let records = tables::write_top(&path, artifacts.top_diseases_per_drug)?;
    written.push(table(path, records));

    let path = outdir.join(TOP_DRUGS_FILE);
    let records = tables::write_top(&path, artifacts.top_drugs_per_disease)?;
    written.push(table(path, records));

    let path = outdir.join(DISEASE_PROJECTION_FILE);
    let records = tables::write_projection(&path, graph, artifacts.disease_projection)?;
    written.push(table(path, records));

    let path = outdir.join(DRUG_PROJECTION_FILE);
    let records = tables::write_projection(&path, graph, artifacts.drug_projection)?;
    written.push(table(path, records));

    let path = outdir.join(README_FILE);
    let text = render_readme(graph, readme)?;
    fs::write(&path, text).map_err(|err| MedgraphError::output(&path, err))?;
    written.push(WrittenFile {
        path,
        kind: OutputKind::Text,
        records: 0,
    });

    Ok(written)
}

pub fn render_readme(graph: &BipartiteGraph, readme: &ReadmeContext<'_>) -> Result<String> {
    render_template(
        README_TEMPLATE,
        &json!({
            "edges": readme.edges_path.display().to_string(),
            "nodes": readme.nodes_path.display().to_string(),
            "drugs": graph.nodes_of(NodeKind::Drug).count(),
            "diseases": graph.nodes_of(NodeKind::Disease).count(),
            "associations": graph.edge_count(),
            "min_shared": readme.min_shared,
            "top_k": readme.top_k,
            "files": {
                "graph": GRAPH_FILE,
                "disease_graph": DISEASE_PROJECTION_GRAPH_FILE,
                "drug_graph": DRUG_PROJECTION_GRAPH_FILE,
                "disease_summary": DISEASE_SUMMARY_FILE,
                "drug_summary": DRUG_SUMMARY_FILE,
                "top_diseases": TOP_DISEASES_FILE,
                "top_drugs": TOP_DRUGS_FILE,
                "disease_projection": DISEASE_PROJECTION_FILE,
                "drug_projection": DRUG_PROJECTION_FILE,
            },
        }),
    )
}

fn write_graph(path: PathBuf, doc: &graphml::GraphMl) -> Result<WrittenFile> {
    let text = doc.render().map_err(|err| MedgraphError::output(&path, err))?;
    fs::write(&path, text).map_err(|err| MedgraphError::output(&path, err))?;
    Ok(WrittenFile {
        path,
        kind: OutputKind::Graph,
        records: doc.edge_count(),
    })
}

fn table(path: PathBuf, records: usize) -> WrittenFile {
    WrittenFile {
        path,
        kind: OutputKind::Table,
        records,
    }
}
