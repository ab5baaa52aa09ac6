use crate::config::RunConfig;
use crate::core::NodeKind;
use crate::error::Result;
use crate::graph::{build_graph, project, rank_nodes, top_associations};
use crate::load::{load_inputs, LoadReport};
use crate::report::{write_outputs, Artifacts, ReadmeContext, WrittenFile};

#[derive(Debug)]
pub struct RunReport {
    pub load: LoadReport,
    pub drugs: usize,
    pub diseases: usize,
    pub associations: usize,
    pub disease_pairs: usize,
    pub drug_pairs: usize,
    pub written: Vec<WrittenFile>,
}

/// load -> build -> summarize -> project -> write.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let data = load_inputs(&config.inputs.nodes, &config.inputs.edges)?;
    let graph = build_graph(&data.nodes, &data.associations)?;

    let disease_summary = rank_nodes(&graph, NodeKind::Disease);
    let drug_summary = rank_nodes(&graph, NodeKind::Drug);
    let top_diseases_per_drug = top_associations(&graph, NodeKind::Drug, config.analysis.top_k);
    let top_drugs_per_disease = top_associations(&graph, NodeKind::Disease, config.analysis.top_k);

    let disease_projection = project(&graph, NodeKind::Disease, config.analysis.min_shared);
    let drug_projection = project(&graph, NodeKind::Drug, config.analysis.min_shared);

    let written = write_outputs(
        &config.output.dir,
        &Artifacts {
            graph: &graph,
            disease_summary: &disease_summary,
            drug_summary: &drug_summary,
            top_diseases_per_drug: &top_diseases_per_drug,
            top_drugs_per_disease: &top_drugs_per_disease,
            disease_projection: &disease_projection,
            drug_projection: &drug_projection,
        },
        &ReadmeContext {
            edges_path: &config.inputs.edges,
            nodes_path: &config.inputs.nodes,
            min_shared: config.analysis.min_shared,
            top_k: config.analysis.top_k,
        },
    )?;

    Ok(RunReport {
        load: data.report,
        drugs: graph.nodes_of(NodeKind::Drug).count(),
        diseases: graph.nodes_of(NodeKind::Disease).count(),
        associations: graph.edge_count(),
        disease_pairs: disease_projection.edges.len(),
        drug_pairs: drug_projection.edges.len(),
        written,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::run;
    use crate::config::RunConfig;
    use crate::load::SkipReason;
    use crate::report::{DRUG_PROJECTION_FILE, GRAPH_FILE};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("medgraph-{prefix}-{pid}-{nanos}"))
    }

    fn config_for(root: &std::path::Path, outdir: &str) -> RunConfig {
        let mut config = RunConfig::default();
        config.inputs.edges = root.join("edges.csv");
        config.inputs.nodes = root.join("nodes.csv");
        config.output.dir = root.join(outdir);
        config
    }

    #[test]
    fn runs_end_to_end_and_is_deterministic() {
        let root = unique_temp_dir("pipeline");
        fs::create_dir_all(&root).expect("create root");
        fs::write(
            root.join("nodes.csv"),
            "node_id,type,name\nA,drug,Drug A\nB,drug,Drug B\nX,disease,Disease X\n",
        )
        .expect("write nodes");
        fs::write(
            root.join("edges.csv"),
            "drug_id,disease_id,subject_id,admissions\n\
             A,X,p1,1\nA,Y,p1,1\nA,Z,p2,1\n\
             B,X,p3,1\nB,Y,p3,2\nB,W,p4,1\n\
             C,X,,1\n",
        )
        .expect("write edges");

        let first = run(&config_for(&root, "out1")).expect("first run");
        let second = run(&config_for(&root, "out2")).expect("second run");

        assert_eq!(first.drugs, 2);
        assert_eq!(first.diseases, 4);
        assert_eq!(first.associations, 6);
        assert_eq!(first.drug_pairs, 1);
        assert_eq!(first.disease_pairs, 1);
        assert_eq!(first.load.edges.skipped_for(SkipReason::MissingField), 1);
        assert_eq!(first.written.len(), 10);

        for (a, b) in first.written.iter().zip(&second.written) {
            let name = a.path.file_name().expect("file name");
            assert_eq!(
                fs::read(&a.path).expect("read first"),
                fs::read(&b.path).expect("read second"),
                "{} differs between runs",
                name.to_string_lossy()
            );
        }

        let projection =
            fs::read_to_string(root.join("out1").join(DRUG_PROJECTION_FILE)).expect("read");
        assert!(projection.contains("A,B,2,0.5,3,3,Drug A,Drug B"));
        assert!(root.join("out1").join(GRAPH_FILE).is_file());

        let _ = fs::remove_dir_all(root);
    }
}
