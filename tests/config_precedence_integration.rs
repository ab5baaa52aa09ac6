use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TestConfig {
    root: PathBuf,
}

impl TestConfig {
    fn new() -> Self {
        let root = unique_temp_dir("config-precedence");
        fs::create_dir_all(root.join("data")).expect("create data dir");
        fs::write(
            root.join("data").join("nodes.csv"),
            "node_id,type,name\nA,drug,Aspirin\n",
        )
        .expect("write nodes.csv");
        fs::write(
            root.join("data").join("edges.csv"),
            "drug_id,disease_id,subject_id\n\
             A,X,p1\nA,Y,p1\nA,Z,p1\n\
             B,X,p2\nB,Y,p2\nB,Z,p2\n\
             C,X,p3\nC,Y,p3\n",
        )
        .expect("write edges.csv");
        fs::write(
            root.join("medgraph.toml"),
            r#"[inputs]
edges = "data/edges.csv"
nodes = "data/nodes.csv"

[output]
dir = "from-file"

[analysis]
min_shared = 3
top_k = 1
"#,
        )
        .expect("write medgraph.toml");
        Self { root }
    }

    fn run(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(medgraph_bin());
        cmd.current_dir(&self.root)
            .env_remove("MEDGRAPH_CONFIG")
            .env_remove("MEDGRAPH_OUTDIR")
            .arg("--no-color")
            .args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        let output = cmd.output().expect("run medgraph");
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        assert!(output.status.success(), "medgraph failed\nstderr:\n{stderr}");
        output
    }
}

impl Drop for TestConfig {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn medgraph_bin() -> PathBuf {
    PathBuf::from(
        std::env::var("CARGO_BIN_EXE_medgraph")
            .expect("CARGO_BIN_EXE_medgraph is not set for integration test"),
    )
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("medgraph-{prefix}-{pid}-{nanos}"))
}

#[test]
fn config_file_sets_inputs_and_analysis_parameters() {
    let config = TestConfig::new();
    config.run(&["--config", "medgraph.toml"], &[]);

    let outdir = config.root.join("from-file");
    let projection = fs::read_to_string(outdir.join("drug_drug_projection.csv"))
        .expect("read drug projection");
    assert_eq!(
        projection,
        "id_a,id_b,shared_count,jaccard,degree_a,degree_b,name_a,name_b\n\
         A,B,3,1.0,3,3,Aspirin,B\n"
    );

    let top = fs::read_to_string(outdir.join("top_diseases_per_drug.csv")).expect("read top");
    assert_eq!(top.lines().count(), 4);

    let readme = fs::read_to_string(outdir.join("README.txt")).expect("read readme");
    assert!(readme.contains("shared drugs >= 3"));
    assert!(readme.contains("(top 1 per node)"));
}

#[test]
fn config_can_come_from_environment() {
    let config = TestConfig::new();
    config.run(&[], &[("MEDGRAPH_CONFIG", "medgraph.toml")]);
    assert!(config
        .root
        .join("from-file")
        .join("graph.graphml")
        .is_file());
}

#[test]
fn outdir_env_beats_file_and_flag_beats_env() {
    let config = TestConfig::new();

    config.run(
        &["--config", "medgraph.toml"],
        &[("MEDGRAPH_OUTDIR", "from-env")],
    );
    assert!(config.root.join("from-env").join("graph.graphml").is_file());
    assert!(!config.root.join("from-file").exists());

    config.run(
        &["--config", "medgraph.toml", "--outdir", "from-flag"],
        &[("MEDGRAPH_OUTDIR", "from-env-2")],
    );
    assert!(config.root.join("from-flag").join("graph.graphml").is_file());
    assert!(!config.root.join("from-env-2").exists());
}

#[test]
fn invalid_min_shared_is_rejected() {
    let config = TestConfig::new();
    fs::write(
        config.root.join("bad.toml"),
        "[analysis]\nmin_shared = 1\n",
    )
    .expect("write bad config");

    let output = Command::new(medgraph_bin())
        .current_dir(&config.root)
        .env_remove("MEDGRAPH_CONFIG")
        .env_remove("MEDGRAPH_OUTDIR")
        .arg("--config")
        .arg("bad.toml")
        .output()
        .expect("run medgraph");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("analysis.min_shared"), "stderr:\n{stderr}");
}
