use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, Result, RunConfig};

pub const CONFIG_ENV: &str = "MEDGRAPH_CONFIG";
pub const OUTDIR_ENV: &str = "MEDGRAPH_OUTDIR";

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub edges: Option<PathBuf>,
    pub nodes: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
}

pub fn resolve_run_config(
    config_path: Option<PathBuf>,
    overrides: PathOverrides,
) -> Result<RunConfig> {
    let config_path = config_path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let env_outdir = env::var_os(OUTDIR_ENV).map(PathBuf::from);
    resolve_with(config_path, env_outdir, overrides)
}

fn resolve_with(
    config_path: Option<PathBuf>,
    env_outdir: Option<PathBuf>,
    overrides: PathOverrides,
) -> Result<RunConfig> {
    let mut config = match config_path {
        Some(path) => load_run_config(&path)?,
        None => RunConfig::default(),
    };

    if let Some(outdir) = env_outdir {
        config.output.dir = outdir;
    }
    if let Some(edges) = overrides.edges {
        config.inputs.edges = edges;
    }
    if let Some(nodes) = overrides.nodes {
        config.inputs.nodes = nodes;
    }
    if let Some(outdir) = overrides.outdir {
        config.output.dir = outdir;
    }

    config.validate()?;
    Ok(config)
}

pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    let mut config: RunConfig = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(base) = path.parent() {
        rebase(&mut config.inputs.edges, base);
        rebase(&mut config.inputs.nodes, base);
        rebase(&mut config.output.dir, base);
    }
    Ok(config)
}

fn rebase(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
