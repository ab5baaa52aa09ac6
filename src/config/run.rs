use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ConfigError, Result};

pub const DEFAULT_MIN_SHARED: usize = 2;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    #[serde(default = "default_edges_path")]
    pub edges: PathBuf,
    #[serde(default = "default_nodes_path")]
    pub nodes: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            edges: default_edges_path(),
            nodes: default_nodes_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_min_shared")]
    pub min_shared: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_shared: default_min_shared(),
            top_k: default_top_k(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.analysis.min_shared < DEFAULT_MIN_SHARED {
            return Err(ConfigError::InvalidValue {
                key: "analysis.min_shared",
                message: format!(
                    "must be at least {DEFAULT_MIN_SHARED}, got {}",
                    self.analysis.min_shared
                ),
            });
        }
        if self.analysis.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.top_k",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_edges_path() -> PathBuf {
    PathBuf::from("edges.csv")
}

fn default_nodes_path() -> PathBuf {
    PathBuf::from("nodes.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_min_shared() -> usize {
    DEFAULT_MIN_SHARED
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
