use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum MedgraphError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{} is missing required column '{column}'", path.display())]
    Schema { path: PathBuf, column: String },
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl MedgraphError {
    pub fn output(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::Output {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MedgraphError>;
