use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, Trim};

use crate::core::{Association, Node, NodeId, NodeKind};
use crate::error::{MedgraphError, Result};

pub mod edges;
pub mod nodes;

pub use edges::{read_edges, EdgeAggregator, EdgeRow};
pub use nodes::read_nodes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingField,
    InvalidCount,
    InvalidProbability,
    UnknownType,
    Duplicate,
    TypeConflict,
    Unreadable,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing required field",
            Self::InvalidCount => "invalid admission count",
            Self::InvalidProbability => "invalid conditional probability",
            Self::UnknownType => "unknown node type",
            Self::Duplicate => "duplicate identifier",
            Self::TypeConflict => "drug/disease type conflict",
            Self::Unreadable => "unreadable record",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTally {
    pub rows: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl FileTally {
    pub fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub nodes: FileTally,
    pub edges: FileTally,
}

#[derive(Debug)]
pub struct LoadedData {
    pub nodes: BTreeMap<NodeId, Node>,
    pub kinds: BTreeMap<NodeId, NodeKind>,
    pub associations: Vec<Association>,
    pub report: LoadReport,
}

/// Reads nodes.csv then edges.csv. Node declarations fix identifier kinds
/// before any edge row is checked against them; identifiers only seen in
/// edges.csv take the single role they appear in.
pub fn load_inputs(nodes_path: &Path, edges_path: &Path) -> Result<LoadedData> {
    let mut report = LoadReport::default();
    let nodes = read_nodes(nodes_path, &mut report.nodes)?;
    let mut kinds: BTreeMap<NodeId, NodeKind> = nodes
        .values()
        .map(|node| (node.id.clone(), node.kind))
        .collect();
    let associations = read_edges(edges_path, &mut kinds, &mut report.edges)?;

    Ok(LoadedData {
        nodes,
        kinds,
        associations,
        report,
    })
}

pub(crate) fn open_reader(path: &Path) -> Result<(Reader<std::fs::File>, StringRecord)> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| input_error(path, source))?;
    let headers = reader
        .headers()
        .map_err(|source| input_error(path, source))?
        .clone();
    Ok((reader, headers))
}

pub(crate) fn input_error(path: &Path, source: csv::Error) -> MedgraphError {
    MedgraphError::Input {
        path: path.to_path_buf(),
        source,
    }
}

/// Position of the first alias in `names` present in `headers`. Earlier
/// aliases win regardless of column order.
pub(crate) fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|header| clean_header(header).eq_ignore_ascii_case(name))
    })
}

pub(crate) fn clean_header(header: &str) -> &str {
    header.trim().trim_start_matches('\u{feff}')
}

pub(crate) fn require_column(path: &Path, headers: &StringRecord, names: &[&str]) -> Result<usize> {
    find_column(headers, names).ok_or_else(|| MedgraphError::Schema {
        path: path.to_path_buf(),
        column: names[0].to_string(),
    })
}

pub(crate) fn field<'r>(record: &'r StringRecord, idx: usize) -> Option<&'r str> {
    record.get(idx).filter(|value| !value.is_empty())
}
