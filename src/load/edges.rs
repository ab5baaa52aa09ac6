use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use csv::StringRecord;

use crate::core::{Association, NodeId, NodeKind, ReportedProbabilities};
use crate::error::Result;
use crate::load::{field, find_column, input_error, open_reader, require_column, FileTally, SkipReason};

const DRUG_COLUMNS: &[&str] = &["drug_id", "src"];
const DISEASE_COLUMNS: &[&str] = &["disease_id", "dst"];
const SUBJECT_COLUMNS: &[&str] = &["subject_id", "subject"];
const COUNT_COLUMNS: &[&str] = &["admissions", "weight_admissions"];
const ADMISSION_ID_COLUMNS: &[&str] = &["admission_id", "hadm_id"];
const P_DISEASE_GIVEN_DRUG_COLUMNS: &[&str] = &["p_disease_given_drug"];
const P_DRUG_GIVEN_DISEASE_COLUMNS: &[&str] = &["p_drug_given_disease"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admissions {
    Count(u64),
    Id(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub drug: NodeId,
    pub disease: NodeId,
    pub subject: String,
    pub admissions: Admissions,
    pub reported: ReportedProbabilities,
}

#[derive(Debug, Clone, Copy)]
enum WeightColumn {
    Count(usize),
    AdmissionId(usize),
    PerRow,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    drug: usize,
    disease: usize,
    subject: usize,
    weight: WeightColumn,
    p_disease_given_drug: Option<usize>,
    p_drug_given_disease: Option<usize>,
}

#[derive(Debug, Default)]
struct PairTally {
    admissions: u64,
    admission_ids: BTreeSet<String>,
    subjects: BTreeSet<String>,
    p_disease_given_drug: Vec<f64>,
    p_drug_given_disease: Vec<f64>,
}

/// Groups raw rows on (drug, disease). Result does not depend on row order;
/// weights saturate at `u64::MAX`.
#[derive(Debug, Default)]
pub struct EdgeAggregator {
    pairs: BTreeMap<(NodeId, NodeId), PairTally>,
}

impl EdgeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: EdgeRow) {
        let tally = self.pairs.entry((row.drug, row.disease)).or_default();
        tally.subjects.insert(row.subject);
        match row.admissions {
            Admissions::Count(count) => tally.admissions = tally.admissions.saturating_add(count),
            Admissions::Id(id) => {
                tally.admission_ids.insert(id);
            }
        }
        tally.p_disease_given_drug.extend(row.reported.disease_given_drug);
        tally.p_drug_given_disease.extend(row.reported.drug_given_disease);
    }

    pub fn finish(self) -> Vec<Association> {
        self.pairs
            .into_iter()
            .map(|((drug, disease), tally)| {
                let distinct_ids = u64::try_from(tally.admission_ids.len()).unwrap_or(u64::MAX);
                let mut assoc = Association::new(
                    drug,
                    disease,
                    tally.admissions.saturating_add(distinct_ids),
                    tally.subjects.len() as u64,
                );
                assoc.reported = ReportedProbabilities {
                    disease_given_drug: mean(tally.p_disease_given_drug),
                    drug_given_disease: mean(tally.p_drug_given_disease),
                };
                assoc
            })
            .collect()
    }
}

// Sorted first so the float sum is the same for any row order.
fn mean(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Reads edges.csv in two passes. The first parses rows; the second drops
/// rows whose endpoints contradict a declared kind, or that touch an
/// undeclared identifier appearing as both drug and disease.
pub fn read_edges(
    path: &Path,
    kinds: &mut BTreeMap<NodeId, NodeKind>,
    tally: &mut FileTally,
) -> Result<Vec<Association>> {
    let (mut reader, headers) = open_reader(path)?;
    let columns = Columns {
        drug: require_column(path, &headers, DRUG_COLUMNS)?,
        disease: require_column(path, &headers, DISEASE_COLUMNS)?,
        subject: require_column(path, &headers, SUBJECT_COLUMNS)?,
        weight: weight_column(&headers),
        p_disease_given_drug: find_column(&headers, P_DISEASE_GIVEN_DRUG_COLUMNS),
        p_drug_given_disease: find_column(&headers, P_DRUG_GIVEN_DISEASE_COLUMNS),
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        tally.rows += 1;
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(input_error(path, err)),
            Err(_) => {
                tally.skip(SkipReason::Unreadable);
                continue;
            }
        };

        match parse_row(&record, columns) {
            Ok(row) => rows.push(row),
            Err(reason) => tally.skip(reason),
        }
    }

    let ambiguous = ambiguous_ids(kinds, &rows);
    let mut aggregator = EdgeAggregator::new();
    for row in rows {
        if let Err(reason) = claim_kinds(kinds, &ambiguous, &row) {
            tally.skip(reason);
            continue;
        }
        aggregator.add(row);
    }

    Ok(aggregator.finish())
}

fn weight_column(headers: &StringRecord) -> WeightColumn {
    if let Some(idx) = find_column(headers, COUNT_COLUMNS) {
        return WeightColumn::Count(idx);
    }
    if let Some(idx) = find_column(headers, ADMISSION_ID_COLUMNS) {
        return WeightColumn::AdmissionId(idx);
    }
    WeightColumn::PerRow
}

fn parse_row(record: &StringRecord, columns: Columns) -> std::result::Result<EdgeRow, SkipReason> {
    let drug = field(record, columns.drug).ok_or(SkipReason::MissingField)?;
    let disease = field(record, columns.disease).ok_or(SkipReason::MissingField)?;
    let subject = field(record, columns.subject).ok_or(SkipReason::MissingField)?;

    let admissions = match columns.weight {
        WeightColumn::Count(idx) => match field(record, idx) {
            Some(value) => Admissions::Count(parse_count(value).ok_or(SkipReason::InvalidCount)?),
            None => Admissions::Count(1),
        },
        WeightColumn::AdmissionId(idx) => Admissions::Id(
            field(record, idx)
                .ok_or(SkipReason::MissingField)?
                .to_string(),
        ),
        WeightColumn::PerRow => Admissions::Count(1),
    };

    let reported = ReportedProbabilities {
        disease_given_drug: probability_field(record, columns.p_disease_given_drug)?,
        drug_given_disease: probability_field(record, columns.p_drug_given_disease)?,
    };

    Ok(EdgeRow {
        drug: NodeId::new(drug),
        disease: NodeId::new(disease),
        subject: subject.to_string(),
        admissions,
        reported,
    })
}

fn probability_field(
    record: &StringRecord,
    idx: Option<usize>,
) -> std::result::Result<Option<f64>, SkipReason> {
    match idx.and_then(|idx| field(record, idx)) {
        Some(value) => parse_probability(value)
            .map(Some)
            .ok_or(SkipReason::InvalidProbability),
        None => Ok(None),
    }
}

fn parse_probability(value: &str) -> Option<f64> {
    let p = value.parse::<f64>().ok()?;
    (0.0..=1.0).contains(&p).then_some(p)
}

// Exports often write integer columns as "5.0".
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(count) = value.parse::<u64>() {
        return Some(count);
    }
    let float = value.parse::<f64>().ok()?;
    // u64::MAX as f64 rounds up to 2^64, which is already out of range.
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float < u64::MAX as f64 {
        Some(float as u64)
    } else {
        None
    }
}

/// Undeclared identifiers seen in both the drug and the disease column.
fn ambiguous_ids(declared: &BTreeMap<NodeId, NodeKind>, rows: &[EdgeRow]) -> BTreeSet<NodeId> {
    let mut as_drug = BTreeSet::new();
    let mut as_disease = BTreeSet::new();
    for row in rows {
        if !declared.contains_key(&row.drug) {
            as_drug.insert(&row.drug);
        }
        if !declared.contains_key(&row.disease) {
            as_disease.insert(&row.disease);
        }
    }
    as_drug
        .intersection(&as_disease)
        .map(|id| (*id).clone())
        .collect()
}

fn claim_kinds(
    kinds: &mut BTreeMap<NodeId, NodeKind>,
    ambiguous: &BTreeSet<NodeId>,
    row: &EdgeRow,
) -> std::result::Result<(), SkipReason> {
    if row.drug == row.disease || ambiguous.contains(&row.drug) || ambiguous.contains(&row.disease) {
        return Err(SkipReason::TypeConflict);
    }
    if kinds.get(&row.drug).is_some_and(|kind| *kind != NodeKind::Drug)
        || kinds
            .get(&row.disease)
            .is_some_and(|kind| *kind != NodeKind::Disease)
    {
        return Err(SkipReason::TypeConflict);
    }
    kinds.insert(row.drug.clone(), NodeKind::Drug);
    kinds.insert(row.disease.clone(), NodeKind::Disease);
    Ok(())
}
