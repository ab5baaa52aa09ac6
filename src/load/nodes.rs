use std::collections::BTreeMap;
use std::path::Path;

use crate::core::{Node, NodeId, NodeKind};
use crate::error::Result;
use crate::load::{field, find_column, input_error, open_reader, require_column, FileTally, SkipReason};

const ID_COLUMNS: &[&str] = &["node_id", "id"];
const TYPE_COLUMNS: &[&str] = &["type"];
const NAME_COLUMNS: &[&str] = &["name", "label"];

pub fn read_nodes(path: &Path, tally: &mut FileTally) -> Result<BTreeMap<NodeId, Node>> {
    let (mut reader, headers) = open_reader(path)?;
    let id_idx = require_column(path, &headers, ID_COLUMNS)?;
    let type_idx = require_column(path, &headers, TYPE_COLUMNS)?;
    let name_idx = find_column(&headers, NAME_COLUMNS);

    let extra: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| {
            *idx != id_idx && *idx != type_idx && Some(*idx) != name_idx && !name.is_empty()
        })
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut nodes = BTreeMap::new();
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

        let Some(id) = field(&record, id_idx) else {
            tally.skip(SkipReason::MissingField);
            continue;
        };
        let Some(kind) = field(&record, type_idx).and_then(NodeKind::parse) else {
            tally.skip(SkipReason::UnknownType);
            continue;
        };
        let id = NodeId::new(id);
        if nodes.contains_key(&id) {
            tally.skip(SkipReason::Duplicate);
            continue;
        }

        let name = name_idx
            .and_then(|idx| field(&record, idx))
            .map(str::to_string);
        let attributes = extra
            .iter()
            .filter_map(|(idx, key)| field(&record, *idx).map(|value| (key.clone(), value.to_string())))
            .collect();

        nodes.insert(
            id.clone(),
            Node {
                id,
                kind,
                name,
                attributes,
            },
        );
    }

    Ok(nodes)
}
