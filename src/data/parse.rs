use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::layout::NeighborSimilarity;

use super::{ClusterAssignment, FetchError, NodeInfo};

const SIMILARITY_COLUMN: usize = 6;

fn malformed(path: &Path, reason: impl Into<String>) -> FetchError {
    FetchError::Malformed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn data_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|line| !line.trim().is_empty())
}

pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

/// Cells that do not parse become NaN.
pub fn parse_matrix(raw: &str, source: &Path) -> Result<Vec<Vec<f64>>, FetchError> {
    let rows = data_lines(raw)
        .map(|line| {
            line.split(',')
                .map(|cell| cell.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    if rows.first().is_none_or(|row| row.is_empty()) {
        return Err(malformed(source, "matrix is empty"));
    }
    Ok(rows)
}

pub fn parse_cluster_file(raw: &str, source: &Path) -> Result<ClusterAssignment, FetchError> {
    let mut lines = data_lines(raw);
    let (Some(_header), Some(data_row)) = (lines.next(), lines.next()) else {
        return Err(malformed(source, "cluster file needs a header and a data row"));
    };

    let mut fields = split_csv_line(data_row).into_iter();
    let algorithm = fields.next().unwrap_or_default().trim().to_string();
    let clusters = fields
        .map(|field| {
            field
                .split(',')
                .map(str::trim)
                .filter(|node| !node.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let sorted_nodes = clusters
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(ClusterAssignment {
        algorithm,
        clusters,
        sorted_nodes,
    })
}

pub fn parse_similarity_table(
    raw: &str,
    focal: &str,
    allowed: &HashSet<&str>,
) -> Vec<NeighborSimilarity> {
    data_lines(raw)
        .skip(1)
        .filter_map(|line| {
            let columns = line.trim_end_matches('\r').split('\t').collect::<Vec<_>>();
            let (from, to) = (columns.first()?.trim(), columns.get(1)?.trim());
            if from != focal || !allowed.contains(to) {
                return None;
            }
            let similarity = columns
                .get(SIMILARITY_COLUMN)?
                .trim()
                .parse::<f64>()
                .unwrap_or(f64::NAN);
            Some(NeighborSimilarity {
                id: to.to_string(),
                similarity,
            })
        })
        .collect()
}

pub fn parse_node_info(raw: &str, node: &str, source: &Path) -> Result<Option<NodeInfo>, FetchError> {
    let mut lines = data_lines(raw);
    let Some(header) = lines.next() else {
        return Err(malformed(source, "node table is empty"));
    };
    let header = split_csv_line(header.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|column| column.trim().to_string())
        .collect::<Vec<_>>();
    let Some(id_column) = header.iter().position(|column| column == "GOID") else {
        return Err(malformed(source, "missing GOID column"));
    };

    let wanted = node.trim().to_uppercase();
    for line in lines {
        let cells = split_csv_line(line);
        let matches = cells
            .get(id_column)
            .is_some_and(|cell| cell.trim().to_uppercase() == wanted);
        if !matches {
            continue;
        }

        let record = header
            .iter()
            .zip(cells.iter())
            .map(|(column, cell)| (column.clone(), Value::String(cell.trim().to_string())))
            .collect::<Map<_, _>>();
        let info = NodeInfo::deserialize(Value::Object(record))
            .map_err(|error| malformed(source, error.to_string()))?;
        return Ok(Some(info));
    }

    Ok(None)
}
