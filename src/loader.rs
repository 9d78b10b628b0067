use crate::error::{ReportError, Result};
use crate::types::{Column, IncidentRecord};
use crate::util::{clean_text, is_missing, parse_created};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Source header → canonical column. Every entry is required.
pub const SOURCE_COLUMNS: [(&str, Column); 9] = [
    ("Issue Type", Column::IssueType),
    ("Reporter", Column::Reporter),
    ("Priority", Column::Priority),
    ("Created", Column::Created),
    ("Custom field (Segmento do cliente)", Column::Segmento),
    ("Custom field (Produto afetado)", Column::Produto),
    ("Labels", Column::Labels),
    ("Labels.1", Column::Labels1),
    ("Labels.2", Column::Labels2),
];

/// Text an absent label slot renders as before the slots are joined.
pub const PLACEHOLDER: &str = "nan";
const LABEL_DELIMITER: &str = ";";

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub labelled_rows: usize,
    pub label_occurrences: usize,
    pub first_created: Option<NaiveDateTime>,
    pub last_created: Option<NaiveDateTime>,
}

pub fn load_and_clean(path: &Path) -> Result<(Vec<IncidentRecord>, LoadReport)> {
    let file = File::open(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading incident export");
    load_from_reader(file)
}

pub fn load_from_reader<R: Read>(input: R) -> Result<(Vec<IncidentRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = disambiguate_headers(rdr.headers()?);
    let index = resolve_columns(&headers)?;
    debug!(?headers, "resolved header layout");

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cell = |c: Column| index.get(&c).and_then(|&i| row.get(i));

        let raw_created = cell(Column::Created).unwrap_or("");
        let created = parse_created(raw_created).ok_or_else(|| ReportError::UnparseableTimestamp {
            line,
            value: raw_created.to_string(),
        })?;

        let labels = normalize_labels([
            cell(Column::Labels),
            cell(Column::Labels1),
            cell(Column::Labels2),
        ]);

        report.total_rows += 1;
        if !labels.is_empty() {
            report.labelled_rows += 1;
            report.label_occurrences += labels.len();
        }
        report.first_created = Some(report.first_created.map_or(created, |c| c.min(created)));
        report.last_created = Some(report.last_created.map_or(created, |c| c.max(created)));

        records.push(IncidentRecord {
            issue_type: clean_text(cell(Column::IssueType)),
            reporter: clean_text(cell(Column::Reporter)),
            priority: clean_text(cell(Column::Priority)),
            created,
            segmento: clean_text(cell(Column::Segmento)),
            produto: clean_text(cell(Column::Produto)),
            labels,
        });
    }

    info!(
        rows = report.total_rows,
        labelled = report.labelled_rows,
        "incident export loaded"
    );
    Ok((records, report))
}

/// Trim header names, drop a leading BOM and suffix repeated names with
/// `.1`, `.2`, ... so three `Labels` headers become `Labels`, `Labels.1`,
/// `Labels.2`.
fn disambiguate_headers(headers: &StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            let name = h.trim().to_string();
            let count = seen.entry(name.clone()).or_insert(0);
            let out = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            out
        })
        .collect()
}

fn resolve_columns(headers: &[String]) -> Result<HashMap<Column, usize>> {
    let mut index = HashMap::new();
    for (source, column) in SOURCE_COLUMNS {
        let pos = headers
            .iter()
            .position(|h| h == source)
            .ok_or_else(|| ReportError::SchemaMismatch {
                column: source.to_string(),
            })?;
        debug!(source, column = column.canonical_name(), pos, "mapped column");
        index.insert(column, pos);
    }
    Ok(index)
}

/// Collapse the three label slots into one list.
///
/// Slots are rendered as text (absent ones as [`PLACEHOLDER`]), joined with
/// `;`, then split back with empty and placeholder segments removed. A cell
/// that itself holds `;` contributes several labels.
pub fn normalize_labels(slots: [Option<&str>; 3]) -> Vec<String> {
    let joined = slots
        .iter()
        .map(|s| {
            if is_missing(*s) {
                PLACEHOLDER.to_string()
            } else {
                s.unwrap_or_default().trim().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(LABEL_DELIMITER);

    joined
        .split(LABEL_DELIMITER)
        .map(str::trim)
        .filter(|seg| !seg.is_empty() && *seg != PLACEHOLDER)
        .map(str::to_string)
        .collect()
}
