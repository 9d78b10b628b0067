use crate::filter::FilterConfig;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// Canonical name of each source column the loader requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    IssueType,
    Reporter,
    Priority,
    Created,
    Segmento,
    Produto,
    Labels,
    Labels1,
    Labels2,
}

impl Column {
    pub fn canonical_name(self) -> &'static str {
        match self {
            Column::IssueType => "Issue_Type",
            Column::Reporter => "Reporter",
            Column::Priority => "Priority",
            Column::Created => "Created",
            Column::Segmento => "Segmento",
            Column::Produto => "Produto",
            Column::Labels => "Labels",
            Column::Labels1 => "Labels_1",
            Column::Labels2 => "Labels_2",
        }
    }
}

/// One cleaned incident row.
///
/// Absent categorical values are stored as empty strings; `labels` never
/// holds an empty string or the missing-value placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub issue_type: String,
    pub reporter: String,
    pub priority: String,
    pub created: NaiveDateTime,
    pub segmento: String,
    pub produto: String,
    pub labels: Vec<String>,
}

impl IncidentRecord {
    pub fn created_date(&self) -> NaiveDate {
        self.created.date()
    }
}

/// A dimension a cross tab can be keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    IssueType,
    Reporter,
    Priority,
    CreatedDate,
    Segmento,
    Produto,
    Labels,
}

impl Field {
    /// Keys this record contributes along the field. Scalar fields yield at
    /// most one key; `Labels` is exploded into one key per element.
    pub fn keys(self, r: &IncidentRecord) -> Vec<String> {
        let scalar = |v: &str| {
            if v.is_empty() {
                Vec::new()
            } else {
                vec![v.to_string()]
            }
        };
        match self {
            Field::IssueType => scalar(&r.issue_type),
            Field::Reporter => scalar(&r.reporter),
            Field::Priority => scalar(&r.priority),
            Field::CreatedDate => vec![r.created_date().format("%Y-%m-%d").to_string()],
            Field::Segmento => scalar(&r.segmento),
            Field::Produto => scalar(&r.produto),
            Field::Labels => r.labels.clone(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::IssueType => "Issue Type",
            Field::Reporter => "Reporter",
            Field::Priority => "Priority",
            Field::CreatedDate => "Date",
            Field::Segmento => "Segmento",
            Field::Produto => "Produto",
            Field::Labels => "Labels",
        }
    }
}

/// Dense count matrix over two categorical dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct CrossTab {
    pub title: String,
    pub row_field: Field,
    pub column_field: Field,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[i][j]` is the count for `(rows[i], columns[j])`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.counts[i][j])
    }

    pub fn row_total(&self, row: &str) -> Option<usize> {
        let i = self.rows.iter().position(|r| r == row)?;
        Some(self.counts[i].iter().sum())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Working-day average for a reference month and its extrapolation onto a
/// target month.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub reference_month: u32,
    pub observed_working_days: usize,
    pub reference_total: usize,
    pub daily_average: f64,
    pub target_year: i32,
    pub target_month: u32,
    pub target_working_days: usize,
    pub projected_total: i64,
}

/// Outcome of comparing a prior-period total with the current count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Comparison {
    /// `percent > 0` is a reduction, `percent < 0` an increase.
    Reduction {
        prior: f64,
        current: usize,
        percent: f64,
    },
    InsufficientData,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Reduction { percent, .. } => write!(f, "{:.2}%", percent),
            Comparison::InsufficientData => {
                write!(f, "Insufficient data: supply the prior-month incident total")
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IncidentReport {
    pub filter: FilterConfig,
    pub total_records: usize,
    pub filtered_records: usize,
    pub tables: Vec<CrossTab>,
    pub comparison: Comparison,
    pub projection: Projection,
}

#[derive(Debug, Tabled, Clone)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl MetricRow {
    pub fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }
}
