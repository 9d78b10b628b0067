use crate::config::ReportConfig;
use crate::error::Result;
use crate::filter::apply_filter;
use crate::projection::{compare, project};
use crate::types::{CrossTab, Field, IncidentRecord, IncidentReport};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// The six fixed tables of a report, in display order.
pub const STANDARD_TABLES: [(&str, Field, Field); 6] = [
    ("Issue Type vs Reporter", Field::IssueType, Field::Reporter),
    ("Issue Type vs Priority", Field::IssueType, Field::Priority),
    ("Issue Type vs Created Date", Field::CreatedDate, Field::IssueType),
    ("Issue Type vs Customer Segment", Field::IssueType, Field::Segmento),
    ("Issue Type vs Affected Product", Field::IssueType, Field::Produto),
    ("Issue Type vs Labels", Field::IssueType, Field::Labels),
];

/// Count records per `(row value, column value)` pair.
///
/// Each record contributes the cartesian product of its row keys and column
/// keys, so exploded `Labels` add one count per label and a record with no
/// key on either side adds nothing. The result is dense over the row and
/// column values that took part in at least one pair, sorted ascending.
pub fn cross_tab(title: &str, data: &[IncidentRecord], row: Field, column: Field) -> CrossTab {
    let mut pairs: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut rows: BTreeSet<String> = BTreeSet::new();
    let mut columns: BTreeSet<String> = BTreeSet::new();

    for r in data {
        let col_keys = column.keys(r);
        for rk in row.keys(r) {
            for ck in &col_keys {
                *pairs.entry((rk.clone(), ck.clone())).or_insert(0) += 1;
                rows.insert(rk.clone());
                columns.insert(ck.clone());
            }
        }
    }

    let rows: Vec<String> = rows.into_iter().collect();
    let columns: Vec<String> = columns.into_iter().collect();
    let counts = rows
        .iter()
        .map(|rk| {
            columns
                .iter()
                .map(|ck| {
                    pairs
                        .get(&(rk.clone(), ck.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    CrossTab {
        title: title.to_string(),
        row_field: row,
        column_field: column,
        rows,
        columns,
        counts,
    }
}

pub fn standard_tables(data: &[IncidentRecord]) -> Vec<CrossTab> {
    STANDARD_TABLES
        .iter()
        .map(|(title, row, column)| cross_tab(title, data, *row, *column))
        .collect()
}

/// Filter the loaded records and compute every table and metric.
pub fn build_report(data: &[IncidentRecord], config: &ReportConfig) -> Result<IncidentReport> {
    config.validate()?;
    let (reference_month, target_year, target_month) = config.resolve_months(data);
    let filtered = apply_filter(data, &config.filter);
    info!(
        total = data.len(),
        filtered = filtered.len(),
        reference_month,
        "building incident report"
    );

    let tables = standard_tables(&filtered);
    let comparison = compare(config.prior_total, filtered.len());
    let projection = project(&filtered, reference_month, target_year, target_month)?;
    Ok(IncidentReport {
        filter: config.filter.clone(),
        total_records: data.len(),
        filtered_records: filtered.len(),
        tables,
        comparison,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::types::Comparison;
    use chrono::NaiveDate;

    fn rec(issue_type: &str, priority: &str, day: u32, labels: &[&str]) -> IncidentRecord {
        IncidentRecord {
            issue_type: issue_type.to_string(),
            reporter: "ana".to_string(),
            priority: priority.to_string(),
            created: NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            segmento: "Varejo".to_string(),
            produto: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn scenario() -> Vec<IncidentRecord> {
        vec![
            rec("Bug", "High", 2, &["urgent", "vip"]),
            rec("Bug", "Low", 2, &[]),
            rec("Task", "High", 3, &["urgent"]),
        ]
    }

    #[test]
    fn issue_type_by_priority_is_dense() {
        let tab = cross_tab("t", &scenario(), Field::IssueType, Field::Priority);
        assert_eq!(tab.rows, vec!["Bug", "Task"]);
        assert_eq!(tab.columns, vec!["High", "Low"]);
        assert_eq!(tab.get("Bug", "High"), Some(1));
        assert_eq!(tab.get("Bug", "Low"), Some(1));
        assert_eq!(tab.get("Task", "High"), Some(1));
        assert_eq!(tab.get("Task", "Low"), Some(0));
        assert_eq!(tab.total(), 3);
    }

    #[test]
    fn labels_are_exploded() {
        let tab = cross_tab("t", &scenario(), Field::IssueType, Field::Labels);
        assert_eq!(tab.get("Bug", "urgent"), Some(1));
        assert_eq!(tab.get("Bug", "vip"), Some(1));
        assert_eq!(tab.get("Task", "urgent"), Some(1));
        assert_eq!(tab.get("Task", "vip"), Some(0));
        // label occurrences, not record count
        assert_eq!(tab.total(), 3);
        assert_eq!(tab.row_total("Bug"), Some(2));
    }

    #[test]
    fn unlabelled_records_only_leave_the_label_table() {
        let data = vec![rec("Bug", "High", 2, &["vip"]), rec("Story", "Low", 2, &[])];
        let labels = cross_tab("t", &data, Field::IssueType, Field::Labels);
        assert_eq!(labels.rows, vec!["Bug"]);
        let priority = cross_tab("t", &data, Field::IssueType, Field::Priority);
        assert_eq!(priority.rows, vec!["Bug", "Story"]);
    }

    #[test]
    fn dates_drop_time_of_day() {
        let tab = cross_tab("t", &scenario(), Field::CreatedDate, Field::IssueType);
        assert_eq!(tab.rows, vec!["2025-06-02", "2025-06-03"]);
        assert_eq!(tab.get("2025-06-02", "Bug"), Some(2));
        assert_eq!(tab.get("2025-06-03", "Bug"), Some(0));
    }

    #[test]
    fn empty_keys_do_not_contribute() {
        let tab = cross_tab("t", &scenario(), Field::IssueType, Field::Produto);
        assert!(tab.is_empty());
        assert_eq!(tab.total(), 0);
    }

    #[test]
    fn cell_sums_equal_contributing_pairs() {
        let data = scenario();
        let label_pairs: usize = data.iter().map(|r| r.labels.len()).sum();
        for tab in standard_tables(&data) {
            let expected = match tab.column_field {
                Field::Labels => label_pairs,
                Field::Produto => 0,
                _ => data.len(),
            };
            assert_eq!(tab.total(), expected, "{}", tab.title);
        }
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let tables = standard_tables(&[]);
        assert_eq!(tables.len(), 6);
        assert!(tables.iter().all(|t| t.is_empty() && t.total() == 0));
    }

    #[test]
    fn build_report_wires_every_stage() {
        let cfg = ReportConfig {
            reference_month: Some(6),
            target: Some((2025, 7)),
            ..ReportConfig::default()
        };
        let report = build_report(&scenario(), &cfg).unwrap();
        assert_eq!(report.total_records, 3);
        assert_eq!(report.filtered_records, 3);
        assert_eq!(report.tables.len(), 6);
        assert_eq!(report.projection.observed_working_days, 2);
        assert_eq!(report.projection.reference_total, 3);
        assert_eq!(report.projection.daily_average, 1.5);
        assert_eq!(report.projection.target_working_days, 23);
        assert!(matches!(report.comparison, Comparison::Reduction { current: 3, .. }));
    }

    #[test]
    fn narrowed_filter_flows_into_tables_and_metrics() {
        let cfg = ReportConfig {
            filter: FilterConfig {
                issue_types: Some(["Task".to_string()].into_iter().collect()),
                priorities: None,
            },
            prior_total: None,
            reference_month: Some(6),
            target: Some((2025, 7)),
        };
        let report = build_report(&scenario(), &cfg).unwrap();
        assert_eq!(report.filtered_records, 1);
        assert_eq!(report.tables[1].rows, vec!["Task"]);
        assert_eq!(report.comparison, Comparison::InsufficientData);
        assert_eq!(report.projection.observed_working_days, 1);
    }

    #[test]
    fn full_domain_filter_matches_default() {
        let data = scenario();
        let full = ReportConfig {
            filter: FilterConfig {
                issue_types: Some(crate::filter::issue_type_domain(&data)),
                priorities: Some(crate::filter::priority_domain(&data)),
            },
            ..ReportConfig::default()
        };
        let a = build_report(&data, &full).unwrap();
        let b = build_report(&data, &ReportConfig::default()).unwrap();
        assert_eq!(a.filtered_records, b.filtered_records);
        assert_eq!(a.comparison, b.comparison);
        assert_eq!(
            serde_json::to_value(&a.tables).unwrap(),
            serde_json::to_value(&b.tables).unwrap()
        );
        assert_eq!(
            serde_json::to_value(&a.projection).unwrap(),
            serde_json::to_value(&b.projection).unwrap()
        );
    }
}
