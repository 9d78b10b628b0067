use crate::types::{Comparison, CrossTab, IncidentReport, MetricRow};
use crate::util::{format_int, format_number};
use chrono::{Month, NaiveDate};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Markdown table for a cross tab: one row per row value, one column per
/// column value, plus a row total.
pub fn render_cross_tab(tab: &CrossTab) -> String {
    if tab.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    let mut header = vec![format!(
        "{} / {}",
        tab.row_field.label(),
        tab.column_field.label()
    )];
    header.extend(tab.columns.iter().cloned());
    header.push("Total".to_string());
    builder.push_record(header);
    for (row, counts) in tab.rows.iter().zip(&tab.counts) {
        let mut record = vec![row.clone()];
        record.extend(counts.iter().map(|c| format_int(*c)));
        record.push(format_int(tab.row_total(row).unwrap_or(0)));
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn render_rows<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("month {}", month))
}

fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d.format("%B %Y").to_string(),
        None => format!("{}-{:02}", year, month),
    }
}

pub fn metric_rows(report: &IncidentReport) -> Vec<MetricRow> {
    let p = &report.projection;
    let reference = month_name(p.reference_month);
    let target = month_label(p.target_year, p.target_month);
    vec![
        MetricRow::new("Incidents loaded", format_int(report.total_records)),
        MetricRow::new("Incidents after filters", format_int(report.filtered_records)),
        MetricRow::new(
            format!("Incidents in {}", reference),
            format_int(p.reference_total),
        ),
        MetricRow::new(
            format!("Daily average ({}, observed days)", reference),
            format_number(p.daily_average, 2),
        ),
        MetricRow::new(
            format!("Observed working days ({})", reference),
            format_int(p.observed_working_days),
        ),
        MetricRow::new(
            format!("Working days ({})", target),
            format_int(p.target_working_days),
        ),
        MetricRow::new(
            format!("Projected total ({})", target),
            format_int(p.projected_total),
        ),
    ]
}

/// Full console rendering of a report.
pub fn render_report(report: &IncidentReport) -> String {
    let mut out = String::new();
    for (i, tab) in report.tables.iter().enumerate() {
        out.push_str(&format!("{}. {}\n\n", i + 1, tab.title));
        out.push_str(&render_cross_tab(tab));
        out.push_str("\n\n");
    }

    out.push_str("Month-over-month comparison\n\n");
    match &report.comparison {
        Comparison::Reduction { prior, current, .. } => out.push_str(&format!(
            "Reduction in incidents: {} (prior {}, current {})\n\n",
            report.comparison,
            format_number(*prior, 0),
            format_int(*current)
        )),
        Comparison::InsufficientData => {
            out.push_str(&format!("Warning: {}\n\n", report.comparison))
        }
    }

    out.push_str("Projection\n\n");
    out.push_str(&render_rows(&metric_rows(report)));
    out.push('\n');
    out
}
