// Month-over-month comparison and next-month volume projection.
//
// Two notions of "working day" live here and must stay distinct: the
// reference month counts dates that had at least one incident, the target
// month counts Monday..Friday calendar dates.
use crate::error::{ReportError, Result};
use crate::types::{Comparison, IncidentRecord, Projection};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Distinct `Created` dates falling in `month` (any year).
pub fn observed_working_days(data: &[IncidentRecord], month: u32) -> usize {
    data.iter()
        .filter(|r| r.created.month() == month)
        .map(|r| r.created_date())
        .collect::<HashSet<_>>()
        .len()
}

pub fn month_total(data: &[IncidentRecord], month: u32) -> usize {
    data.iter().filter(|r| r.created.month() == month).count()
}

/// Incidents per observed working day; zero when no day was observed.
pub fn daily_average(total: usize, working_days: usize) -> f64 {
    if working_days == 0 {
        0.0
    } else {
        total as f64 / working_days as f64
    }
}

/// Monday..Friday dates between the 1st and the last day of the month.
pub fn weekday_count(year: i32, month: u32) -> Result<usize> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ReportError::InvalidConfig(format!("no such month {}-{:02}", year, month)))?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count())
}

/// `average * days` rounded to the nearest integer, ties to even.
pub fn projected_total(average: f64, days: usize) -> i64 {
    (average * days as f64).round_ties_even() as i64
}

/// The calendar month after `(year, month)`.
pub fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn project(
    data: &[IncidentRecord],
    reference_month: u32,
    target_year: i32,
    target_month: u32,
) -> Result<Projection> {
    let observed = observed_working_days(data, reference_month);
    let total = month_total(data, reference_month);
    let average = daily_average(total, observed);
    let target_days = weekday_count(target_year, target_month)?;
    let projected = projected_total(average, target_days);
    debug!(
        reference_month,
        observed, total, average, target_days, projected, "projection computed"
    );
    Ok(Projection {
        reference_month,
        observed_working_days: observed,
        reference_total: total,
        daily_average: average,
        target_year,
        target_month,
        target_working_days: target_days,
        projected_total: projected,
    })
}

/// Percent reduction from `prior` to `current`; positive means fewer
/// incidents. A missing or zero prior gives `InsufficientData`.
pub fn compare(prior: Option<f64>, current: usize) -> Comparison {
    match prior {
        Some(p) if p > 0.0 => Comparison::Reduction {
            prior: p,
            current,
            percent: (p - current as f64) / p * 100.0,
        },
        _ => {
            warn!("prior-period total missing or zero; skipping comparison");
            Comparison::InsufficientData
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(month: u32, day: u32, hour: u32) -> IncidentRecord {
        IncidentRecord {
            issue_type: "Bug".to_string(),
            reporter: "ana".to_string(),
            priority: "High".to_string(),
            created: NaiveDate::from_ymd_opt(2025, month, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            segmento: String::new(),
            produto: String::new(),
            labels: vec![],
        }
    }

    #[test]
    fn reference_month_average_uses_observed_days() {
        let data = vec![rec(6, 2, 9), rec(6, 2, 15), rec(6, 3, 10)];
        assert_eq!(observed_working_days(&data, 6), 2);
        assert_eq!(month_total(&data, 6), 3);
        assert_eq!(daily_average(3, 2), 1.5);
    }

    #[test]
    fn other_months_are_ignored() {
        let data = vec![rec(5, 30, 9), rec(6, 2, 9), rec(7, 1, 9)];
        assert_eq!(observed_working_days(&data, 6), 1);
        assert_eq!(month_total(&data, 6), 1);
    }

    #[test]
    fn zero_observed_days_gives_zero_average() {
        assert_eq!(daily_average(0, 0), 0.0);
        let p = project(&[rec(5, 2, 9)], 6, 2025, 7).unwrap();
        assert_eq!(p.observed_working_days, 0);
        assert_eq!(p.daily_average, 0.0);
        assert_eq!(p.projected_total, 0);
    }

    #[test]
    fn july_2025_has_23_weekdays() {
        assert_eq!(weekday_count(2025, 7).unwrap(), 23);
        assert_eq!(weekday_count(2025, 2).unwrap(), 20);
        assert_eq!(weekday_count(2024, 2).unwrap(), 21);
    }

    #[test]
    fn target_days_do_not_depend_on_data() {
        let p = project(&[rec(6, 2, 9), rec(6, 2, 15), rec(6, 3, 10)], 6, 2025, 7).unwrap();
        assert_eq!(p.target_working_days, 23);
        assert_eq!(p.daily_average, 1.5);
        // 1.5 * 23 = 34.5 rounds to the even neighbour
        assert_eq!(p.projected_total, 34);
    }

    #[test]
    fn projection_rounds_half_to_even() {
        assert_eq!(projected_total(0.5, 23), 12);
        assert_eq!(projected_total(1.5, 23), 34);
        assert_eq!(projected_total(1.4, 10), 14);
        assert_eq!(projected_total(2.26, 10), 23);
    }

    #[test]
    fn invalid_target_month_is_a_config_error() {
        assert!(matches!(
            weekday_count(2025, 13),
            Err(ReportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn following_month_wraps_year() {
        assert_eq!(following_month(2025, 6), (2025, 7));
        assert_eq!(following_month(2025, 12), (2026, 1));
    }

    #[test]
    fn comparison_reports_reduction_and_increase() {
        let c = compare(Some(266.0), 200);
        match &c {
            Comparison::Reduction { percent, .. } => assert!((percent - 24.812).abs() < 0.001),
            other => panic!("expected reduction, got {:?}", other),
        }
        assert_eq!(c.to_string(), "24.81%");
        assert_eq!(compare(Some(100.0), 125).to_string(), "-25.00%");
    }

    #[test]
    fn zero_or_missing_prior_is_insufficient() {
        assert_eq!(compare(Some(0.0), 10), Comparison::InsufficientData);
        assert_eq!(compare(None, 10), Comparison::InsufficientData);
    }
}
