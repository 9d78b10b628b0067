use crate::error::{ReportError, Result};
use crate::filter::FilterConfig;
use crate::projection::following_month;
use crate::types::IncidentRecord;
use chrono::{Datelike, Local};

/// Prior-month incident total used when the caller gives none.
pub const DEFAULT_PRIOR_TOTAL: f64 = 266.0;

/// Everything a report run needs besides the records themselves.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub filter: FilterConfig,
    /// `None` means "not supplied"; the comparison then reports
    /// insufficient data.
    pub prior_total: Option<f64>,
    /// Month whose observed working days feed the daily average. Defaults to
    /// the month of the latest incident.
    pub reference_month: Option<u32>,
    /// `(year, month)` to project onto. Defaults to the month after the
    /// reference month.
    pub target: Option<(i32, u32)>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            prior_total: Some(DEFAULT_PRIOR_TOTAL),
            reference_month: None,
            target: None,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.reference_month {
            check_month(m)?;
        }
        if let Some((_, m)) = self.target {
            check_month(m)?;
        }
        if let Some(p) = self.prior_total {
            if !p.is_finite() || p < 0.0 {
                return Err(ReportError::InvalidConfig(format!(
                    "prior total must be a non-negative number, got {}",
                    p
                )));
            }
        }
        Ok(())
    }

    /// Resolve `(reference_month, target_year, target_month)` against the
    /// unfiltered data, so narrowing the filter never moves the months.
    pub fn resolve_months(&self, data: &[IncidentRecord]) -> (u32, i32, u32) {
        let anchor = data
            .iter()
            .map(|r| r.created_date())
            .max()
            .unwrap_or_else(|| Local::now().date_naive());
        let reference = self.reference_month.unwrap_or(anchor.month());
        let (year, month) = self
            .target
            .unwrap_or_else(|| following_month(anchor.year(), reference));
        (reference, year, month)
    }
}

fn check_month(m: u32) -> Result<()> {
    if (1..=12).contains(&m) {
        Ok(())
    } else {
        Err(ReportError::InvalidConfig(format!(
            "month must be between 1 and 12, got {}",
            m
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, d: u32) -> IncidentRecord {
        IncidentRecord {
            issue_type: "Bug".to_string(),
            reporter: String::new(),
            priority: "High".to_string(),
            created: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            segmento: String::new(),
            produto: String::new(),
            labels: vec![],
        }
    }

    #[test]
    fn defaults_follow_latest_incident() {
        let data = vec![rec(2025, 5, 30), rec(2025, 6, 27)];
        let cfg = ReportConfig::default();
        assert_eq!(cfg.prior_total, Some(266.0));
        assert_eq!(cfg.resolve_months(&data), (6, 2025, 7));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let data = vec![rec(2024, 12, 2)];
        assert_eq!(ReportConfig::default().resolve_months(&data), (12, 2025, 1));
    }

    #[test]
    fn explicit_months_win() {
        let cfg = ReportConfig {
            reference_month: Some(5),
            target: Some((2025, 9)),
            ..ReportConfig::default()
        };
        assert_eq!(cfg.resolve_months(&[rec(2025, 6, 2)]), (5, 2025, 9));
    }

    #[test]
    fn rejects_bad_months_and_totals() {
        let bad_month = ReportConfig {
            reference_month: Some(0),
            ..ReportConfig::default()
        };
        assert!(bad_month.validate().is_err());
        let bad_target = ReportConfig {
            target: Some((2025, 13)),
            ..ReportConfig::default()
        };
        assert!(bad_target.validate().is_err());
        let bad_prior = ReportConfig {
            prior_total: Some(-1.0),
            ..ReportConfig::default()
        };
        assert!(bad_prior.validate().is_err());
        assert!(ReportConfig::default().validate().is_ok());
    }
}
