use crate::types::IncidentRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Allow-lists for the two filterable fields. `None` keeps every value
/// observed in the unfiltered set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterConfig {
    pub issue_types: Option<BTreeSet<String>>,
    pub priorities: Option<BTreeSet<String>>,
}

/// Distinct `Issue_Type` values, the default Issue Type allow-list.
pub fn issue_type_domain(data: &[IncidentRecord]) -> BTreeSet<String> {
    data.iter().map(|r| r.issue_type.clone()).collect()
}

/// Distinct `Priority` values, the default Priority allow-list.
pub fn priority_domain(data: &[IncidentRecord]) -> BTreeSet<String> {
    data.iter().map(|r| r.priority.clone()).collect()
}

/// Rows whose Issue_Type and Priority are both allowed. The input is left
/// untouched.
pub fn apply_filter(data: &[IncidentRecord], filter: &FilterConfig) -> Vec<IncidentRecord> {
    let issue_types = filter
        .issue_types
        .clone()
        .unwrap_or_else(|| issue_type_domain(data));
    let priorities = filter
        .priorities
        .clone()
        .unwrap_or_else(|| priority_domain(data));

    let kept: Vec<IncidentRecord> = data
        .iter()
        .filter(|r| issue_types.contains(&r.issue_type) && priorities.contains(&r.priority))
        .cloned()
        .collect();
    debug!(before = data.len(), after = kept.len(), "filter applied");
    kept
}
