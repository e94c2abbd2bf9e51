//! Department / class filtering.

use std::collections::BTreeSet;

use crate::model::MailRecord;

/// Keep records whose department contains `department` (after trimming).
///
/// Case-sensitive substring match, so `資工` finds `資工系碩1`. Either
/// input being empty yields an empty list.
pub fn filter_by_department(records: &[MailRecord], department: &str) -> Vec<MailRecord> {
    let department = department.trim();
    if records.is_empty() || department.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.department.contains(department))
        .cloned()
        .collect()
}

/// Distinct non-empty departments, sorted.
pub fn all_departments(records: &[MailRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.department.trim())
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
