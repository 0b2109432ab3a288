//! Report search.

use cipherscore_store::Report;

/// Check whether `report` matches `term`.
///
/// Case-insensitive substring match against the id and every source label.
/// A blank term matches everything.
pub fn matches(report: &Report, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    report.id.as_str().to_lowercase().contains(&needle)
        || report
            .sources
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
}

/// Keep the reports matching `term`, preserving order.
pub fn filter(reports: Vec<Report>, term: &str) -> Vec<Report> {
    reports.into_iter().filter(|r| matches(r, term)).collect()
}
