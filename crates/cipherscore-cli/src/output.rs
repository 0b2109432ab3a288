//! Human-readable rendering of reports and stats.

use chrono::DateTime;

use cipherscore_core::{Report, ReportStats};

/// Format seconds since epoch as UTC, falling back to the raw number.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// One line per report for listings.
pub fn report_line(report: &Report) -> String {
    format!(
        "{:<24} {:<9} {}  [{}]",
        report.id,
        report.status,
        format_timestamp(report.created_at),
        report.sources.join(", ")
    )
}

/// Multi-line detail view. The score stays opaque.
pub fn report_detail(report: &Report) -> String {
    format!(
        "id:       {}\nstatus:   {}\nowner:    {}\ncreated:  {}\nsources:  {}\nscore:    {}",
        report.id,
        report.status,
        report.owner,
        format_timestamp(report.created_at),
        report.sources.join(", "),
        report.opaque_score
    )
}

/// Stats summary.
pub fn stats_summary(stats: &ReportStats) -> String {
    let mut out = format!(
        "total:    {}\napproved: {}\npending:  {}\nrejected: {}",
        stats.total, stats.approved, stats.pending, stats.rejected
    );
    match &stats.approved_scores {
        Some(range) => out.push_str(&format!(
            "\nhighest:  {}\naverage:  {:.1}\nlowest:   {}",
            range.highest, range.average, range.lowest
        )),
        None => out.push_str("\nno approved scores"),
    }
    out
}
