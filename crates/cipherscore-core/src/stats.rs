//! Aggregate counts and approved-score range.
//!
//! Computing the range decodes approved scores; this is one of the few
//! places outside the reveal flow that sees plaintext.

use serde::Serialize;
use tracing::warn;

use cipherscore_crypto::ScoreCodec;
use cipherscore_store::{Report, ReportStatus};

/// Highest, average and lowest of a set of scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreRange {
    /// Highest score.
    pub highest: f64,
    /// Arithmetic mean.
    pub average: f64,
    /// Lowest score.
    pub lowest: f64,
}

/// Summary of the report collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportStats {
    /// Reports counted.
    pub total: usize,
    /// Reports awaiting a decision.
    pub pending: usize,
    /// Approved reports.
    pub approved: usize,
    /// Rejected reports.
    pub rejected: usize,
    /// Range over decodable approved scores, if any.
    pub approved_scores: Option<ScoreRange>,
}

impl ReportStats {
    /// Compute stats over `reports`.
    ///
    /// Approved scores that fail to decode are counted but left out of the
    /// range.
    pub fn compute<C: ScoreCodec + ?Sized>(reports: &[Report], codec: &C) -> Self {
        let mut stats = Self {
            total: reports.len(),
            ..Self::default()
        };
        let mut scores = Vec::new();

        for report in reports {
            match report.status {
                ReportStatus::Pending => stats.pending += 1,
                ReportStatus::Rejected => stats.rejected += 1,
                ReportStatus::Approved => {
                    stats.approved += 1;
                    match codec.decode(&report.opaque_score) {
                        Ok(v) => scores.push(v),
                        Err(e) => {
                            warn!(id = %report.id, error = %e, "Skipping undecodable approved score")
                        }
                    }
                }
            }
        }

        stats.approved_scores = score_range(&scores);
        stats
    }
}

fn score_range(scores: &[f64]) -> Option<ScoreRange> {
    if scores.is_empty() {
        return None;
    }
    let highest = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let average = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(ScoreRange {
        highest,
        average,
        lowest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherscore_crypto::{OpaqueScore, TaggedCodec};
    use cipherscore_store::ReportId;

    fn report(id: &str, score: f64, status: ReportStatus) -> Report {
        let mut r = Report::new(
            ReportId::new(id),
            TaggedCodec.encode(score),
            "0xA",
            vec!["s".into()],
        );
        r.status = status;
        r
    }

    #[test]
    fn test_empty() {
        let stats = ReportStats::compute(&[], &TaggedCodec);
        assert_eq!(stats, ReportStats::default());
    }

    #[test]
    fn test_counts_and_range() {
        let reports = vec![
            report("a", 770.0, ReportStatus::Approved),
            report("b", 550.0, ReportStatus::Approved),
            report("c", 900.0, ReportStatus::Pending),
            report("d", 300.0, ReportStatus::Rejected),
        ];
        let stats = ReportStats::compute(&reports, &TaggedCodec);

        assert_eq!(stats.total, 4);
        assert_eq!((stats.pending, stats.approved, stats.rejected), (1, 2, 1));
        let range = stats.approved_scores.unwrap();
        assert_eq!(range.highest, 770.0);
        assert_eq!(range.lowest, 550.0);
        assert!((range.average - 660.0).abs() < 0.001);
    }

    #[test]
    fn test_no_approved_means_no_range() {
        let reports = vec![report("a", 1.0, ReportStatus::Pending)];
        assert!(ReportStats::compute(&reports, &TaggedCodec)
            .approved_scores
            .is_none());
    }

    #[test]
    fn test_undecodable_approved_is_counted_not_ranged() {
        let mut bad = report("bad", 0.0, ReportStatus::Approved);
        bad.opaque_score = OpaqueScore::new("FHE-YWJj");
        let reports = vec![bad, report("ok", 600.0, ReportStatus::Approved)];

        let stats = ReportStats::compute(&reports, &TaggedCodec);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.approved_scores.unwrap().highest, 600.0);
    }
}
