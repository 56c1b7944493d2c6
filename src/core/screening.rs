use crate::domain::model::SimilarityReport;
use crate::utils::error::{RegistryError, Result};

/// 相似度檢查結果與門檻比較
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    pub report: SimilarityReport,
    pub top_score: f64,
    pub threshold: f64,
}

impl Screening {
    pub fn new(report: SimilarityReport, threshold: f64) -> Self {
        let top_score = report.top_score();
        Self {
            report,
            top_score,
            threshold,
        }
    }

    /// 最高分低於門檻才可登記
    pub fn is_clear(&self) -> bool {
        self.top_score < self.threshold
    }

    pub fn require_clear(&self, kind: &str) -> Result<()> {
        require_below(kind, self.top_score, self.threshold)
    }
}

/// 分數等於門檻也視為過於相似
pub fn require_below(kind: &str, score: f64, threshold: f64) -> Result<()> {
    if score >= threshold {
        tracing::warn!(
            "🚫 {} rejected: similarity {:.3} >= threshold {:.2}",
            kind,
            score,
            threshold
        );
        return Err(RegistryError::SimilarityRejected {
            kind: kind.to_string(),
            score,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SimilarMatch;

    fn report(scores: &[f64]) -> SimilarityReport {
        SimilarityReport {
            matches: scores
                .iter()
                .map(|s| SimilarMatch {
                    similarity: *s,
                    ..SimilarMatch::default()
                })
                .collect(),
            message: None,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let screening = Screening::new(report(&[0.2, 0.6]), 0.6);
        assert!(!screening.is_clear());
        let err = screening.require_clear("PDF").unwrap_err();
        assert_eq!(
            err.to_string(),
            "PDF similarity too high (60.00%). Cannot register."
        );
    }

    #[test]
    fn test_uses_highest_score_not_first() {
        let screening = Screening::new(report(&[0.1, 0.75, 0.3]), 0.6);
        assert_eq!(screening.top_score, 0.75);
        assert!(screening.require_clear("Image").is_err());
    }

    #[test]
    fn test_empty_report_is_clear() {
        let screening = Screening::new(SimilarityReport::default(), 0.6);
        assert!(screening.is_clear());
        assert!(screening.require_clear("Video").is_ok());
    }
}
