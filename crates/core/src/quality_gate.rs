//! Photo quality gate: two-tier evaluation of blur, resolution, brightness,
//! and filter suspicion.
//!
//! Each degraded signal either raises a blocking issue (hard tier) or a
//! non-blocking warning (soft tier), and multiplies the quality score down
//! by the matching penalty. Marginal photos are still scored but flagged;
//! severely degraded photos are rejected outright.

use serde::Serialize;

use crate::config::{QualityPolicy, TierRule};
use crate::types::QualityMetrics;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const ISSUE_BLUR: &str = "photo is too blurry";
pub const WARN_BLUR: &str = "photo is slightly soft";
pub const ISSUE_RESOLUTION: &str = "photo resolution is too low";
pub const WARN_RESOLUTION: &str = "photo resolution is marginal";
pub const ISSUE_BRIGHTNESS: &str = "photo is badly over- or under-exposed";
pub const WARN_BRIGHTNESS: &str = "photo exposure is uneven";
pub const ISSUE_FILTER: &str = "photo appears heavily filtered";
pub const WARN_FILTER: &str = "photo may be filtered";

/// Brightness value treated as ideal exposure.
pub const IDEAL_BRIGHTNESS: f64 = 0.5;

// ---------------------------------------------------------------------------
// Tier evaluation
// ---------------------------------------------------------------------------

/// Outcome of one signal against its [`TierRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Pass,
    Warn,
    Fail,
}

/// Evaluate a signal where lower values are worse (sharpness, resolution).
///
/// - `Fail` if `value < hard`
/// - `Warn` if `value < soft`
/// - `Pass` otherwise
///
/// Non-finite values fail.
pub fn evaluate_lower_is_worse(value: f64, rule: TierRule) -> Tier {
    if !value.is_finite() || value < rule.hard {
        Tier::Fail
    } else if value < rule.soft {
        Tier::Warn
    } else {
        Tier::Pass
    }
}

/// Evaluate a signal where higher values are worse (exposure deviation,
/// filter suspicion).
pub fn evaluate_higher_is_worse(value: f64, rule: TierRule) -> Tier {
    if !value.is_finite() || value > rule.hard {
        Tier::Fail
    } else if value > rule.soft {
        Tier::Warn
    } else {
        Tier::Pass
    }
}

// ---------------------------------------------------------------------------
// Quality report
// ---------------------------------------------------------------------------

/// Result of [`validate_photo_quality`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub is_acceptable: bool,
    pub quality_score: f64,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Combine the four quality signals into a single score and verdict.
///
/// The score starts at 1.0 and is multiplied by `hard_penalty` or
/// `soft_penalty` per degraded signal, so it stays in `[0, 1]` and never
/// increases as any one signal degrades. A photo is acceptable when the
/// score reaches `min_acceptable` and no hard issue was raised.
pub fn validate_photo_quality(metrics: &QualityMetrics, policy: &QualityPolicy) -> QualityReport {
    let checks = [
        (
            evaluate_lower_is_worse(metrics.blur, policy.blur),
            ISSUE_BLUR,
            WARN_BLUR,
        ),
        (
            evaluate_lower_is_worse(f64::from(metrics.resolution), policy.resolution),
            ISSUE_RESOLUTION,
            WARN_RESOLUTION,
        ),
        (
            evaluate_higher_is_worse(
                (metrics.brightness - IDEAL_BRIGHTNESS).abs(),
                policy.brightness_deviation,
            ),
            ISSUE_BRIGHTNESS,
            WARN_BRIGHTNESS,
        ),
        (
            evaluate_higher_is_worse(metrics.filter_score, policy.filter),
            ISSUE_FILTER,
            WARN_FILTER,
        ),
    ];

    let mut quality_score = 1.0;
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    for (tier, issue, warning) in checks {
        match tier {
            Tier::Fail => {
                quality_score *= policy.hard_penalty;
                issues.push(issue.to_string());
            }
            Tier::Warn => {
                quality_score *= policy.soft_penalty;
                warnings.push(warning.to_string());
            }
            Tier::Pass => {}
        }
    }

    QualityReport {
        is_acceptable: quality_score >= policy.min_acceptable && issues.is_empty(),
        quality_score,
        issues,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_QUALITY_POLICY;

    fn check(metrics: QualityMetrics) -> QualityReport {
        validate_photo_quality(&metrics, &DEFAULT_QUALITY_POLICY)
    }

    // -- tier evaluation ------------------------------------------------------

    #[test]
    fn lower_is_worse_tiers() {
        let rule = TierRule { hard: 0.3, soft: 0.5 };
        assert_eq!(evaluate_lower_is_worse(0.9, rule), Tier::Pass);
        assert_eq!(evaluate_lower_is_worse(0.5, rule), Tier::Pass);
        assert_eq!(evaluate_lower_is_worse(0.4, rule), Tier::Warn);
        assert_eq!(evaluate_lower_is_worse(0.3, rule), Tier::Warn);
        assert_eq!(evaluate_lower_is_worse(0.29, rule), Tier::Fail);
    }

    #[test]
    fn higher_is_worse_tiers() {
        let rule = TierRule { hard: 0.7, soft: 0.4 };
        assert_eq!(evaluate_higher_is_worse(0.1, rule), Tier::Pass);
        assert_eq!(evaluate_higher_is_worse(0.5, rule), Tier::Warn);
        assert_eq!(evaluate_higher_is_worse(0.71, rule), Tier::Fail);
    }

    #[test]
    fn non_finite_signal_fails() {
        let rule = TierRule { hard: 0.3, soft: 0.5 };
        assert_eq!(evaluate_lower_is_worse(f64::NAN, rule), Tier::Fail);
        assert_eq!(evaluate_higher_is_worse(f64::NAN, rule), Tier::Fail);
    }

    // -- validate_photo_quality -----------------------------------------------

    #[test]
    fn pristine_photo_scores_one() {
        let r = check(QualityMetrics::pristine());
        assert!(r.is_acceptable);
        assert_eq!(r.quality_score, 1.0);
        assert!(r.issues.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn soft_blur_warns_but_stays_acceptable() {
        let r = check(QualityMetrics {
            blur: 0.4,
            ..QualityMetrics::pristine()
        });
        assert!(r.is_acceptable);
        assert!((r.quality_score - 0.8).abs() < 1e-12);
        assert_eq!(r.warnings, vec![WARN_BLUR.to_string()]);
    }

    #[test]
    fn hard_blur_is_blocking_issue() {
        let r = check(QualityMetrics {
            blur: 0.1,
            ..QualityMetrics::pristine()
        });
        assert!(!r.is_acceptable);
        assert!((r.quality_score - 0.5).abs() < 1e-12);
        assert_eq!(r.issues, vec![ISSUE_BLUR.to_string()]);
    }

    #[test]
    fn stacked_warnings_fall_below_minimum() {
        // 0.8^4 = 0.4096 < 0.5 with zero hard issues.
        let r = check(QualityMetrics {
            blur: 0.45,
            resolution: 600,
            brightness: 0.8,
            filter_score: 0.5,
        });
        assert!(r.issues.is_empty());
        assert_eq!(r.warnings.len(), 4);
        assert!(r.quality_score < DEFAULT_QUALITY_POLICY.min_acceptable);
        assert!(!r.is_acceptable);
    }

    #[test]
    fn dark_and_bright_photos_penalized_symmetrically() {
        let dark = check(QualityMetrics {
            brightness: 0.1,
            ..QualityMetrics::pristine()
        });
        let bright = check(QualityMetrics {
            brightness: 0.9,
            ..QualityMetrics::pristine()
        });
        assert_eq!(dark.quality_score, bright.quality_score);
        assert_eq!(dark.issues, vec![ISSUE_BRIGHTNESS.to_string()]);
    }

    #[test]
    fn low_resolution_is_blocking() {
        let r = check(QualityMetrics {
            resolution: 320,
            ..QualityMetrics::pristine()
        });
        assert_eq!(r.issues, vec![ISSUE_RESOLUTION.to_string()]);
        assert!(!r.is_acceptable);
    }

    // -- monotonicity ---------------------------------------------------------

    fn assert_non_increasing(scores: &[f64], label: &str) {
        for pair in scores.windows(2) {
            assert!(pair[1] <= pair[0], "{label}: {scores:?} is not non-increasing");
        }
    }

    #[test]
    fn score_non_increasing_in_each_degradation() {
        let steps: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();

        let blur: Vec<f64> = steps
            .iter()
            .map(|s| check(QualityMetrics { blur: 1.0 - s, ..QualityMetrics::pristine() }).quality_score)
            .collect();
        assert_non_increasing(&blur, "blur");

        let resolution: Vec<f64> = (0..=12)
            .map(|i| check(QualityMetrics { resolution: 1200 - i * 100, ..QualityMetrics::pristine() }).quality_score)
            .collect();
        assert_non_increasing(&resolution, "resolution");

        let brightness: Vec<f64> = steps
            .iter()
            .map(|s| check(QualityMetrics { brightness: 0.5 + s / 2.0, ..QualityMetrics::pristine() }).quality_score)
            .collect();
        assert_non_increasing(&brightness, "brightness");

        let filter: Vec<f64> = steps
            .iter()
            .map(|s| check(QualityMetrics { filter_score: *s, ..QualityMetrics::pristine() }).quality_score)
            .collect();
        assert_non_increasing(&filter, "filter");
    }
}
