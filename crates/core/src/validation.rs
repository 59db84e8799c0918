//! Per-photo validation pipeline.
//!
//! A validation call walks a fixed sequence of stages:
//!
//! ```text
//! Start -> QualityChecked -> OcclusionChecked -> ViewClassified -> MismatchChecked -> Done
//! ```
//!
//! Each stage is a pure transformation that consumes a [`ValidationContext`]
//! and returns the next one. There are no retries; a rejected photo can only
//! be fixed by the user uploading a new one.

use serde::{Deserialize, Serialize};

use crate::classifier::{classify_view, ViewClassification};
use crate::config::EngineConfig;
use crate::quality_gate::{validate_photo_quality, QualityReport};
use crate::types::{DetectedView, Domain, PhotoSignals, PoseEstimate, View};

pub const ISSUE_OCCLUDED: &str = "subject is partially covered";
pub const WARN_OCCLUDED: &str = "subject is slightly obstructed";
pub const ISSUE_MULTIPLE_SUBJECTS: &str = "more than one person is in the photo";
pub const ISSUE_FACE_NOT_VISIBLE: &str = "face is not visible";
pub const ISSUE_BODY_NOT_VISIBLE: &str = "full body must be visible";

/// Final verdict for one photo against one expected view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoValidation {
    pub is_valid: bool,
    pub expected_view: View,
    pub detected_view: DetectedView,
    pub pose: PoseEstimate,
    pub quality_score: f64,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Stage reached by a [`ValidationContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Start,
    QualityChecked,
    OcclusionChecked,
    ViewClassified,
    MismatchChecked,
    Done,
}

/// Accumulated state threaded through the validation stages.
#[derive(Debug, Clone)]
struct ValidationContext<'a> {
    stage: Stage,
    signals: &'a PhotoSignals,
    expected: View,
    quality: Option<QualityReport>,
    classification: Option<ViewClassification>,
    issues: Vec<String>,
    warnings: Vec<String>,
}

impl<'a> ValidationContext<'a> {
    fn start(signals: &'a PhotoSignals, expected: View) -> Self {
        Self {
            stage: Stage::Start,
            signals,
            expected,
            quality: None,
            classification: None,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn advance(mut self, from: Stage, to: Stage) -> Self {
        debug_assert_eq!(self.stage, from, "validation stage out of order");
        self.stage = to;
        self
    }

    fn check_quality(self, config: &EngineConfig) -> Self {
        let report = validate_photo_quality(&self.signals.quality, config.quality());
        let mut next = self.advance(Stage::Start, Stage::QualityChecked);
        next.issues.extend(report.issues.iter().cloned());
        next.warnings.extend(report.warnings.iter().cloned());
        next.quality = Some(report);
        next
    }

    fn check_occlusion(self, config: &EngineConfig) -> Self {
        let subject = self.signals.subject;
        let policy = config.occlusion();
        let domain = self.expected.domain();
        let mut next = self.advance(Stage::QualityChecked, Stage::OcclusionChecked);

        if !subject.occlusion.is_finite() || subject.occlusion > policy.hard {
            next.issues.push(ISSUE_OCCLUDED.to_string());
        } else if subject.occlusion > policy.soft {
            next.warnings.push(WARN_OCCLUDED.to_string());
        }
        if subject.multiple_subjects {
            next.issues.push(ISSUE_MULTIPLE_SUBJECTS.to_string());
        }
        match domain {
            Domain::Face if !subject.face_visible => {
                next.issues.push(ISSUE_FACE_NOT_VISIBLE.to_string());
            }
            Domain::Body if !subject.full_body_visible => {
                next.issues.push(ISSUE_BODY_NOT_VISIBLE.to_string());
            }
            _ => {}
        }
        next
    }

    fn classify(self, config: &EngineConfig) -> Self {
        let classification = classify_view(
            &self.signals.pose,
            &self.signals.subject,
            self.expected,
            config.views(),
        );
        let mut next = self.advance(Stage::OcclusionChecked, Stage::ViewClassified);
        next.classification = Some(classification);
        next
    }

    /// Downgrade a successfully detected view that differs from the expected
    /// one. This overrides the angle classification.
    fn check_mismatch(self) -> Self {
        let expected = self.expected;
        let mut next = self.advance(Stage::ViewClassified, Stage::MismatchChecked);
        if let Some(classification) = next.classification.as_mut() {
            if let Some(detected) = classification.view.as_view() {
                if detected != expected {
                    classification.view = DetectedView::Rejected;
                    classification.reason = Some(format!(
                        "expected a {} photo but received a {} photo",
                        expected.label(),
                        detected.label()
                    ));
                }
            }
        }
        next
    }

    fn finish(self) -> PhotoValidation {
        let next = self.advance(Stage::MismatchChecked, Stage::Done);
        let (quality_acceptable, quality_score) = next
            .quality
            .as_ref()
            .map(|q| (q.is_acceptable, q.quality_score))
            .unwrap_or((false, 0.0));
        let (detected_view, view_reason) = next
            .classification
            .map(|c| (c.view, c.reason))
            .unwrap_or((DetectedView::Unknown, None));

        let view_usable = !matches!(detected_view, DetectedView::Unknown | DetectedView::Rejected);
        let is_valid = view_usable && quality_acceptable && next.issues.is_empty();

        let rejection_reason = if is_valid {
            None
        } else if !view_usable {
            view_reason
        } else {
            next.issues
                .first()
                .cloned()
                .or_else(|| Some("photo quality is below the acceptable minimum".to_string()))
        };

        PhotoValidation {
            is_valid,
            expected_view: next.expected,
            detected_view,
            pose: next.signals.pose,
            quality_score,
            issues: next.issues,
            warnings: next.warnings,
            rejection_reason,
        }
    }
}

/// Validate one photo against the view the caller expects.
///
/// `is_valid` requires a detected view that is neither `unknown` nor
/// `rejected`, an acceptable quality score, and zero accumulated issues.
pub fn validate_photo(signals: &PhotoSignals, expected_view: View, config: &EngineConfig) -> PhotoValidation {
    ValidationContext::start(signals, expected_view)
        .check_quality(config)
        .check_occlusion(config)
        .classify(config)
        .check_mismatch()
        .finish()
}
