//! View classification from pose angles and body rotation.
//!
//! Angles that fall between the front and side windows are never assigned
//! to the nearest view: they are rejected with an explicit dead-zone reason.

use serde::Serialize;

use crate::config::ViewThresholds;
use crate::types::{DetectedView, Domain, PoseEstimate, SubjectMetrics, View};

pub const REASON_INDETERMINATE: &str = "pose could not be determined";
pub const REASON_THREE_QUARTER: &str = "three-quarter angle not supported";
pub const REASON_THREE_QUARTER_BODY: &str = "three-quarter body angle not supported";
pub const REASON_FRONT_BODY_NO_FACE: &str = "face must be visible in a front body photo";

/// Result of [`classify_view`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewClassification {
    pub view: DetectedView,
    pub reason: Option<String>,
}

impl ViewClassification {
    fn detected(view: View) -> Self {
        Self {
            view: view.into(),
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            view: DetectedView::Rejected,
            reason: Some(reason.into()),
        }
    }

    fn unknown() -> Self {
        Self {
            view: DetectedView::Unknown,
            reason: Some(REASON_INDETERMINATE.to_string()),
        }
    }
}

/// Classify a photo within the domain of `expected_view`.
///
/// Only the domain of the expected view is used here; comparing the detected
/// view against the expected one is the job of the mismatch stage in
/// [`validate_photo`](crate::validation::validate_photo).
pub fn classify_view(
    pose: &PoseEstimate,
    subject: &SubjectMetrics,
    expected_view: View,
    thresholds: &ViewThresholds,
) -> ViewClassification {
    if !pose.is_finite() || !pose.confidence.is_finite() || pose.confidence < thresholds.min_pose_confidence {
        return ViewClassification::unknown();
    }
    match expected_view.domain() {
        Domain::Face => classify_face(pose, thresholds),
        Domain::Body => classify_body(subject, thresholds),
    }
}

fn classify_face(pose: &PoseEstimate, thresholds: &ViewThresholds) -> ViewClassification {
    let t = &thresholds.face;
    let (yaw, pitch, roll) = (pose.yaw.abs(), pose.pitch.abs(), pose.roll.abs());

    if yaw <= t.front_max_yaw && pitch <= t.front_max_pitch && roll <= t.front_max_roll {
        return ViewClassification::detected(View::FaceFront);
    }
    if (t.side_min_yaw..=t.side_max_yaw).contains(&yaw) {
        return ViewClassification::detected(View::FaceSide);
    }
    if yaw > t.front_max_yaw && yaw < t.side_min_yaw {
        return ViewClassification::rejected(REASON_THREE_QUARTER);
    }
    ViewClassification::rejected(format!(
        "head pose is outside the supported range (yaw {yaw:.1}°, pitch {pitch:.1}°, roll {roll:.1}°)"
    ))
}

/// Side and back are separated only by face visibility, not by an
/// independent rotation measurement.
fn classify_body(subject: &SubjectMetrics, thresholds: &ViewThresholds) -> ViewClassification {
    let t = &thresholds.body;
    let rotation = subject.average_rotation();
    if !rotation.is_finite() {
        return ViewClassification::unknown();
    }

    if rotation <= t.front_max_rotation {
        return if subject.face_visible {
            ViewClassification::detected(View::BodyFront)
        } else {
            ViewClassification::rejected(REASON_FRONT_BODY_NO_FACE)
        };
    }
    if (t.side_min_rotation..=t.side_max_rotation).contains(&rotation) {
        return if subject.face_visible {
            ViewClassification::detected(View::BodySide)
        } else {
            ViewClassification::detected(View::BodyBack)
        };
    }
    if rotation < t.side_min_rotation {
        return ViewClassification::rejected(REASON_THREE_QUARTER_BODY);
    }
    ViewClassification::rejected(format!(
        "body rotation of {rotation:.1}° is outside the supported range"
    ))
}
