//! Input signal types shared by the classifier, the quality gate, and the
//! measurement boundary.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domains and views
// ---------------------------------------------------------------------------

/// Scoring domain a photo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Face,
    Body,
}

/// A viewing angle a caller can require for an uploaded photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    FaceFront,
    FaceSide,
    BodyFront,
    BodySide,
    BodyBack,
}

impl View {
    pub fn domain(self) -> Domain {
        match self {
            Self::FaceFront | Self::FaceSide => Domain::Face,
            Self::BodyFront | Self::BodySide | Self::BodyBack => Domain::Body,
        }
    }

    /// Human-readable label used in rejection messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::FaceFront => "front face",
            Self::FaceSide => "side face",
            Self::BodyFront => "front body",
            Self::BodySide => "side body",
            Self::BodyBack => "back body",
        }
    }
}

/// The view the classifier actually observed.
///
/// `Unknown` is reserved for genuinely indeterminate geometry. Any photo
/// whose geometry is measurable but unusable is `Rejected` with a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedView {
    FaceFront,
    FaceSide,
    BodyFront,
    BodySide,
    BodyBack,
    Unknown,
    Rejected,
}

impl DetectedView {
    /// The concrete view, if one was detected.
    pub fn as_view(self) -> Option<View> {
        match self {
            Self::FaceFront => Some(View::FaceFront),
            Self::FaceSide => Some(View::FaceSide),
            Self::BodyFront => Some(View::BodyFront),
            Self::BodySide => Some(View::BodySide),
            Self::BodyBack => Some(View::BodyBack),
            Self::Unknown | Self::Rejected => None,
        }
    }
}

impl From<View> for DetectedView {
    fn from(view: View) -> Self {
        match view {
            View::FaceFront => Self::FaceFront,
            View::FaceSide => Self::FaceSide,
            View::BodyFront => Self::BodyFront,
            View::BodySide => Self::BodySide,
            View::BodyBack => Self::BodyBack,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-photo signals
// ---------------------------------------------------------------------------

fn full_confidence() -> f64 {
    1.0
}

/// Head pose reported by the landmark provider, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl PoseEstimate {
    /// A pose with full confidence.
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            confidence: 1.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

/// Image quality sub-scores.
///
/// `blur`, `brightness`, and `filter_score` are normalized to `[0, 1]`;
/// `resolution` is the shortest image side in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Sharpness, 1.0 = perfectly sharp.
    pub blur: f64,
    pub resolution: u32,
    /// Mean exposure, 0.5 = ideal.
    pub brightness: f64,
    /// Likelihood that a beautifying filter was applied.
    pub filter_score: f64,
}

impl QualityMetrics {
    /// Metrics for a flawless photo.
    pub fn pristine() -> Self {
        Self {
            blur: 1.0,
            resolution: 1080,
            brightness: 0.5,
            filter_score: 0.0,
        }
    }
}

/// Visibility and rotation facts about the photographed subject.
///
/// Every field except `multiple_subjects` must be reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetrics {
    /// Fraction of the subject covered by hands, hair, clothing, or objects.
    pub occlusion: f64,
    pub face_visible: bool,
    pub full_body_visible: bool,
    #[serde(default)]
    pub multiple_subjects: bool,
    /// Shoulder-line rotation away from the camera plane (body photos).
    pub shoulder_rotation: f64,
    /// Hip-line rotation away from the camera plane (body photos).
    pub hip_rotation: f64,
}

impl Default for SubjectMetrics {
    fn default() -> Self {
        Self {
            occlusion: 0.0,
            face_visible: true,
            full_body_visible: true,
            multiple_subjects: false,
            shoulder_rotation: 0.0,
            hip_rotation: 0.0,
        }
    }
}

impl SubjectMetrics {
    /// Mean of the absolute shoulder and hip rotations.
    pub fn average_rotation(&self) -> f64 {
        (self.shoulder_rotation.abs() + self.hip_rotation.abs()) / 2.0
    }
}

/// Everything the provider reports about one photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoSignals {
    pub pose: PoseEstimate,
    pub quality: QualityMetrics,
    pub subject: SubjectMetrics,
}
