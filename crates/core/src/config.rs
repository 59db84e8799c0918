//! Immutable engine configuration.
//!
//! [`EngineConfig`] is built once at process start (normally via
//! [`EngineConfig::standard`]) and passed by reference into the pure
//! validation and scoring functions. Nothing mutates it afterwards.

use serde::Serialize;

use crate::body::BodyScoringConfig;
use crate::calibration::ConfidenceGate;
use crate::error::EngineError;
use crate::face::FaceScoringConfig;
use crate::threshold_validation::{
    validate_non_negative, validate_positive, validate_strictly_below, validate_unit_range,
};

// ---------------------------------------------------------------------------
// View thresholds
// ---------------------------------------------------------------------------

/// Angular windows (degrees, absolute values) for face photos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceViewThresholds {
    pub front_max_yaw: f64,
    pub front_max_pitch: f64,
    pub front_max_roll: f64,
    pub side_min_yaw: f64,
    pub side_max_yaw: f64,
}

/// Average shoulder/hip rotation windows (degrees) for body photos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyViewThresholds {
    pub front_max_rotation: f64,
    pub side_min_rotation: f64,
    pub side_max_rotation: f64,
}

/// Per-domain view windows plus the pose confidence below which geometry
/// is considered indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewThresholds {
    pub face: FaceViewThresholds,
    pub body: BodyViewThresholds,
    pub min_pose_confidence: f64,
}

pub const DEFAULT_VIEW_THRESHOLDS: ViewThresholds = ViewThresholds {
    face: FaceViewThresholds {
        front_max_yaw: 15.0,
        front_max_pitch: 15.0,
        front_max_roll: 10.0,
        side_min_yaw: 60.0,
        side_max_yaw: 100.0,
    },
    body: BodyViewThresholds {
        front_max_rotation: 20.0,
        side_min_rotation: 65.0,
        side_max_rotation: 115.0,
    },
    min_pose_confidence: 0.3,
};

impl ViewThresholds {
    /// Check that every bound is sane and that the front and side windows
    /// leave a dead zone between them.
    pub fn validate(&self) -> Result<(), EngineError> {
        let f = &self.face;
        let b = &self.body;
        for (value, name) in [
            (f.front_max_yaw, "face.front_max_yaw"),
            (f.front_max_pitch, "face.front_max_pitch"),
            (f.front_max_roll, "face.front_max_roll"),
            (b.front_max_rotation, "body.front_max_rotation"),
        ] {
            validate_non_negative(value, name).map_err(EngineError::InvalidConfig)?;
        }
        validate_strictly_below(f.front_max_yaw, f.side_min_yaw, "face.front_max_yaw", "face.side_min_yaw")
            .map_err(EngineError::InvalidConfig)?;
        validate_strictly_below(f.side_min_yaw, f.side_max_yaw, "face.side_min_yaw", "face.side_max_yaw")
            .map_err(EngineError::InvalidConfig)?;
        validate_strictly_below(
            b.front_max_rotation,
            b.side_min_rotation,
            "body.front_max_rotation",
            "body.side_min_rotation",
        )
        .map_err(EngineError::InvalidConfig)?;
        validate_strictly_below(
            b.side_min_rotation,
            b.side_max_rotation,
            "body.side_min_rotation",
            "body.side_max_rotation",
        )
        .map_err(EngineError::InvalidConfig)?;
        validate_unit_range(self.min_pose_confidence, "min_pose_confidence")
            .map_err(EngineError::InvalidConfig)
    }
}

// ---------------------------------------------------------------------------
// Quality policy
// ---------------------------------------------------------------------------

/// Hard/soft cut points for one quality signal.
///
/// For "lower is worse" signals a value below `hard` is a blocking issue and
/// a value below `soft` a warning; "higher is worse" signals invert both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierRule {
    pub hard: f64,
    pub soft: f64,
}

/// Two-tier quality thresholds and the multiplicative penalties they apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityPolicy {
    /// Sharpness: lower is worse.
    pub blur: TierRule,
    /// Shortest side in pixels: lower is worse.
    pub resolution: TierRule,
    /// Distance of brightness from 0.5: higher is worse.
    pub brightness_deviation: TierRule,
    /// Filter suspicion: higher is worse.
    pub filter: TierRule,
    pub hard_penalty: f64,
    pub soft_penalty: f64,
    pub min_acceptable: f64,
}

pub const DEFAULT_QUALITY_POLICY: QualityPolicy = QualityPolicy {
    blur: TierRule { hard: 0.30, soft: 0.50 },
    resolution: TierRule { hard: 480.0, soft: 720.0 },
    brightness_deviation: TierRule { hard: 0.35, soft: 0.25 },
    filter: TierRule { hard: 0.70, soft: 0.40 },
    hard_penalty: 0.5,
    soft_penalty: 0.8,
    min_acceptable: 0.5,
};

impl QualityPolicy {
    pub fn validate(&self) -> Result<(), EngineError> {
        // Lower-is-worse signals: hard cut sits below the soft cut.
        if self.blur.hard > self.blur.soft || self.resolution.hard > self.resolution.soft {
            return Err(EngineError::InvalidConfig(
                "blur/resolution hard thresholds must not exceed their soft thresholds".into(),
            ));
        }
        // Higher-is-worse signals: hard cut sits above the soft cut.
        if self.brightness_deviation.hard < self.brightness_deviation.soft
            || self.filter.hard < self.filter.soft
        {
            return Err(EngineError::InvalidConfig(
                "brightness/filter hard thresholds must not be below their soft thresholds".into(),
            ));
        }
        validate_positive(self.resolution.hard, "resolution.hard").map_err(EngineError::InvalidConfig)?;
        for (value, name) in [
            (self.hard_penalty, "hard_penalty"),
            (self.soft_penalty, "soft_penalty"),
            (self.min_acceptable, "min_acceptable"),
            (self.blur.hard, "blur.hard"),
            (self.blur.soft, "blur.soft"),
            (self.filter.hard, "filter.hard"),
            (self.filter.soft, "filter.soft"),
        ] {
            validate_unit_range(value, name).map_err(EngineError::InvalidConfig)?;
        }
        if self.hard_penalty > self.soft_penalty {
            return Err(EngineError::InvalidConfig(
                "hard_penalty must be at least as severe as soft_penalty".into(),
            ));
        }
        Ok(())
    }
}

/// Occlusion thresholds (fraction of subject covered).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OcclusionPolicy {
    pub hard: f64,
    pub soft: f64,
}

pub const DEFAULT_OCCLUSION_POLICY: OcclusionPolicy = OcclusionPolicy { hard: 0.30, soft: 0.15 };

impl OcclusionPolicy {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_unit_range(self.hard, "occlusion.hard").map_err(EngineError::InvalidConfig)?;
        validate_unit_range(self.soft, "occlusion.soft").map_err(EngineError::InvalidConfig)?;
        validate_strictly_below(self.soft, self.hard, "occlusion.soft", "occlusion.hard")
            .map_err(EngineError::InvalidConfig)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// The complete, validated configuration for validation and scoring.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    views: ViewThresholds,
    quality: QualityPolicy,
    occlusion: OcclusionPolicy,
    face: FaceScoringConfig,
    body: BodyScoringConfig,
    gate: ConfidenceGate,
}

impl EngineConfig {
    /// Assemble a configuration, validating every part.
    pub fn new(
        views: ViewThresholds,
        quality: QualityPolicy,
        occlusion: OcclusionPolicy,
        face: FaceScoringConfig,
        body: BodyScoringConfig,
        gate: ConfidenceGate,
    ) -> Result<Self, EngineError> {
        views.validate()?;
        quality.validate()?;
        occlusion.validate()?;
        gate.validate()?;
        Ok(Self {
            views,
            quality,
            occlusion,
            face,
            body,
            gate,
        })
    }

    /// The production defaults.
    pub fn standard() -> Result<Self, EngineError> {
        Self::new(
            DEFAULT_VIEW_THRESHOLDS,
            DEFAULT_QUALITY_POLICY,
            DEFAULT_OCCLUSION_POLICY,
            FaceScoringConfig::standard()?,
            BodyScoringConfig::standard()?,
            ConfidenceGate::default(),
        )
    }

    pub fn views(&self) -> &ViewThresholds {
        &self.views
    }

    pub fn quality(&self) -> &QualityPolicy {
        &self.quality
    }

    pub fn occlusion(&self) -> &OcclusionPolicy {
        &self.occlusion
    }

    pub fn face(&self) -> &FaceScoringConfig {
        &self.face
    }

    pub fn body(&self) -> &BodyScoringConfig {
        &self.body
    }

    pub fn gate(&self) -> &ConfidenceGate {
        &self.gate
    }
}
