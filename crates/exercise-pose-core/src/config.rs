//! Analysis configuration.
//!
//! Every numeric constant the analysis depends on (quality thresholds, angle
//! domains, synthetic reference offsets, the trunk-lean cap) lives in [`AnalysisConfig`], which is
//! handed to each component at construction.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::JointKind;
use crate::DEFAULT_CONFIDENCE_THRESHOLD;

/// Inclusive lower bounds of the quality buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBuckets {
    /// Average confidence at or above which a frame is `Good`
    pub good: f64,
    /// Average confidence at or above which a frame is `Fair`
    pub fair: f64,
    /// Floor below which a frame is considered unusable for scoring
    pub poor: f64,
}

impl Default for QualityBuckets {
    fn default() -> Self {
        Self {
            good: 0.7,
            fair: 0.5,
            poor: 0.3,
        }
    }
}

/// Closed interval of admissible angle values, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleDomain {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl AngleDomain {
    /// Creates a domain.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies inside the domain.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Angle domain per joint kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleDomains {
    /// Knee angle domain
    pub knee: AngleDomain,
    /// Hip angle domain
    pub hip: AngleDomain,
    /// Back (trunk lean) domain
    pub back: AngleDomain,
    /// Shoulder (elbow-vertex) domain
    pub shoulder: AngleDomain,
    /// Ankle domain
    pub ankle: AngleDomain,
}

impl Default for AngleDomains {
    fn default() -> Self {
        Self {
            knee: AngleDomain::new(0.0, 180.0),
            hip: AngleDomain::new(0.0, 180.0),
            back: AngleDomain::new(-90.0, 90.0),
            shoulder: AngleDomain::new(0.0, 180.0),
            ankle: AngleDomain::new(0.0, 180.0),
        }
    }
}

impl AngleDomains {
    /// Domain for `kind`.
    #[must_use]
    pub const fn for_kind(&self, kind: JointKind) -> AngleDomain {
        match kind {
            JointKind::Knee => self.knee,
            JointKind::Hip => self.hip,
            JointKind::Back => self.back,
            JointKind::Shoulder => self.shoulder,
            JointKind::Ankle => self.ankle,
        }
    }
}

/// Constants used to build synthetic reference points.
///
/// The reference offsets are in normalized image units. They approximate a
/// vertical direction in image space and are not camera calibrated, so the
/// resulting back and ankle angles are image-plane approximations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Height of the reference point placed above the shoulder midpoint
    pub vertical_reference_offset: f64,
    /// Depth of the reference point placed below the ankle
    pub ankle_reference_offset: f64,
    /// `+1.0` if the subject faces increasing `x`, `-1.0` otherwise
    pub forward_direction: f64,
    /// Largest trunk lean reported either side of upright, in degrees
    pub max_lean_deg: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            vertical_reference_offset: 0.1,
            ankle_reference_offset: 0.1,
            forward_direction: 1.0,
            max_lean_deg: 90.0,
        }
    }
}

/// Frame-rate limits for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesLimits {
    /// Lowest accepted frame rate
    pub min_fps: f64,
    /// Highest accepted frame rate
    pub max_fps: f64,
}

impl Default for SeriesLimits {
    fn default() -> Self {
        Self {
            min_fps: 1.0,
            max_fps: 120.0,
        }
    }
}

/// Complete configuration of the analysis core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence a keypoint or frame must reach to be trusted
    pub min_confidence_threshold: f64,
    /// Minimum number of keypoints per frame
    pub min_keypoint_count: usize,
    /// Decimal places kept in reported averages
    pub angle_precision: u32,
    /// Quality bucket thresholds
    pub quality_buckets: QualityBuckets,
    /// Admissible angle ranges
    pub angle_domains: AngleDomains,
    /// Synthetic reference geometry
    pub geometry: GeometryConfig,
    /// Frame-rate limits
    pub series: SeriesLimits,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_keypoint_count: 1,
            angle_precision: 2,
            quality_buckets: QualityBuckets::default(),
            angle_domains: AngleDomains::default(),
            geometry: GeometryConfig::default(),
            series: SeriesLimits::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] describing the first problem
    /// found.
    pub fn validate(&self) -> CoreResult<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.min_confidence_threshold) {
            return Err(CoreError::configuration(format!(
                "min_confidence_threshold must be in [0, 1], got {}",
                self.min_confidence_threshold
            )));
        }

        let b = &self.quality_buckets;
        for (label, value) in [("good", b.good), ("fair", b.fair), ("poor", b.poor)] {
            if !unit.contains(&value) {
                return Err(CoreError::configuration(format!(
                    "quality_buckets.{label} must be in [0, 1], got {value}"
                )));
            }
        }
        if !(b.poor <= b.fair && b.fair <= b.good) {
            return Err(CoreError::configuration(format!(
                "quality_buckets must satisfy poor <= fair <= good, got {} / {} / {}",
                b.poor, b.fair, b.good
            )));
        }

        for kind in JointKind::ALL {
            let domain = self.angle_domains.for_kind(kind);
            if !(domain.min.is_finite() && domain.max.is_finite()) || domain.min > domain.max {
                return Err(CoreError::configuration(format!(
                    "angle_domains.{kind} is not a valid interval: [{}, {}]",
                    domain.min, domain.max
                )));
            }
        }

        let g = &self.geometry;
        if !(g.vertical_reference_offset > 0.0 && g.ankle_reference_offset > 0.0) {
            return Err(CoreError::configuration(
                "geometry reference offsets must be positive",
            ));
        }
        if (g.forward_direction.abs() - 1.0).abs() > f64::EPSILON {
            return Err(CoreError::configuration(format!(
                "geometry.forward_direction must be 1 or -1, got {}",
                g.forward_direction
            )));
        }
        let back = self.angle_domains.back;
        if !(g.max_lean_deg > 0.0 && back.contains(g.max_lean_deg) && back.contains(-g.max_lean_deg))
        {
            return Err(CoreError::configuration(format!(
                "geometry.max_lean_deg must be positive and within angle_domains.back [{}, {}], got {}",
                back.min, back.max, g.max_lean_deg
            )));
        }

        let s = &self.series;
        if !(s.min_fps > 0.0 && s.min_fps <= s.max_fps) {
            return Err(CoreError::configuration(format!(
                "series fps limits must satisfy 0 < min <= max, got [{}, {}]",
                s.min_fps, s.max_fps
            )));
        }

        Ok(())
    }
}

/// Builder for [`AnalysisConfig`]
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Set the confidence threshold
    pub fn min_confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.min_confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the minimum keypoint count per frame
    pub fn min_keypoint_count(mut self, count: usize) -> Self {
        self.config.min_keypoint_count = count.max(1);
        self
    }

    /// Set the quality bucket thresholds
    pub fn quality_buckets(mut self, good: f64, fair: f64, poor: f64) -> Self {
        self.config.quality_buckets = QualityBuckets {
            good: good.clamp(0.0, 1.0),
            fair: fair.clamp(0.0, 1.0),
            poor: poor.clamp(0.0, 1.0),
        };
        self
    }

    /// Override the domain of one joint kind
    pub fn angle_domain(mut self, kind: JointKind, min: f64, max: f64) -> Self {
        let domain = AngleDomain::new(min, max);
        let domains = &mut self.config.angle_domains;
        match kind {
            JointKind::Knee => domains.knee = domain,
            JointKind::Hip => domains.hip = domain,
            JointKind::Back => domains.back = domain,
            JointKind::Shoulder => domains.shoulder = domain,
            JointKind::Ankle => domains.ankle = domain,
        }
        self
    }

    /// Set the synthetic reference geometry
    pub fn geometry(mut self, geometry: GeometryConfig) -> Self {
        self.config.geometry = geometry;
        self
    }

    /// Set the accepted frame-rate range
    pub fn fps_range(mut self, min_fps: f64, max_fps: f64) -> Self {
        self.config.series = SeriesLimits { min_fps, max_fps };
        self
    }

    /// Set the number of decimals kept in reported averages
    pub fn angle_precision(mut self, decimals: u32) -> Self {
        self.config.angle_precision = decimals.min(10);
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalysisConfig {
        self.config
    }
}
