//! # Exercise Pose Core
//!
//! Keypoint validation, joint geometry, and quality scoring for exercise pose
//! captures.
//!
//! A capture is a [`PoseSeries`]: frames of named, normalized 2D (optionally
//! 3D) keypoints produced by an upstream pose estimator. This crate turns it
//! into trustworthy measurements:
//!
//! - **Ingest**: [`ingest`] decodes untyped JSON and collects every structural
//!   problem instead of stopping at the first one.
//!
//! - **Validation**: [`KeypointValidator`] and [`FrameAggregator`] check
//!   keypoints, frames, and whole series against domain rules. Findings go
//!   into a [`ValidationReport`]; they are data, not errors.
//!
//! - **Geometry**: [`GeometryEngine`] computes knee, hip, back, shoulder and
//!   ankle angles plus left/right segment widths.
//!
//! - **Quality**: [`QualityAssessor`] buckets frames and series by mean
//!   keypoint confidence.
//!
//! - **Pipeline**: [`SessionAnalyzer`] runs all of the above over a capture.
//!
//! ## Feature Flags
//!
//! - `parallel`: enrich frames on the rayon thread pool
//!
//! ## Example
//!
//! ```rust
//! use exercise_pose_core::{Frame, GeometryEngine, Keypoint, Side};
//!
//! let frame = Frame::new(
//!     0,
//!     0.0,
//!     vec![
//!         Keypoint::new("left_hip", 0.5, 0.4, 0.9),
//!         Keypoint::new("left_knee", 0.5, 0.6, 0.9),
//!         Keypoint::new("left_ankle", 0.5, 0.8, 0.9),
//!     ],
//! );
//!
//! let engine = GeometryEngine::default();
//! let knee = engine.knee_angle(&frame.view(), Side::Left).unwrap();
//! assert!((knee - 180.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod quality;
pub mod types;
pub mod utils;
pub mod validator;

// Re-export commonly used types at the crate root
pub use aggregator::{FrameAggregator, SeriesValidation, SessionStatistics};
pub use analyzer::{FrameAnalysis, SessionAnalysis, SessionAnalyzer};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, AngleDomain, AngleDomains, GeometryConfig,
    QualityBuckets, SeriesLimits,
};
pub use error::{
    CoreError, CoreResult, IssueCategory, IssueKind, ValidationIssue, ValidationReport,
};
pub use geometry::{angle_at_vertex, distance, GeometryEngine, Point2};
pub use ingest::{series_from_json_str, Decoded};
pub use quality::{QualityAssessor, QualityBucket, QualityResult, SeriesQuality};
pub use types::{
    Frame, JointAngles, JointKind, Keypoint, KeypointName, PoseSeries, PoseView,
    SegmentDistances, SegmentKind, Side,
};
pub use validator::{KeypointSetOptions, KeypointSetReport, KeypointStats, KeypointValidator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default confidence a keypoint or frame must reach to be trusted
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Prelude module for convenient imports.
///
/// ```rust
/// use exercise_pose_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::analyzer::{SessionAnalysis, SessionAnalyzer};
    pub use crate::config::AnalysisConfig;
    pub use crate::error::{CoreError, CoreResult, ValidationReport};
    pub use crate::geometry::GeometryEngine;
    pub use crate::quality::{QualityAssessor, QualityBucket};
    pub use crate::types::{
        Frame, JointAngles, JointKind, Keypoint, KeypointName, PoseSeries, SegmentDistances,
        SegmentKind, Side,
    };
    pub use crate::validator::KeypointValidator;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(KeypointName::COUNT, 21);
        assert!(DEFAULT_CONFIDENCE_THRESHOLD > 0.0);
        assert!(DEFAULT_CONFIDENCE_THRESHOLD < 1.0);
    }

    #[test]
    fn test_default_config_is_consistent() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }
}
