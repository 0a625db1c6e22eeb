//! Confidence-based quality assessment.
//!
//! A frame's quality is the plain mean of its keypoint confidences, mapped
//! onto a [`QualityBucket`] by the configured thresholds. A series is scored
//! by averaging the per-frame means, so every frame weighs the same no matter
//! how many keypoints it carries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AnalysisConfig, QualityBuckets};
use crate::types::Frame;
use crate::utils::mean;

/// Discrete quality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityBucket {
    /// Average confidence below the fair threshold
    Poor,
    /// Average confidence at or above the fair threshold
    Fair,
    /// Average confidence at or above the good threshold
    Good,
}

impl QualityBucket {
    /// Buckets an average confidence, evaluating thresholds top-down with
    /// inclusive lower bounds.
    #[must_use]
    pub fn classify(average_confidence: f64, buckets: &QualityBuckets) -> Self {
        if average_confidence >= buckets.good {
            Self::Good
        } else if average_confidence >= buckets.fair {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Label as shown to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for QualityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    /// Mean keypoint confidence, 0 when the frame has no keypoints
    pub average_confidence: f64,
    /// Bucket of `average_confidence`
    pub bucket: QualityBucket,
    /// Whether `average_confidence` reaches the scoring threshold
    pub meets_threshold: bool,
}

/// Quality of a whole series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesQuality {
    /// Unweighted mean of per-frame average confidences
    pub average_confidence: f64,
    /// Bucket of `average_confidence`
    pub bucket: QualityBucket,
    /// Frames assessed
    pub frame_count: usize,
    /// Frames whose average confidence is below the poor floor
    pub unusable_frames: usize,
    /// Frames whose average confidence reaches the scoring threshold
    pub frames_meeting_threshold: usize,
}

/// Scores frames and series by keypoint confidence.
#[derive(Debug, Clone)]
pub struct QualityAssessor {
    buckets: QualityBuckets,
    min_confidence: f64,
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl QualityAssessor {
    /// Creates an assessor using the thresholds of `config`.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            buckets: config.quality_buckets,
            min_confidence: config.min_confidence_threshold,
        }
    }

    /// Mean keypoint confidence of a frame in `[0, 1]`, 0 for an empty
    /// frame. Non-finite confidences are skipped.
    #[must_use]
    pub fn frame_confidence(frame: &Frame) -> f64 {
        mean(frame.confidences().filter(|c| c.is_finite()))
            .map_or(0.0, |avg| avg.clamp(0.0, 1.0))
    }

    /// Assesses a frame against the configured confidence threshold.
    #[must_use]
    pub fn assess_frame(&self, frame: &Frame) -> QualityResult {
        self.assess_frame_with(frame, self.min_confidence)
    }

    /// Assesses a frame against an explicit confidence threshold.
    #[must_use]
    pub fn assess_frame_with(&self, frame: &Frame, min_confidence: f64) -> QualityResult {
        let average_confidence = Self::frame_confidence(frame);
        QualityResult {
            average_confidence,
            bucket: QualityBucket::classify(average_confidence, &self.buckets),
            meets_threshold: average_confidence >= min_confidence,
        }
    }

    /// Assesses a series of frames against the configured confidence
    /// threshold.
    ///
    /// An empty series scores 0 and lands in [`QualityBucket::Poor`].
    #[must_use]
    pub fn assess_series(&self, frames: &[Frame]) -> SeriesQuality {
        self.assess_series_with(frames, self.min_confidence)
    }

    /// Assesses a series of frames against an explicit confidence threshold.
    #[must_use]
    pub fn assess_series_with(&self, frames: &[Frame], min_confidence: f64) -> SeriesQuality {
        let per_frame: Vec<f64> = frames.iter().map(Self::frame_confidence).collect();
        let average_confidence = mean(per_frame.iter().copied()).unwrap_or(0.0);
        let unusable_frames = per_frame
            .iter()
            .filter(|&&c| c < self.buckets.poor)
            .count();
        let frames_meeting_threshold = per_frame.iter().filter(|&&c| c >= min_confidence).count();

        let quality = SeriesQuality {
            average_confidence,
            bucket: QualityBucket::classify(average_confidence, &self.buckets),
            frame_count: frames.len(),
            unusable_frames,
            frames_meeting_threshold,
        };
        debug!(
            frames = quality.frame_count,
            average_confidence = quality.average_confidence,
            bucket = %quality.bucket,
            "Series quality assessed"
        );
        quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Keypoint;

    fn frame_with(confidences: &[f64]) -> Frame {
        let keypoints = confidences
            .iter()
            .map(|&c| Keypoint::new("nose", 0.5, 0.5, c))
            .collect();
        Frame::new(0, 0.0, keypoints)
    }

    #[test]
    fn test_bucket_boundaries_inclusive() {
        let buckets = QualityBuckets::default();
        assert_eq!(QualityBucket::classify(0.7, &buckets), QualityBucket::Good);
        assert_eq!(QualityBucket::classify(0.699, &buckets), QualityBucket::Fair);
        assert_eq!(QualityBucket::classify(0.5, &buckets), QualityBucket::Fair);
        assert_eq!(QualityBucket::classify(0.499, &buckets), QualityBucket::Poor);
        assert_eq!(QualityBucket::classify(0.0, &buckets), QualityBucket::Poor);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let config = AnalysisConfig::builder().quality_buckets(0.9, 0.8, 0.1).build();
        let assessor = QualityAssessor::new(&config);
        let result = assessor.assess_frame(&frame_with(&[0.85]));
        assert_eq!(result.bucket, QualityBucket::Fair);
    }

    #[test]
    fn test_assess_frame() {
        let assessor = QualityAssessor::default();
        let result = assessor.assess_frame(&frame_with(&[0.9, 0.7, 0.8]));
        assert!((result.average_confidence - 0.8).abs() < 1e-12);
        assert_eq!(result.bucket, QualityBucket::Good);
        assert!(result.meets_threshold);
    }

    #[test]
    fn test_assess_frame_custom_threshold() {
        let assessor = QualityAssessor::default();
        let result = assessor.assess_frame_with(&frame_with(&[0.6]), 0.65);
        assert_eq!(result.bucket, QualityBucket::Fair);
        assert!(!result.meets_threshold);
    }

    #[test]
    fn test_empty_frame_scores_zero() {
        let result = QualityAssessor::default().assess_frame(&frame_with(&[]));
        assert!((result.average_confidence - 0.0).abs() < f64::EPSILON);
        assert_eq!(result.bucket, QualityBucket::Poor);
        assert!(!result.meets_threshold);
    }

    #[test]
    fn test_series_is_unweighted_by_keypoint_count() {
        // Per-frame means 1.0 and 0.2: series mean is 0.6, not the
        // keypoint-weighted (1.0 * 4 + 0.2) / 5 = 0.84.
        let frames = vec![frame_with(&[1.0, 1.0, 1.0, 1.0]), frame_with(&[0.2])];
        let quality = QualityAssessor::default().assess_series(&frames);
        assert!((quality.average_confidence - 0.6).abs() < 1e-12);
        assert_eq!(quality.bucket, QualityBucket::Fair);
        assert_eq!(quality.frame_count, 2);
        assert_eq!(quality.unusable_frames, 1);
    }

    #[test]
    fn test_series_counts_frames_meeting_threshold() {
        let frames = vec![frame_with(&[0.9]), frame_with(&[0.6]), frame_with(&[0.4])];
        let assessor = QualityAssessor::default();
        assert_eq!(assessor.assess_series(&frames).frames_meeting_threshold, 2);
        assert_eq!(assessor.assess_series_with(&frames, 0.65).frames_meeting_threshold, 1);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped() {
        let result = QualityAssessor::default().assess_frame(&frame_with(&[1.5, 1.5]));
        assert!((result.average_confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.bucket, QualityBucket::Good);
    }

    #[test]
    fn test_meets_threshold_is_inclusive() {
        let result = QualityAssessor::default().assess_frame(&frame_with(&[0.5]));
        assert!(result.meets_threshold);
    }

    #[test]
    fn test_empty_series() {
        let quality = QualityAssessor::default().assess_series(&[]);
        assert_eq!(quality.frame_count, 0);
        assert_eq!(quality.bucket, QualityBucket::Poor);
        assert_eq!(quality.frames_meeting_threshold, 0);
    }
}
