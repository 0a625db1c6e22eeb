//! Frame and series validation, and session statistics.
//!
//! One bad frame never aborts a series: its issues are reported under its
//! position (`frames[i]`) and the remaining frames are still processed.
//! Out-of-order or repeated frame indices only raise warnings, because they
//! break monotonic-time assumptions without corrupting any computation.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::{AnalysisConfig, AngleDomains, SeriesLimits};
use crate::error::{IssueKind, ValidationReport};
use crate::types::{Frame, JointAngles, JointKind, PoseSeries};
use crate::utils::{mean, round_to};
use crate::validator::KeypointValidator;

/// Descriptive statistics over a session's frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatistics {
    /// Number of frames
    pub total_frames: usize,
    /// Mean of each joint angle over the frames that carry it
    pub average_angles_by_kind: JointAngles,
    /// Mean over every keypoint confidence of every frame
    pub average_confidence: f64,
    /// Earliest timestamp, if any
    pub min_timestamp: Option<f64>,
    /// Latest timestamp, if any
    pub max_timestamp: Option<f64>,
    /// `max_timestamp - min_timestamp`, 0 with fewer than two timestamps
    pub duration_secs: f64,
}

/// Series validation with a per-frame verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesValidation {
    /// Issues found across the series
    pub report: ValidationReport,
    /// `true` for each frame, in input order, that passed validation
    pub frame_validity: Vec<bool>,
}

impl SeriesValidation {
    /// Number of frames that failed validation.
    #[must_use]
    pub fn invalid_frames(&self) -> usize {
        self.frame_validity.iter().filter(|valid| !**valid).count()
    }
}

/// Validates frames and series and rolls frames up into statistics.
#[derive(Debug, Clone)]
pub struct FrameAggregator {
    validator: KeypointValidator,
    domains: AngleDomains,
    limits: SeriesLimits,
    precision: u32,
}

impl Default for FrameAggregator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl FrameAggregator {
    /// Creates an aggregator from `config`.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            validator: KeypointValidator::new(config),
            domains: config.angle_domains,
            limits: config.series,
            precision: config.angle_precision,
        }
    }

    /// Validates one frame: its timestamp, its keypoints, and any angles or
    /// distances it already carries.
    #[must_use]
    pub fn validate_frame(&self, frame: &Frame) -> ValidationReport {
        let mut report = ValidationReport::new();

        if !frame.timestamp_secs.is_finite() {
            report.error("", IssueKind::structural("timestamp_secs", "must be a finite number"));
        } else if frame.timestamp_secs < 0.0 {
            report.error(
                "",
                IssueKind::domain_range("timestamp_secs", frame.timestamp_secs, 0.0, f64::INFINITY),
            );
        }

        report.merge("", self.validator.validate_keypoints(&frame.keypoints).report);

        for (kind, value) in frame.angles.iter() {
            let field = format!("angles.{kind}");
            let domain = self.domains.for_kind(kind);
            if !value.is_finite() {
                report.error("", IssueKind::structural(field, "must be a finite number"));
            } else if !domain.contains(value) {
                report.error("", IssueKind::domain_range(field, value, domain.min, domain.max));
            }
        }

        for (kind, value) in frame.distances.iter() {
            let field = format!("distances.{kind}");
            if !value.is_finite() {
                report.error("", IssueKind::structural(field, "must be a finite number"));
            } else if value < 0.0 {
                report.error("", IssueKind::domain_range(field, value, 0.0, f64::INFINITY));
            }
        }

        report
    }

    /// Validates every frame and checks index ordering.
    ///
    /// Each index must be greater than the one before it in arrival order;
    /// every violation adds one sequence warning.
    #[must_use]
    pub fn validate_series(&self, frames: &[Frame]) -> ValidationReport {
        self.check_series(frames).report
    }

    /// Like [`FrameAggregator::validate_series`], also returning which frames
    /// passed.
    #[must_use]
    #[instrument(skip_all, fields(frames = frames.len()))]
    pub fn check_series(&self, frames: &[Frame]) -> SeriesValidation {
        let mut report = ValidationReport::new();
        let mut frame_validity = Vec::with_capacity(frames.len());

        for (i, frame) in frames.iter().enumerate() {
            let frame_report = self.validate_frame(frame);
            frame_validity.push(frame_report.is_valid());
            report.merge(&format!("frames[{i}]"), frame_report);
        }

        for (i, pair) in frames.windows(2).enumerate() {
            let (previous, current) = (pair[0].index, pair[1].index);
            if current <= previous {
                warn!(previous, current, "Frame index out of order");
                report.warn(
                    format!("frames[{}]", i + 1),
                    IssueKind::SequenceOrder { previous, current },
                );
            }
        }

        let validation = SeriesValidation {
            report,
            frame_validity,
        };
        debug!(
            invalid_frames = validation.invalid_frames(),
            errors = validation.report.errors().len(),
            warnings = validation.report.warnings().len(),
            "Series validated"
        );
        validation
    }

    /// Validates a full capture: frames, frame rate, and declared frame count.
    #[must_use]
    pub fn validate_pose_series(&self, series: &PoseSeries) -> ValidationReport {
        self.check_pose_series(series).report
    }

    /// Like [`FrameAggregator::validate_pose_series`], also returning which
    /// frames passed.
    #[must_use]
    pub fn check_pose_series(&self, series: &PoseSeries) -> SeriesValidation {
        let mut report = ValidationReport::new();

        if !series.fps.is_finite() {
            report.error("", IssueKind::structural("fps", "must be a finite number"));
        } else if !(self.limits.min_fps..=self.limits.max_fps).contains(&series.fps) {
            report.error(
                "",
                IssueKind::domain_range("fps", series.fps, self.limits.min_fps, self.limits.max_fps),
            );
        }

        if let Some(declared) = series.total_frames {
            if declared != series.frames.len() {
                report.warn(
                    "total_frames",
                    IssueKind::FrameCountMismatch {
                        declared,
                        actual: series.frames.len(),
                    },
                );
            }
        }

        let mut validation = self.check_series(&series.frames);
        report.merge("", validation.report);
        validation.report = report;
        validation
    }

    /// Mean of `kind` over the frames that carry a finite value for it,
    /// rounded to the configured precision. `None` if no frame does.
    #[must_use]
    pub fn average_angle(&self, frames: &[Frame], kind: JointKind) -> Option<f64> {
        mean(
            frames
                .iter()
                .filter_map(|frame| frame.angles.get(kind))
                .filter(|value| value.is_finite()),
        )
        .map(|avg| round_to(avg, self.precision))
    }

    /// Descriptive statistics over `frames`.
    ///
    /// Timestamps are reduced over the whole input, so frame order does not
    /// matter. The confidence mean runs over every keypoint of every frame,
    /// which weights frames by their keypoint count.
    #[must_use]
    #[instrument(skip_all, fields(frames = frames.len()))]
    pub fn session_statistics(&self, frames: &[Frame]) -> SessionStatistics {
        let average_angles_by_kind = JointKind::ALL
            .into_iter()
            .filter_map(|kind| Some((kind, self.average_angle(frames, kind)?)))
            .collect();

        let average_confidence = mean(
            frames
                .iter()
                .flat_map(Frame::confidences)
                .filter(|c| c.is_finite()),
        )
        .unwrap_or(0.0);

        let timestamps: Vec<f64> = frames
            .iter()
            .map(|frame| frame.timestamp_secs)
            .filter(|ts| ts.is_finite())
            .collect();
        let min_timestamp = timestamps.iter().copied().reduce(f64::min);
        let max_timestamp = timestamps.iter().copied().reduce(f64::max);
        let duration_secs = match (min_timestamp, max_timestamp) {
            (Some(min), Some(max)) if timestamps.len() >= 2 => max - min,
            _ => 0.0,
        };

        SessionStatistics {
            total_frames: frames.len(),
            average_angles_by_kind,
            average_confidence,
            min_timestamp,
            max_timestamp,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueCategory;
    use crate::types::Keypoint;

    fn frame(index: u64, ts: f64) -> Frame {
        Frame::new(index, ts, vec![Keypoint::new("nose", 0.5, 0.2, 0.9)])
    }

    #[test]
    fn test_valid_frame() {
        let f = frame(0, 0.0).with_angle(JointKind::Back, -12.0);
        assert!(FrameAggregator::default().validate_frame(&f).is_clean());
    }

    #[test]
    fn test_frame_angle_out_of_domain() {
        let f = frame(0, 0.0)
            .with_angle(JointKind::Knee, 190.0)
            .with_angle(JointKind::Back, 95.0);
        let report = FrameAggregator::default().validate_frame(&f);
        assert!(!report.is_valid());
        assert_eq!(report.error_count(IssueCategory::DomainRange), 2);
        assert!(report.errors()[0].to_string().contains("angles.knee"));
    }

    #[test]
    fn test_frame_without_keypoints_invalid() {
        let f = Frame::new(0, 0.0, vec![]);
        assert!(!FrameAggregator::default().validate_frame(&f).is_valid());
    }

    #[test]
    fn test_negative_timestamp_invalid() {
        let report = FrameAggregator::default().validate_frame(&frame(0, -1.0));
        assert_eq!(report.error_count(IssueCategory::DomainRange), 1);
    }

    #[test]
    fn test_series_out_of_order_is_warning() {
        let frames = vec![frame(0, 0.0), frame(2, 0.2), frame(1, 0.1)];
        let report = FrameAggregator::default().validate_series(&frames);
        assert!(report.is_valid());
        assert_eq!(report.warning_count(IssueCategory::Sequence), 1);
        assert_eq!(report.warnings()[0].path, "frames[2]");
    }

    #[test]
    fn test_series_duplicate_index_is_warning() {
        let frames = vec![frame(0, 0.0), frame(1, 0.1), frame(1, 0.2)];
        let report = FrameAggregator::default().validate_series(&frames);
        assert!(report.is_valid());
        assert_eq!(report.warning_count(IssueCategory::Sequence), 1);
    }

    #[test]
    fn test_series_bad_frame_reported_in_place() {
        let mut bad = frame(1, 0.1);
        bad.keypoints[0].x = 3.0;
        let frames = vec![frame(0, 0.0), bad, frame(2, 0.2)];
        let report = FrameAggregator::default().validate_series(&frames);
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].path, "frames[1].keypoints[0]");
    }

    #[test]
    fn test_check_series_reports_frame_validity() {
        let mut bad = frame(1, 0.1);
        bad.keypoints.clear();
        let validation = FrameAggregator::default().check_series(&[frame(0, 0.0), bad]);
        assert_eq!(validation.frame_validity, vec![true, false]);
        assert_eq!(validation.invalid_frames(), 1);
    }

    #[test]
    fn test_pose_series_checks() {
        let mut series = PoseSeries::new(vec![frame(0, 0.0), frame(1, 0.1)], 240.0);
        series.total_frames = Some(3);
        let report = FrameAggregator::default().validate_pose_series(&series);
        assert!(!report.is_valid());
        assert_eq!(report.error_count(IssueCategory::DomainRange), 1);
        assert_eq!(report.warning_count(IssueCategory::Sequence), 1);
    }

    #[test]
    fn test_average_angle_rounds() {
        let frames = vec![
            frame(0, 0.0).with_angle(JointKind::Knee, 90.123),
            frame(1, 0.1),
            frame(2, 0.2).with_angle(JointKind::Knee, 100.0),
        ];
        let avg = FrameAggregator::default().average_angle(&frames, JointKind::Knee);
        assert_eq!(avg, Some(95.06));
    }

    #[test]
    fn test_average_angle_absent() {
        let aggregator = FrameAggregator::default();
        assert_eq!(aggregator.average_angle(&[], JointKind::Hip), None);
        assert_eq!(aggregator.average_angle(&[frame(0, 0.0)], JointKind::Hip), None);
    }

    #[test]
    fn test_statistics_flatten_confidences() {
        // Per-frame means would give (0.9 + 0.3) / 2 = 0.6; flattened is
        // (0.9 * 3 + 0.3) / 4 = 0.75.
        let rich = Frame::new(
            0,
            1.0,
            vec![
                Keypoint::new("nose", 0.5, 0.2, 0.9),
                Keypoint::new("left_eye", 0.48, 0.18, 0.9),
                Keypoint::new("right_eye", 0.52, 0.18, 0.9),
            ],
        );
        let sparse = Frame::new(1, 3.5, vec![Keypoint::new("nose", 0.5, 0.2, 0.3)]);
        let stats = FrameAggregator::default().session_statistics(&[rich, sparse]);
        assert!((stats.average_confidence - 0.75).abs() < 1e-12);
        assert_eq!(stats.total_frames, 2);
        assert!((stats.duration_secs - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_single_frame_has_no_duration() {
        let stats = FrameAggregator::default().session_statistics(&[frame(0, 4.0)]);
        assert_eq!(stats.min_timestamp, Some(4.0));
        assert_eq!(stats.max_timestamp, Some(4.0));
        assert!((stats.duration_secs - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = FrameAggregator::default().session_statistics(&[]);
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.min_timestamp, None);
        assert!(stats.average_angles_by_kind.is_empty());
        assert!((stats.average_confidence - 0.0).abs() < f64::EPSILON);
    }
}
