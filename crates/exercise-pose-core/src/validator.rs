//! Keypoint validation.
//!
//! Checks single keypoints and keypoint sets against the coordinate and
//! confidence domain rules. Every violation is collected; nothing
//! short-circuits. Low confidence is reported as a warning only, because it
//! degrades reliability without invalidating the data.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{IssueKind, ValidationReport};
use crate::types::Keypoint;

const UNIT_MIN: f64 = 0.0;
const UNIT_MAX: f64 = 1.0;

/// Limits applied to a keypoint set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointSetOptions {
    /// Minimum number of keypoints
    pub min_count: usize,
    /// Confidence below which a keypoint is flagged
    pub min_confidence: f64,
}

impl Default for KeypointSetOptions {
    fn default() -> Self {
        Self {
            min_count: 1,
            min_confidence: crate::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl From<&AnalysisConfig> for KeypointSetOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_count: config.min_keypoint_count,
            min_confidence: config.min_confidence_threshold,
        }
    }
}

/// Counts gathered while validating a keypoint set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeypointStats {
    /// Keypoints examined
    pub total: usize,
    /// Keypoints without any structural or domain error
    pub valid: usize,
    /// Keypoints below the confidence threshold
    pub low_confidence: usize,
}

impl KeypointStats {
    /// Fraction of keypoints that passed validation.
    #[must_use]
    pub fn valid_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 / self.total as f64
        }
    }
}

/// Validation outcome for a keypoint set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeypointSetReport {
    /// Collected errors and warnings
    #[serde(flatten)]
    pub report: ValidationReport,
    /// Per-set counts
    pub stats: KeypointStats,
}

/// Validates keypoints against domain rules.
#[derive(Debug, Clone, Default)]
pub struct KeypointValidator {
    options: KeypointSetOptions,
}

impl KeypointValidator {
    /// Creates a validator using the limits of `config`.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            options: KeypointSetOptions::from(config),
        }
    }

    /// Creates a validator with explicit limits.
    #[must_use]
    pub const fn with_options(options: KeypointSetOptions) -> Self {
        Self { options }
    }

    /// Validates a single keypoint.
    ///
    /// Reports an empty name, non-finite or out-of-range `x`/`y`/`confidence`,
    /// and a non-finite `z`. `z` has no range constraint.
    #[must_use]
    pub fn validate_keypoint(&self, kp: &Keypoint) -> ValidationReport {
        let mut report = ValidationReport::new();

        if kp.name.trim().is_empty() {
            report.error("", IssueKind::structural("name", "must be a non-empty string"));
        }

        check_unit(&mut report, "x", kp.x);
        check_unit(&mut report, "y", kp.y);
        check_unit(&mut report, "confidence", kp.confidence);

        if let Some(z) = kp.z {
            if !z.is_finite() {
                report.error("", IssueKind::structural("z", "must be a finite number when present"));
            }
        }

        report
    }

    /// Validates a keypoint set with this validator's limits.
    #[must_use]
    pub fn validate_keypoints(&self, keypoints: &[Keypoint]) -> KeypointSetReport {
        self.validate_keypoints_with(keypoints, self.options)
    }

    /// Validates a keypoint set with explicit limits.
    ///
    /// Errors: any invalid keypoint, or fewer than `min_count` keypoints.
    /// Warnings: keypoints whose confidence is below `min_confidence`.
    #[must_use]
    pub fn validate_keypoints_with(
        &self,
        keypoints: &[Keypoint],
        options: KeypointSetOptions,
    ) -> KeypointSetReport {
        let mut report = ValidationReport::new();
        let mut stats = KeypointStats {
            total: keypoints.len(),
            ..KeypointStats::default()
        };

        if keypoints.len() < options.min_count {
            report.error(
                "keypoints",
                IssueKind::InsufficientKeypoints {
                    required: options.min_count,
                    actual: keypoints.len(),
                },
            );
        }

        for (i, kp) in keypoints.iter().enumerate() {
            let path = format!("keypoints[{i}]");
            let single = self.validate_keypoint(kp);
            if single.is_valid() {
                stats.valid += 1;
            }
            report.merge(&path, single);

            if kp.confidence.is_finite() && kp.confidence < options.min_confidence {
                stats.low_confidence += 1;
                report.warn(
                    path,
                    IssueKind::LowConfidence {
                        name: kp.name.clone(),
                        confidence: kp.confidence,
                        threshold: options.min_confidence,
                    },
                );
            }
        }

        KeypointSetReport { report, stats }
    }
}

fn check_unit(report: &mut ValidationReport, field: &str, value: f64) {
    if !value.is_finite() {
        report.error("", IssueKind::structural(field, "must be a finite number"));
    } else if !(UNIT_MIN..=UNIT_MAX).contains(&value) {
        report.error("", IssueKind::domain_range(field, value, UNIT_MIN, UNIT_MAX));
    }
}
