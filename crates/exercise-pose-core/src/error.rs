//! Error and validation-result types for the pose-analysis core.
//!
//! This module provides error handling using [`thiserror`] for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Error Hierarchy
//!
//! - [`CoreError`]: failures of the caller's setup (bad configuration,
//!   undecodable documents). Returned through [`CoreResult`].
//! - [`IssueKind`]: a single problem found in pose data. Issues are
//!   *collected* into a [`ValidationReport`], never returned as `Err`,
//!   because malformed keypoints and frames are expected input.
//!
//! Geometric undefined-ness (coincident points, missing landmarks) is not an
//! error at all: geometry functions return `None`.
//!
//! # Example
//!
//! ```rust
//! use exercise_pose_core::error::{IssueKind, ValidationReport};
//!
//! let mut report = ValidationReport::new();
//! report.warn("frames", IssueKind::SequenceOrder { previous: 2, current: 1 });
//! assert!(report.is_valid());
//! assert_eq!(report.warnings().len(), 1);
//! ```

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for the pose-analysis core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// A document could not be decoded at all
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Broad category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Missing required field or wrong type
    Structural,
    /// Value outside its declared numeric domain
    DomainRange,
    /// Keypoint detected with degraded reliability
    LowConfidence,
    /// Frame ordering or frame-count anomaly
    Sequence,
}

impl IssueCategory {
    /// Every category.
    pub const ALL: [Self; 4] = [
        Self::Structural,
        Self::DomainRange,
        Self::LowConfidence,
        Self::Sequence,
    ];

    /// Category label as shown to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::DomainRange => "domain_range",
            Self::LowConfidence => "low_confidence",
            Self::Sequence => "sequence",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in pose data.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum IssueKind {
    /// Required field missing or of the wrong type
    #[error("{field} {reason}")]
    Structural {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Numeric value outside its domain
    #[error("{field} = {value} out of range [{min}, {max}]")]
    DomainRange {
        /// Offending field
        field: String,
        /// The value found
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// Fewer keypoints than required
    #[error("expected at least {required} keypoints, got {actual}")]
    InsufficientKeypoints {
        /// Minimum keypoint count
        required: usize,
        /// Keypoints supplied
        actual: usize,
    },

    /// Keypoint confidence below the reliability threshold
    #[error("{name} has low confidence {confidence:.2} (threshold {threshold:.2})")]
    LowConfidence {
        /// Keypoint name
        name: String,
        /// Reported confidence
        confidence: f64,
        /// Threshold it fell below
        threshold: f64,
    },

    /// Frame index did not strictly increase
    #[error("frame index {current} does not follow {previous}")]
    SequenceOrder {
        /// Index of the preceding frame
        previous: u64,
        /// Index that broke the ordering
        current: u64,
    },

    /// Declared frame count disagrees with the frames supplied
    #[error("declared {declared} frames but {actual} were supplied")]
    FrameCountMismatch {
        /// `total_frames` as declared
        declared: usize,
        /// Number of frames present
        actual: usize,
    },
}

impl IssueKind {
    /// Creates a structural issue.
    #[must_use]
    pub fn structural(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Structural {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a domain-range issue.
    #[must_use]
    pub fn domain_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::DomainRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Returns the broad category of this issue.
    #[must_use]
    pub const fn category(&self) -> IssueCategory {
        match self {
            Self::Structural { .. } => IssueCategory::Structural,
            Self::DomainRange { .. } | Self::InsufficientKeypoints { .. } => {
                IssueCategory::DomainRange
            }
            Self::LowConfidence { .. } => IssueCategory::LowConfidence,
            Self::SequenceOrder { .. } | Self::FrameCountMismatch { .. } => {
                IssueCategory::Sequence
            }
        }
    }
}

/// An issue together with the location it was found at.
///
/// Locations are dotted paths such as `frames[3].keypoints[5]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Where the issue was found (empty for the root)
    pub path: String,
    /// What was found
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Creates a new located issue.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns the issue's category.
    #[must_use]
    pub const fn category(&self) -> IssueCategory {
        self.kind.category()
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl Serialize for ValidationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of validating a keypoint, frame or series.
///
/// `valid` is `false` as soon as one error is recorded. Warnings never
/// affect validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    /// Creates an empty, valid report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records an error.
    pub fn error(&mut self, path: impl Into<String>, kind: IssueKind) {
        self.valid = false;
        self.errors.push(ValidationIssue::new(path, kind));
    }

    /// Records a warning.
    pub fn warn(&mut self, path: impl Into<String>, kind: IssueKind) {
        self.warnings.push(ValidationIssue::new(path, kind));
    }

    /// Folds another report into this one, prefixing its paths with `prefix`.
    pub fn merge(&mut self, prefix: &str, other: Self) {
        let relocate = |mut issue: ValidationIssue| {
            issue.path = join_path(prefix, &issue.path);
            issue
        };
        self.valid &= other.valid;
        self.errors.extend(other.errors.into_iter().map(relocate));
        self.warnings.extend(other.warnings.into_iter().map(relocate));
    }

    /// Returns `true` if no error was recorded.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Recorded errors, in discovery order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Recorded warnings, in discovery order.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// Returns `true` if the report holds neither errors nor warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Counts the warnings of one category.
    #[must_use]
    pub fn warning_count(&self, category: IssueCategory) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.category() == category)
            .count()
    }

    /// Counts the errors of one category.
    #[must_use]
    pub fn error_count(&self, category: IssueCategory) -> usize {
        self.errors
            .iter()
            .filter(|e| e.category() == category)
            .count()
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if path.starts_with('[') => format!("{prefix}{path}"),
        (false, false) => format!("{prefix}.{path}"),
    }
}
