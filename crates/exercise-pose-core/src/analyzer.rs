//! End-to-end session analysis.
//!
//! [`SessionAnalyzer`] wires the components together in their data-flow
//! order: validate the capture, fill in missing angles and distances, score
//! each frame and the whole series, then roll the enriched frames up into
//! [`SessionStatistics`]. Invalid frames are reported, never fatal, and are
//! left out of the series quality and the statistics.
//!
//! With the `parallel` feature, per-frame enrichment runs on the rayon
//! thread pool. Reductions stay sequential.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{FrameAggregator, SessionStatistics};
use crate::config::AnalysisConfig;
use crate::error::{CoreResult, ValidationReport};
use crate::geometry::GeometryEngine;
use crate::quality::{QualityAssessor, QualityResult, SeriesQuality};
use crate::types::{Frame, JointAngles, PoseSeries, SegmentDistances};

/// Measurements and quality of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAnalysis {
    /// Frame index
    pub index: u64,
    /// Capture time in seconds
    pub timestamp_secs: f64,
    /// Joint angles, supplied or computed
    pub angles: JointAngles,
    /// Segment distances, supplied or computed
    pub distances: SegmentDistances,
    /// Confidence-based quality
    pub quality: QualityResult,
    /// Whether the frame passed validation
    pub valid: bool,
}

impl FrameAnalysis {
    /// Whether the frame should count towards scoring.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.valid && self.quality.meets_threshold
    }
}

/// Result of analyzing a whole capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalysis {
    /// Validation of the capture as supplied
    pub report: ValidationReport,
    /// Per-frame results, in arrival order
    pub frames: Vec<FrameAnalysis>,
    /// Series-level quality over the valid frames
    pub series_quality: SeriesQuality,
    /// Descriptive statistics over the valid frames; `total_frames` counts
    /// every input frame
    pub statistics: SessionStatistics,
}

impl SessionAnalysis {
    /// Number of frames that count towards scoring.
    #[must_use]
    pub fn scored_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_scored()).count()
    }
}

/// Runs the full analysis pipeline with one configuration.
#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    config: AnalysisConfig,
    geometry: GeometryEngine,
    quality: QualityAssessor,
    aggregator: FrameAggregator,
}

impl SessionAnalyzer {
    /// Creates an analyzer after checking `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Configuration`] if the configuration is
    /// inconsistent.
    pub fn new(config: AnalysisConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            geometry: GeometryEngine::new(&config),
            quality: QualityAssessor::new(&config),
            aggregator: FrameAggregator::new(&config),
            config,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The geometry engine in use.
    #[must_use]
    pub const fn geometry(&self) -> &GeometryEngine {
        &self.geometry
    }

    /// The quality assessor in use.
    #[must_use]
    pub const fn quality(&self) -> &QualityAssessor {
        &self.quality
    }

    /// The frame aggregator in use.
    #[must_use]
    pub const fn aggregator(&self) -> &FrameAggregator {
        &self.aggregator
    }

    /// Analyzes a single frame.
    #[must_use]
    pub fn analyze_frame(&self, frame: &Frame) -> FrameAnalysis {
        let valid = self.aggregator.validate_frame(frame).is_valid();
        let enriched = self.geometry.enrich(frame);
        self.summarize(enriched, valid)
    }

    /// Analyzes a whole capture.
    #[must_use]
    #[instrument(skip_all, fields(frames = series.len(), fps = series.fps))]
    pub fn analyze(&self, series: &PoseSeries) -> SessionAnalysis {
        let validation = self.aggregator.check_pose_series(series);

        let enriched = self.enrich_all(&series.frames);
        let usable: Vec<Frame> = enriched
            .iter()
            .zip(&validation.frame_validity)
            .filter(|(_, valid)| **valid)
            .map(|(frame, _)| frame.clone())
            .collect();
        let series_quality = self.quality.assess_series(&usable);
        let mut statistics = self.aggregator.session_statistics(&usable);
        statistics.total_frames = series.len();

        let frames: Vec<FrameAnalysis> = enriched
            .into_iter()
            .zip(validation.frame_validity)
            .map(|(frame, valid)| self.summarize(frame, valid))
            .collect();

        let analysis = SessionAnalysis {
            report: validation.report,
            frames,
            series_quality,
            statistics,
        };

        let invalid = analysis.frames.len() - usable.len();
        if invalid > 0 {
            warn!(invalid, "Invalid frames left out of session statistics");
        }
        let dropped = analysis.frames.len() - analysis.scored_frames();
        if dropped > 0 {
            warn!(dropped, "Frames excluded from scoring");
        }
        info!(
            valid = analysis.report.is_valid(),
            bucket = %analysis.series_quality.bucket,
            duration_secs = analysis.statistics.duration_secs,
            "Session analyzed"
        );
        analysis
    }

    fn summarize(&self, frame: Frame, valid: bool) -> FrameAnalysis {
        let quality = self.quality.assess_frame(&frame);
        FrameAnalysis {
            index: frame.index,
            timestamp_secs: frame.timestamp_secs,
            angles: frame.angles,
            distances: frame.distances,
            quality,
            valid,
        }
    }

    #[cfg(feature = "parallel")]
    fn enrich_all(&self, frames: &[Frame]) -> Vec<Frame> {
        use rayon::prelude::*;
        debug!(frames = frames.len(), "Enriching frames in parallel");
        frames.par_iter().map(|frame| self.geometry.enrich(frame)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn enrich_all(&self, frames: &[Frame]) -> Vec<Frame> {
        debug!(frames = frames.len(), "Enriching frames");
        frames.iter().map(|frame| self.geometry.enrich(frame)).collect()
    }
}
