//! Joint geometry.
//!
//! Pure functions computing Euclidean distances and vertex angles from
//! keypoints, plus joint-specific helpers that pick the right landmark
//! topology for each joint.
//!
//! Partial detection is the normal case, so nothing here fails: a missing
//! landmark or a degenerate (zero-length) ray yields `None`, and a joint or
//! segment that cannot be measured is simply left out of the result maps.

use crate::config::{AnalysisConfig, GeometryConfig};
use crate::types::{
    Frame, JointAngles, JointKind, Keypoint, KeypointName, PoseView, SegmentDistances,
    SegmentKind, Side,
};
use crate::utils::{clamp_unit, mean_of_sides, rad_to_deg};

/// Angle between two opposite rays, in degrees.
const STRAIGHT_ANGLE_DEG: f64 = 180.0;

/// A point in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downwards)
    pub y: f64,
}

impl Point2 {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Planar position of a keypoint, if it has finite coordinates.
    #[must_use]
    pub fn from_keypoint(kp: &Keypoint) -> Option<Self> {
        kp.has_position().then(|| Self::new(kp.x, kp.y))
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Same point shifted by `dy` along the vertical axis.
    #[must_use]
    pub fn offset_y(self, dy: f64) -> Self {
        Self::new(self.x, self.y + dy)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle in degrees at `self` between the rays to `a` and `b`.
    ///
    /// Returns `None` if either ray has zero length.
    #[must_use]
    pub fn angle_between(self, a: Self, b: Self) -> Option<f64> {
        let (v1x, v1y) = (a.x - self.x, a.y - self.y);
        let (v2x, v2y) = (b.x - self.x, b.y - self.y);
        let norm1 = v1x.hypot(v1y);
        let norm2 = v2x.hypot(v2y);
        if norm1 == 0.0 || norm2 == 0.0 || !(norm1.is_finite() && norm2.is_finite()) {
            return None;
        }
        let cosine = v1x.mul_add(v2x, v1y * v2y) / (norm1 * norm2);
        Some(rad_to_deg(clamp_unit(cosine).acos()))
    }
}

/// Euclidean distance between two keypoints in normalized space.
///
/// Depth is ignored because its unit is model-defined. Returns `None` if
/// either keypoint lacks a finite position.
#[must_use]
pub fn distance(a: &Keypoint, b: &Keypoint) -> Option<f64> {
    Some(Point2::from_keypoint(a)?.distance_to(Point2::from_keypoint(b)?))
}

/// Angle in degrees at `vertex` between the rays to `p1` and `p2`.
///
/// `acos(clamp(v1·v2 / (|v1||v2|), -1, 1))`, so the result is always in
/// `[0, 180]`. Returns `None` if a point lacks a finite position or if
/// either ray is degenerate.
#[must_use]
pub fn angle_at_vertex(p1: &Keypoint, vertex: &Keypoint, p2: &Keypoint) -> Option<f64> {
    Point2::from_keypoint(vertex)?
        .angle_between(Point2::from_keypoint(p1)?, Point2::from_keypoint(p2)?)
}

/// Computes joint angles and segment distances for frames.
#[derive(Debug, Clone, Default)]
pub struct GeometryEngine {
    config: GeometryConfig,
}

impl GeometryEngine {
    /// Creates an engine using the geometry constants of `config`.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.geometry,
        }
    }

    /// Creates an engine from explicit geometry constants.
    #[must_use]
    pub const fn with_geometry(config: GeometryConfig) -> Self {
        Self { config }
    }

    /// Knee angle: vertex at the knee, rays to hip and ankle.
    #[must_use]
    pub fn knee_angle(&self, pose: &PoseView<'_>, side: Side) -> Option<f64> {
        three_point(
            pose,
            KeypointName::hip(side),
            KeypointName::knee(side),
            KeypointName::ankle(side),
        )
    }

    /// Hip angle: vertex at the hip, rays to shoulder and knee.
    #[must_use]
    pub fn hip_angle(&self, pose: &PoseView<'_>, side: Side) -> Option<f64> {
        three_point(
            pose,
            KeypointName::shoulder(side),
            KeypointName::hip(side),
            KeypointName::knee(side),
        )
    }

    /// Shoulder angle: vertex at the elbow, rays to shoulder and wrist.
    #[must_use]
    pub fn shoulder_angle(&self, pose: &PoseView<'_>, side: Side) -> Option<f64> {
        three_point(
            pose,
            KeypointName::shoulder(side),
            KeypointName::elbow(side),
            KeypointName::wrist(side),
        )
    }

    /// Ankle angle: vertex at the ankle, rays to the knee and to a synthetic
    /// point directly below the ankle.
    ///
    /// Stands in for foot flexion when no toe landmark is available; a
    /// vertical shin reads 180°.
    #[must_use]
    pub fn ankle_angle(&self, pose: &PoseView<'_>, side: Side) -> Option<f64> {
        let ankle = point(pose, KeypointName::ankle(side))?;
        let knee = point(pose, KeypointName::knee(side))?;
        let below = ankle.offset_y(self.config.ankle_reference_offset);
        ankle.angle_between(knee, below)
    }

    /// Trunk lean from vertical, capped at `geometry.max_lean_deg` (90 by
    /// default) on either side.
    ///
    /// The angle is taken at the shoulder midpoint between the hip midpoint
    /// and a synthetic reference point above the shoulders. A vertical trunk
    /// reads 0°; leaning in the configured forward direction is positive and
    /// leaning backwards negative. Needs both shoulders and both hips.
    ///
    /// The reference offset is an image-space approximation, not a
    /// camera-calibrated vertical.
    #[must_use]
    pub fn back_angle(&self, pose: &PoseView<'_>) -> Option<f64> {
        let shoulders = point(pose, KeypointName::LeftShoulder)?
            .midpoint(point(pose, KeypointName::RightShoulder)?);
        let hips =
            point(pose, KeypointName::LeftHip)?.midpoint(point(pose, KeypointName::RightHip)?);
        let reference = shoulders.offset_y(-self.config.vertical_reference_offset);

        let raw = shoulders.angle_between(reference, hips)?;
        let lean = (STRAIGHT_ANGLE_DEG - raw).min(self.config.max_lean_deg);
        let forward = (shoulders.x - hips.x) * self.config.forward_direction;
        Some(if forward < 0.0 { -lean } else { lean })
    }

    /// Angle of one joint kind on one side. `side` is ignored for the back.
    #[must_use]
    pub fn joint_angle(&self, pose: &PoseView<'_>, kind: JointKind, side: Side) -> Option<f64> {
        match kind {
            JointKind::Knee => self.knee_angle(pose, side),
            JointKind::Hip => self.hip_angle(pose, side),
            JointKind::Back => self.back_angle(pose),
            JointKind::Shoulder => self.shoulder_angle(pose, side),
            JointKind::Ankle => self.ankle_angle(pose, side),
        }
    }

    /// Bilateral angle of one joint kind: the mean of both sides when both
    /// are measurable, otherwise whichever side is.
    #[must_use]
    pub fn bilateral_angle(&self, pose: &PoseView<'_>, kind: JointKind) -> Option<f64> {
        if !kind.is_bilateral() {
            return self.back_angle(pose);
        }
        mean_of_sides(
            self.joint_angle(pose, kind, Side::Left),
            self.joint_angle(pose, kind, Side::Right),
        )
    }

    /// Every measurable joint angle of `frame`.
    #[must_use]
    pub fn all_angles(&self, frame: &Frame) -> JointAngles {
        let pose = frame.view();
        JointKind::ALL
            .into_iter()
            .filter_map(|kind| Some((kind, self.bilateral_angle(&pose, kind)?)))
            .collect()
    }

    /// Every measurable left/right segment distance of `frame`.
    #[must_use]
    pub fn all_distances(&self, frame: &Frame) -> SegmentDistances {
        let pose = frame.view();
        SegmentKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let (left, right) = kind.endpoints();
                Some((kind, point(&pose, left)?.distance_to(point(&pose, right)?)))
            })
            .collect()
    }

    /// Copy of `frame` with missing angles and distances filled in.
    ///
    /// Values the frame already carries are kept as they are.
    #[must_use]
    pub fn enrich(&self, frame: &Frame) -> Frame {
        let mut enriched = frame.clone();
        for (kind, value) in self.all_angles(frame).iter() {
            if !enriched.angles.contains(kind) {
                enriched.angles.insert(kind, value);
            }
        }
        for (kind, value) in self.all_distances(frame).iter() {
            if !enriched.distances.contains(kind) {
                enriched.distances.insert(kind, value);
            }
        }
        enriched
    }
}

fn point(pose: &PoseView<'_>, name: KeypointName) -> Option<Point2> {
    Point2::from_keypoint(pose.get(name)?)
}

fn three_point(
    pose: &PoseView<'_>,
    a: KeypointName,
    vertex: KeypointName,
    b: KeypointName,
) -> Option<f64> {
    point(pose, vertex)?.angle_between(point(pose, a)?, point(pose, b)?)
}
