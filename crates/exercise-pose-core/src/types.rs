//! Core data types for exercise pose captures.
//!
//! # Type Categories
//!
//! - **Landmarks**: [`KeypointName`], [`Side`], [`Keypoint`]
//! - **Measurements**: [`JointKind`], [`SegmentKind`], [`JointAngles`],
//!   [`SegmentDistances`]
//! - **Captures**: [`Frame`], [`PoseSeries`], and the per-frame lookup
//!   [`PoseView`]
//!
//! All of these are transient value objects. They are built from collaborator
//! input, analyzed, and handed back; nothing here is persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Landmarks
// =============================================================================

/// Body side for symmetric joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Subject's left
    Left,
    /// Subject's right
    Right,
}

impl Side {
    /// Returns the lowercase side prefix used in landmark names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Anatomical landmarks understood by the geometry engine.
///
/// The first 17 follow the COCO keypoint order; the foot landmarks are the
/// extra points emitted by full-body trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum KeypointName {
    /// Nose
    Nose = 0,
    /// Left eye
    LeftEye = 1,
    /// Right eye
    RightEye = 2,
    /// Left ear
    LeftEar = 3,
    /// Right ear
    RightEar = 4,
    /// Left shoulder
    LeftShoulder = 5,
    /// Right shoulder
    RightShoulder = 6,
    /// Left elbow
    LeftElbow = 7,
    /// Right elbow
    RightElbow = 8,
    /// Left wrist
    LeftWrist = 9,
    /// Right wrist
    RightWrist = 10,
    /// Left hip
    LeftHip = 11,
    /// Right hip
    RightHip = 12,
    /// Left knee
    LeftKnee = 13,
    /// Right knee
    RightKnee = 14,
    /// Left ankle
    LeftAnkle = 15,
    /// Right ankle
    RightAnkle = 16,
    /// Left heel
    LeftHeel = 17,
    /// Right heel
    RightHeel = 18,
    /// Left foot index (toe tip)
    LeftFootIndex = 19,
    /// Right foot index (toe tip)
    RightFootIndex = 20,
}

impl KeypointName {
    /// Number of known landmarks.
    pub const COUNT: usize = 21;

    /// Returns all landmarks in index order.
    #[must_use]
    pub fn all() -> &'static [Self; Self::COUNT] {
        &[
            Self::Nose,
            Self::LeftEye,
            Self::RightEye,
            Self::LeftEar,
            Self::RightEar,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
            Self::LeftHeel,
            Self::RightHeel,
            Self::LeftFootIndex,
            Self::RightFootIndex,
        ]
    }

    /// Returns the canonical `snake_case` name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Parses a landmark name as reported by a pose detector.
    ///
    /// Matching is case-insensitive and accepts `snake_case`, `kebab-case`,
    /// space separated and `camelCase` spellings (`leftKnee`, `LEFT_KNEE`,
    /// `left knee`). Returns `None` for landmarks outside the known set.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_name(raw);
        Self::all()
            .iter()
            .copied()
            .find(|candidate| candidate.name() == normalized)
    }

    /// Position of this landmark in [`KeypointName::all`].
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Shoulder landmark on the given side.
    #[must_use]
    pub const fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftShoulder,
            Side::Right => Self::RightShoulder,
        }
    }

    /// Elbow landmark on the given side.
    #[must_use]
    pub const fn elbow(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftElbow,
            Side::Right => Self::RightElbow,
        }
    }

    /// Wrist landmark on the given side.
    #[must_use]
    pub const fn wrist(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftWrist,
            Side::Right => Self::RightWrist,
        }
    }

    /// Hip landmark on the given side.
    #[must_use]
    pub const fn hip(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftHip,
            Side::Right => Self::RightHip,
        }
    }

    /// Knee landmark on the given side.
    #[must_use]
    pub const fn knee(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftKnee,
            Side::Right => Self::RightKnee,
        }
    }

    /// Ankle landmark on the given side.
    #[must_use]
    pub const fn ankle(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftAnkle,
            Side::Right => Self::RightAnkle,
        }
    }
}

impl std::fmt::Display for KeypointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercases and converts separators and camelCase humps to underscores.
fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// A single detected landmark.
///
/// `x` and `y` are normalized image coordinates in `[0, 1]`; `z` is an
/// optional, model-defined depth. The name is kept exactly as reported; use
/// [`Keypoint::landmark`] for the typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark name as reported by the detector
    pub name: String,
    /// Normalized horizontal coordinate
    pub x: f64,
    /// Normalized vertical coordinate (grows downwards)
    pub y: f64,
    /// Depth, if the detector provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence in `[0, 1]`
    pub confidence: f64,
}

impl Keypoint {
    /// Creates a new 2D keypoint.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Creates a new 3D keypoint.
    #[must_use]
    pub fn new_3d(name: impl Into<String>, x: f64, y: f64, z: f64, confidence: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: Some(z),
            confidence,
        }
    }

    /// The typed landmark, if the name is a known one.
    #[must_use]
    pub fn landmark(&self) -> Option<KeypointName> {
        KeypointName::parse(&self.name)
    }

    /// Returns `true` if both planar coordinates are finite numbers.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns `true` if the confidence reaches `threshold`.
    #[must_use]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

// =============================================================================
// Measurements
// =============================================================================

/// Joint angle families measured per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    /// Hip-knee-ankle angle
    Knee,
    /// Shoulder-hip-knee angle
    Hip,
    /// Trunk lean from vertical
    Back,
    /// Shoulder-elbow-wrist angle
    Shoulder,
    /// Knee-ankle-vertical angle
    Ankle,
}

impl JointKind {
    /// Every joint kind.
    pub const ALL: [Self; 5] = [
        Self::Knee,
        Self::Hip,
        Self::Back,
        Self::Shoulder,
        Self::Ankle,
    ];

    /// Canonical `snake_case` key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Knee => "knee",
            Self::Hip => "hip",
            Self::Back => "back",
            Self::Shoulder => "shoulder",
            Self::Ankle => "ankle",
        }
    }

    /// Parses an angle key such as `knee`, `kneeAngle` or `knee_angle`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = normalize_name(key);
        let stem = normalized.strip_suffix("_angle").unwrap_or(&normalized);
        Self::ALL.into_iter().find(|kind| kind.name() == stem)
    }

    /// Returns `true` for joints measured on each side separately.
    #[must_use]
    pub const fn is_bilateral(&self) -> bool {
        !matches!(self, Self::Back)
    }
}

impl std::fmt::Display for JointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Left/right segment widths measured per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Distance between the knees
    KneeWidth,
    /// Distance between the ankles
    FootWidth,
    /// Distance between the shoulders
    ShoulderWidth,
    /// Distance between the hips
    HipWidth,
}

impl SegmentKind {
    /// Every segment kind.
    pub const ALL: [Self; 4] = [
        Self::KneeWidth,
        Self::FootWidth,
        Self::ShoulderWidth,
        Self::HipWidth,
    ];

    /// Canonical `snake_case` key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::KneeWidth => "knee_width",
            Self::FootWidth => "foot_width",
            Self::ShoulderWidth => "shoulder_width",
            Self::HipWidth => "hip_width",
        }
    }

    /// The left/right landmark pair spanning this segment.
    #[must_use]
    pub const fn endpoints(&self) -> (KeypointName, KeypointName) {
        match self {
            Self::KneeWidth => (KeypointName::LeftKnee, KeypointName::RightKnee),
            Self::FootWidth => (KeypointName::LeftAnkle, KeypointName::RightAnkle),
            Self::ShoulderWidth => (KeypointName::LeftShoulder, KeypointName::RightShoulder),
            Self::HipWidth => (KeypointName::LeftHip, KeypointName::RightHip),
        }
    }

    /// Parses a distance key such as `kneeWidth` or `knee_width`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = normalize_name(key);
        Self::ALL.into_iter().find(|kind| kind.name() == normalized)
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sparse map of joint angles in degrees.
///
/// A joint that could not be measured is absent, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointAngles(BTreeMap<JointKind, f64>);

impl JointAngles {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle for `kind`, if measured.
    #[must_use]
    pub fn get(&self, kind: JointKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    /// Sets the angle for `kind`.
    pub fn insert(&mut self, kind: JointKind, degrees: f64) {
        self.0.insert(kind, degrees);
    }

    /// Returns `true` if `kind` is present.
    #[must_use]
    pub fn contains(&self, kind: JointKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Iterates over present angles in [`JointKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = (JointKind, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of measured joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no joint was measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(JointKind, f64)> for JointAngles {
    fn from_iter<I: IntoIterator<Item = (JointKind, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Sparse map of segment distances in normalized units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentDistances(BTreeMap<SegmentKind, f64>);

impl SegmentDistances {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance for `kind`, if measured.
    #[must_use]
    pub fn get(&self, kind: SegmentKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    /// Sets the distance for `kind`.
    pub fn insert(&mut self, kind: SegmentKind, value: f64) {
        self.0.insert(kind, value);
    }

    /// Returns `true` if `kind` is present.
    #[must_use]
    pub fn contains(&self, kind: SegmentKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Iterates over present distances in [`SegmentKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SegmentKind, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of measured segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no segment was measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(SegmentKind, f64)> for SegmentDistances {
    fn from_iter<I: IntoIterator<Item = (SegmentKind, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Captures
// =============================================================================

/// One timestamped snapshot of detected keypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame number within the capture
    pub index: u64,
    /// Capture time in seconds
    #[serde(alias = "timestampSeconds", alias = "timestamp")]
    pub timestamp_secs: f64,
    /// Detected keypoints, in detector order
    pub keypoints: Vec<Keypoint>,
    /// Joint angles already attached to the frame
    #[serde(default, skip_serializing_if = "JointAngles::is_empty")]
    pub angles: JointAngles,
    /// Segment distances already attached to the frame
    #[serde(default, skip_serializing_if = "SegmentDistances::is_empty")]
    pub distances: SegmentDistances,
}

impl Frame {
    /// Creates a frame without precomputed measurements.
    #[must_use]
    pub fn new(index: u64, timestamp_secs: f64, keypoints: Vec<Keypoint>) -> Self {
        Self {
            index,
            timestamp_secs,
            keypoints,
            angles: JointAngles::new(),
            distances: SegmentDistances::new(),
        }
    }

    /// Attaches an angle, returning the frame.
    #[must_use]
    pub fn with_angle(mut self, kind: JointKind, degrees: f64) -> Self {
        self.angles.insert(kind, degrees);
        self
    }

    /// Builds the typed landmark lookup for this frame.
    #[must_use]
    pub fn view(&self) -> PoseView<'_> {
        PoseView::new(self)
    }

    /// Iterates over keypoint confidences.
    pub fn confidences(&self) -> impl Iterator<Item = f64> + '_ {
        self.keypoints.iter().map(|kp| kp.confidence)
    }
}

/// Typed, name-indexed lookup over a frame's keypoints.
///
/// Built once per frame so geometry never searches by string. When the same
/// landmark is reported twice the first occurrence wins; keypoints without a
/// finite position are treated as absent.
#[derive(Debug, Clone)]
pub struct PoseView<'a> {
    slots: [Option<&'a Keypoint>; KeypointName::COUNT],
}

impl<'a> PoseView<'a> {
    /// Indexes the keypoints of `frame`.
    #[must_use]
    pub fn new(frame: &'a Frame) -> Self {
        Self::from_keypoints(&frame.keypoints)
    }

    /// Indexes a bare keypoint slice.
    #[must_use]
    pub fn from_keypoints(keypoints: &'a [Keypoint]) -> Self {
        let mut slots = [None; KeypointName::COUNT];
        for kp in keypoints.iter().filter(|kp| kp.has_position()) {
            if let Some(name) = kp.landmark() {
                let slot = &mut slots[name.index()];
                if slot.is_none() {
                    *slot = Some(kp);
                }
            }
        }
        Self { slots }
    }

    /// Keypoint for `name`, if detected.
    #[must_use]
    pub fn get(&self, name: KeypointName) -> Option<&'a Keypoint> {
        self.slots[name.index()]
    }

    /// Number of distinct known landmarks present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if no known landmark is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A session's full capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSeries {
    /// Captured frames, in arrival order
    pub frames: Vec<Frame>,
    /// Capture rate in frames per second
    pub fps: f64,
    /// Frame count declared by the producer
    #[serde(default, alias = "totalFrames", skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<usize>,
}

impl PoseSeries {
    /// Creates a series whose declared frame count matches `frames`.
    #[must_use]
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        let total_frames = Some(frames.len());
        Self {
            frames,
            fps,
            total_frames,
        }
    }

    /// Number of frames actually present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the series holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_name_parse_spellings() {
        assert_eq!(KeypointName::parse("left_knee"), Some(KeypointName::LeftKnee));
        assert_eq!(KeypointName::parse("LEFT_KNEE"), Some(KeypointName::LeftKnee));
        assert_eq!(KeypointName::parse("leftKnee"), Some(KeypointName::LeftKnee));
        assert_eq!(KeypointName::parse(" left-knee "), Some(KeypointName::LeftKnee));
        assert_eq!(
            KeypointName::parse("rightFootIndex"),
            Some(KeypointName::RightFootIndex)
        );
        assert_eq!(KeypointName::parse("tail"), None);
        assert_eq!(KeypointName::parse(""), None);
    }

    #[test]
    fn test_keypoint_name_index_matches_order() {
        for (i, name) in KeypointName::all().iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }

    #[test]
    fn test_joint_kind_from_key() {
        assert_eq!(JointKind::from_key("kneeAngle"), Some(JointKind::Knee));
        assert_eq!(JointKind::from_key("back_angle"), Some(JointKind::Back));
        assert_eq!(JointKind::from_key("Shoulder"), Some(JointKind::Shoulder));
        assert_eq!(JointKind::from_key("wrist"), None);
        assert_eq!(SegmentKind::from_key("shoulderWidth"), Some(SegmentKind::ShoulderWidth));
    }

    #[test]
    fn test_pose_view_first_occurrence_wins() {
        let frame = Frame::new(
            0,
            0.0,
            vec![
                Keypoint::new("left_knee", 0.1, 0.2, 0.9),
                Keypoint::new("LeftKnee", 0.8, 0.8, 0.9),
                Keypoint::new("mystery", 0.5, 0.5, 0.9),
            ],
        );
        let view = frame.view();
        let knee = view.get(KeypointName::LeftKnee).unwrap();
        assert!((knee.x - 0.1).abs() < f64::EPSILON);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_pose_view_skips_non_finite_positions() {
        let frame = Frame::new(0, 0.0, vec![Keypoint::new("nose", f64::NAN, 0.2, 0.9)]);
        assert!(frame.view().is_empty());
    }

    #[test]
    fn test_frame_serde_accepts_camel_case_timestamp() {
        let json = r#"{
            "index": 3,
            "timestampSeconds": 0.5,
            "keypoints": [{"name": "nose", "x": 0.5, "y": 0.1, "confidence": 0.9}],
            "angles": {"knee": 92.5}
        }"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.index, 3);
        assert!((frame.timestamp_secs - 0.5).abs() < f64::EPSILON);
        assert_eq!(frame.angles.get(JointKind::Knee), Some(92.5));
        assert!(frame.distances.is_empty());
    }

    #[test]
    fn test_pose_series_new_declares_frame_count() {
        let series = PoseSeries::new(vec![Frame::new(0, 0.0, vec![])], 30.0);
        assert_eq!(series.total_frames, Some(1));
        assert_eq!(series.len(), 1);
    }
}
