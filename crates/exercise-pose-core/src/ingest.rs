//! Decoding of untyped collaborator input.
//!
//! Pose data arrives as JSON from the session layer. Decoding it with a
//! strict `serde` derive would stop at the first missing field; these
//! decoders instead walk the document, record every structural problem
//! (missing field, wrong type, unknown measurement key) and keep whatever can
//! still be used. Domain checks (ranges, confidence) are left to
//! [`crate::validator`] and [`crate::aggregator`].
//!
//! Both `snake_case` and the collaborator's `camelCase` field names are
//! accepted (`timestamp_secs` / `timestampSeconds`, `total_frames` /
//! `totalFrames`).

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CoreResult, IssueKind, ValidationReport};
use crate::types::{Frame, JointAngles, JointKind, Keypoint, PoseSeries, SegmentDistances, SegmentKind};

const TIMESTAMP_KEYS: &[&str] = &["timestamp_secs", "timestampSeconds", "timestamp"];
const TOTAL_FRAMES_KEYS: &[&str] = &["total_frames", "totalFrames"];

/// A decoded value together with the structural issues met on the way.
///
/// `value` is `None` when the input was too broken to build anything.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    /// What could be decoded
    pub value: Option<T>,
    /// Structural issues found
    pub report: ValidationReport,
}

impl<T> Decoded<T> {
    fn new(value: Option<T>, report: ValidationReport) -> Self {
        Self { value, report }
    }
}

/// Parses a JSON document holding a pose series.
///
/// # Errors
///
/// Returns [`crate::CoreError::Parse`] if `json` is not JSON at all.
/// Structural problems inside a well-formed document are reported in the
/// returned [`Decoded::report`] instead.
pub fn series_from_json_str(json: &str) -> CoreResult<Decoded<PoseSeries>> {
    let document: Value = serde_json::from_str(json)?;
    Ok(decode_series(&document))
}

/// Decodes a single keypoint.
///
/// Any structural problem makes the keypoint unusable.
#[must_use]
pub fn decode_keypoint(value: &Value) -> Decoded<Keypoint> {
    let mut report = ValidationReport::new();
    let Some(obj) = expect_object(value, "keypoint", &mut report) else {
        return Decoded::new(None, report);
    };

    let name = match obj.get("name") {
        None | Some(Value::Null) => {
            report.error("", IssueKind::structural("name", "is missing"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            report.error("", IssueKind::structural("name", "must be a string"));
            None
        }
    };
    let x = required_number(obj, &["x"], &mut report);
    let y = required_number(obj, &["y"], &mut report);
    let confidence = required_number(obj, &["confidence"], &mut report);

    let z = match obj.get("z") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let z = v.as_f64();
            if z.is_none() {
                report.error("", IssueKind::structural("z", "must be a number when present"));
            }
            z
        }
    };

    let keypoint = match (name, x, y, confidence) {
        (Some(name), Some(x), Some(y), Some(confidence)) if report.is_valid() => Some(Keypoint {
            name,
            x,
            y,
            z,
            confidence,
        }),
        _ => None,
    };
    Decoded::new(keypoint, report)
}

/// Decodes a single frame.
///
/// The frame is kept as long as its index, timestamp and keypoint array are
/// usable; keypoints that fail to decode are reported and left out.
#[must_use]
pub fn decode_frame(value: &Value) -> Decoded<Frame> {
    let mut report = ValidationReport::new();
    let Some(obj) = expect_object(value, "frame", &mut report) else {
        return Decoded::new(None, report);
    };

    let index = match obj.get("index") {
        None | Some(Value::Null) => {
            report.error("", IssueKind::structural("index", "is missing"));
            None
        }
        Some(v) => {
            let index = v.as_u64();
            if index.is_none() {
                report.error("", IssueKind::structural("index", "must be a non-negative integer"));
            }
            index
        }
    };
    let timestamp = required_number(obj, TIMESTAMP_KEYS, &mut report);

    let keypoints = match obj.get("keypoints") {
        Some(Value::Array(items)) => {
            let mut keypoints = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let decoded = decode_keypoint(item);
                report.merge(&format!("keypoints[{i}]"), decoded.report);
                keypoints.extend(decoded.value);
            }
            Some(keypoints)
        }
        None | Some(Value::Null) => {
            report.error("", IssueKind::structural("keypoints", "is missing"));
            None
        }
        Some(_) => {
            report.error("", IssueKind::structural("keypoints", "must be an array"));
            None
        }
    };

    let angles: JointAngles = decode_measurements(obj, "angles", JointKind::from_key, &mut report)
        .into_iter()
        .collect();
    let distances: SegmentDistances =
        decode_measurements(obj, "distances", SegmentKind::from_key, &mut report)
            .into_iter()
            .collect();

    let frame = match (index, timestamp, keypoints) {
        (Some(index), Some(timestamp_secs), Some(keypoints)) => Some(Frame {
            index,
            timestamp_secs,
            keypoints,
            angles,
            distances,
        }),
        _ => None,
    };
    Decoded::new(frame, report)
}

/// Decodes a full series.
///
/// Frames that cannot be decoded are reported under `frames[i]` and skipped;
/// the remaining frames are kept in arrival order.
#[must_use]
pub fn decode_series(value: &Value) -> Decoded<PoseSeries> {
    let mut report = ValidationReport::new();
    let Some(obj) = expect_object(value, "series", &mut report) else {
        return Decoded::new(None, report);
    };

    let fps = required_number(obj, &["fps"], &mut report);

    let total_frames = match lookup(obj, TOTAL_FRAMES_KEYS) {
        None | Some(Value::Null) => None,
        Some(v) => {
            let total = v.as_u64().and_then(|n| usize::try_from(n).ok());
            if total.is_none() {
                report.error(
                    "",
                    IssueKind::structural("total_frames", "must be a non-negative integer"),
                );
            }
            total
        }
    };

    let frames = match obj.get("frames") {
        Some(Value::Array(items)) => {
            let mut frames = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let decoded = decode_frame(item);
                report.merge(&format!("frames[{i}]"), decoded.report);
                frames.extend(decoded.value);
            }
            Some(frames)
        }
        None | Some(Value::Null) => {
            report.error("", IssueKind::structural("frames", "is missing"));
            None
        }
        Some(_) => {
            report.error("", IssueKind::structural("frames", "must be an array"));
            None
        }
    };

    let series = match (frames, fps) {
        (Some(frames), Some(fps)) => Some(PoseSeries {
            frames,
            fps,
            total_frames,
        }),
        _ => None,
    };
    debug!(
        decoded = series.as_ref().map_or(0, PoseSeries::len),
        errors = report.errors().len(),
        "Series decoded"
    );
    Decoded::new(series, report)
}

fn expect_object<'a>(
    value: &'a Value,
    what: &str,
    report: &mut ValidationReport,
) -> Option<&'a Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        report.error("", IssueKind::structural(what, "must be an object"));
    }
    obj
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key))
}

fn required_number(
    obj: &Map<String, Value>,
    keys: &[&str],
    report: &mut ValidationReport,
) -> Option<f64> {
    let field = keys[0];
    match lookup(obj, keys) {
        None | Some(Value::Null) => {
            report.error("", IssueKind::structural(field, "is missing"));
            None
        }
        Some(v) => {
            let number = v.as_f64();
            if number.is_none() {
                report.error("", IssueKind::structural(field, "must be a number"));
            }
            number
        }
    }
}

/// Decodes an optional sparse measurement map. Null values count as absent.
fn decode_measurements<K>(
    obj: &Map<String, Value>,
    field: &str,
    parse_key: fn(&str) -> Option<K>,
    report: &mut ValidationReport,
) -> Vec<(K, f64)> {
    let mut decoded = Vec::new();
    match obj.get(field) {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                let path = format!("{field}.{key}");
                let Some(kind) = parse_key(key) else {
                    report.error("", IssueKind::structural(path, "is not a known measurement"));
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                match value.as_f64() {
                    Some(v) => decoded.push((kind, v)),
                    None => report.error("", IssueKind::structural(path, "must be a number")),
                }
            }
        }
        Some(_) => report.error("", IssueKind::structural(field, "must be an object")),
    }
    decoded
}
