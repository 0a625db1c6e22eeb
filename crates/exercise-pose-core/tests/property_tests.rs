//! Property-based tests for validation and geometry invariants

use exercise_pose_core::{
    angle_at_vertex, distance, Frame, GeometryEngine, JointKind, Keypoint, KeypointName,
    KeypointValidator, Side,
};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

fn keypoint(name: &'static str) -> impl Strategy<Value = Keypoint> {
    (coord(), coord(), coord()).prop_map(move |(x, y, c)| Keypoint::new(name, x, y, c))
}

fn body() -> impl Strategy<Value = Vec<Keypoint>> {
    KeypointName::all()
        .iter()
        .map(|name| keypoint(name.name()))
        .collect::<Vec<_>>()
}

proptest! {
    #[test]
    fn prop_valid_keypoint_is_in_unit_range(
        x in -0.5f64..1.5,
        y in -0.5f64..1.5,
        confidence in -0.5f64..1.5
    ) {
        let kp = Keypoint::new("nose", x, y, confidence);
        let report = KeypointValidator::default().validate_keypoint(&kp);
        if report.is_valid() {
            prop_assert!((0.0..=1.0).contains(&x));
            prop_assert!((0.0..=1.0).contains(&y));
            prop_assert!((0.0..=1.0).contains(&confidence));
        } else {
            prop_assert!(!report.errors().is_empty());
        }
    }

    #[test]
    fn prop_angle_in_range(
        p1 in keypoint("a"),
        vertex in keypoint("v"),
        p2 in keypoint("b")
    ) {
        if let Some(angle) = angle_at_vertex(&p1, &vertex, &p2) {
            prop_assert!((0.0..=180.0).contains(&angle), "angle {}", angle);
        }
    }

    #[test]
    fn prop_angle_symmetric(
        p1 in keypoint("a"),
        vertex in keypoint("v"),
        p2 in keypoint("b")
    ) {
        let forward = angle_at_vertex(&p1, &vertex, &p2);
        let backward = angle_at_vertex(&p2, &vertex, &p1);
        match (forward, backward) {
            (Some(f), Some(b)) => prop_assert!((f - b).abs() < 1e-9),
            (None, None) => {}
            other => prop_assert!(false, "asymmetric definedness: {:?}", other),
        }
    }

    #[test]
    fn prop_degenerate_ray_is_undefined(p1 in keypoint("a"), vertex in keypoint("v")) {
        prop_assert_eq!(angle_at_vertex(&p1, &vertex, &vertex), None);
    }

    #[test]
    fn prop_distance_symmetric(a in keypoint("a"), b in keypoint("b")) {
        prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        prop_assert_eq!(distance(&a, &a), Some(0.0));
    }

    #[test]
    fn prop_missing_landmark_yields_none(
        keypoints in body(),
        missing in prop::sample::select(vec![
            KeypointName::LeftHip,
            KeypointName::LeftKnee,
            KeypointName::LeftAnkle,
        ])
    ) {
        let kept: Vec<Keypoint> = keypoints
            .into_iter()
            .filter(|k| k.landmark() != Some(missing))
            .collect();
        let frame = Frame::new(0, 0.0, kept);
        prop_assert_eq!(
            GeometryEngine::default().knee_angle(&frame.view(), Side::Left),
            None
        );
    }

    #[test]
    fn prop_measurements_idempotent(keypoints in body()) {
        let engine = GeometryEngine::default();
        let frame = Frame::new(0, 0.0, keypoints);
        prop_assert_eq!(engine.all_angles(&frame), engine.all_angles(&frame));
        prop_assert_eq!(engine.all_distances(&frame), engine.all_distances(&frame));

        let enriched = engine.enrich(&frame);
        prop_assert_eq!(engine.enrich(&enriched), enriched);
    }

    #[test]
    fn prop_computed_angles_stay_in_domain(keypoints in body()) {
        let engine = GeometryEngine::default();
        let angles = engine.all_angles(&Frame::new(0, 0.0, keypoints));
        for (kind, value) in angles.iter() {
            let (min, max) = if kind == JointKind::Back { (-90.0, 90.0) } else { (0.0, 180.0) };
            prop_assert!((min..=max).contains(&value), "{} = {}", kind, value);
        }
    }

    #[test]
    fn prop_knee_angle_decreases_with_forward_knee(dx in 0.01f64..0.4, step in 0.01f64..0.1) {
        let engine = GeometryEngine::default();
        let knee = |offset: f64| {
            let frame = Frame::new(0, 0.0, vec![
                Keypoint::new("left_hip", 0.5, 0.5, 0.9),
                Keypoint::new("left_knee", 0.5 + offset, 0.7, 0.9),
                Keypoint::new("left_ankle", 0.5, 0.9, 0.9),
            ]);
            engine.knee_angle(&frame.view(), Side::Left)
        };
        let near = knee(dx).unwrap();
        let far = knee(dx + step).unwrap();
        prop_assert!(far < near);
    }
}
