//! Common numeric helpers shared by geometry and aggregation.

/// Rounds `value` to `decimals` decimal places (half away from zero).
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

/// Arithmetic mean of the values, or `None` when there are none.
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean of two optional values: both present gives their mean, one present
/// gives that value, neither gives `None`.
#[must_use]
pub fn mean_of_sides(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Clamps a cosine into `[-1, 1]` so floating-point overshoot cannot make
/// `acos` return NaN.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Converts radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert!((round_to(92.456, 2) - 92.46).abs() < 1e-10);
        assert!((round_to(-12.344, 2) + 12.34).abs() < 1e-10);
        assert!((round_to(7.5, 0) - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert!((mean([1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_of_sides() {
        assert_eq!(mean_of_sides(Some(90.0), Some(100.0)), Some(95.0));
        assert_eq!(mean_of_sides(None, Some(100.0)), Some(100.0));
        assert_eq!(mean_of_sides(Some(90.0), None), Some(90.0));
        assert_eq!(mean_of_sides(None, None), None);
    }

    #[test]
    fn test_clamp_unit() {
        assert!((clamp_unit(1.000_000_000_2) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_unit(-1.5) + 1.0).abs() < f64::EPSILON);
        assert!((clamp_unit(0.25) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rad_to_deg() {
        assert!((rad_to_deg(std::f64::consts::PI) - 180.0).abs() < 1e-10);
        assert!((rad_to_deg(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-10);
    }
}
