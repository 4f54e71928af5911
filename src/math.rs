use std::f64::consts::PI;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec<f64> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        assert_eq!(a.len(), b.len(), "Lerp on vectors of different lengths");
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x + (y - x) * t)
            .collect()
    }
}

/// Rounds to the 2 decimal digits used by the save format. Interpolation
/// itself is full-precision; only persistence is rounded.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Converts an `atan2`-convention angle (-PI..PI, y axis pointing down)
/// into "intuitive" degrees: 0..360, counter-clockwise from east.
pub fn atan2_to_intuitive_degrees(radians: f64) -> f64 {
    let degrees = radians.to_degrees();
    if degrees <= 0.0 { -degrees } else { 360.0 - degrees }
}

/// The inverse of [`atan2_to_intuitive_degrees`].
pub fn intuitive_degrees_to_atan2(degrees: f64) -> f64 {
    let d = if degrees <= 0.0 { -degrees } else { 360.0 - degrees };
    d.to_radians()
}

/// Maps an `atan2` angle to the 0..2*PI range in the intuitive direction.
pub fn atan2_to_intuitive_radians(radians: f64) -> f64 {
    if radians <= 0.0 { -radians } else { 2.0 * PI - radians }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(f64::lerp(&2.0, &8.0, 0.0), 2.0);
        assert_eq!(f64::lerp(&2.0, &8.0, 1.0), 8.0);
        assert_eq!(f64::lerp(&2.0, &8.0, 0.5), 5.0);
    }

    #[test]
    fn vec_lerp_is_pointwise() {
        let a = vec![0.0, 10.0];
        let b = vec![10.0, 30.0];
        assert_eq!(<Vec<f64> as Lerp>::lerp(&a, &b, 0.5), vec![5.0, 20.0]);
    }

    #[test]
    #[should_panic]
    fn vec_lerp_rejects_length_mismatch() {
        let _ = <Vec<f64> as Lerp>::lerp(&vec![1.0], &vec![1.0, 2.0], 0.5);
    }

    #[test]
    fn round2_truncates_noise() {
        assert_eq!(round2(1.004999), 1.0);
        assert_eq!(round2(1.005001), 1.01);
    }

    #[test]
    fn degree_conversions_round_trip() {
        for d in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let r = intuitive_degrees_to_atan2(d);
            let back = atan2_to_intuitive_degrees(r);
            assert!((back - d).abs() < 1e-9);
        }
    }

    #[test]
    fn north_is_90_intuitive() {
        // atan2 with a downward-pointing y axis puts "up" at -PI/2.
        assert!((atan2_to_intuitive_degrees(-PI / 2.0) - 90.0).abs() < 1e-9);
    }
}
