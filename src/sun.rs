//! Low precision apparent Sun position
use map_3d::deg2rad;
use nalgebra::Vector3;

use crate::{
    sky::normalize,
    snapshot::{PositionProvider, Snapshot},
    time::JULIAN_CENTURY_DAYS,
};

/// Apparent Sun position from the Astronomical Almanac low precision
/// formulas (~0.01° between 1950 and 2050), corrected for the main
/// nutation terms. Cheap enough for tests and demos,
/// a precise ephemeris should be preferred for actual pointing.
#[derive(Debug, Default, Copy, Clone)]
pub struct LowPrecisionSun;

/// Main nutation terms: (nutation in longitude, nutation in obliquity), radian
fn nutation(t_cy: f64) -> (f64, f64) {
    let omega = deg2rad(125.04452 - 1934.136261 * t_cy);
    let l_sun = deg2rad(280.4665 + 36000.7698 * t_cy);
    let l_moon = deg2rad(218.3165 + 481267.8813 * t_cy);

    let dpsi_arcsec = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin()
        - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps_arcsec = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos()
        + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();

    (
        deg2rad(dpsi_arcsec / 3600.0),
        deg2rad(deps_arcsec / 3600.0),
    )
}

impl PositionProvider for LowPrecisionSun {
    fn evaluate(&self, t_cy: f64) -> Snapshot {
        let n = t_cy * JULIAN_CENTURY_DAYS;

        let mean_longitude = normalize(280.460 + 0.9856474 * n, 360.0);
        let g = deg2rad(normalize(357.528 + 0.9856003 * n, 360.0));
        let mean_obliquity = deg2rad(23.439 - 0.0000004 * n);

        let (dpsi, deps) = nutation(t_cy);

        let lambda =
            deg2rad(mean_longitude + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()) + dpsi;
        let epsilon = mean_obliquity + deps;
        let distance_au = 1.00014 - 0.01671 * g.cos() - 0.00014 * (2.0 * g).cos();

        let (sin_l, cos_l) = lambda.sin_cos();
        let (sin_e, cos_e) = epsilon.sin_cos();

        Snapshot {
            timestamp_cy: t_cy,
            direction: Vector3::new(cos_l, cos_e * sin_l, sin_e * sin_l),
            distance_au,
            eq_eq_rad: dpsi * cos_e,
        }
    }
}

#[cfg(test)]
mod test {
    use super::LowPrecisionSun;
    use crate::{
        sky::rect_to_polar,
        snapshot::{Frame, PositionProvider},
    };
    use map_3d::{deg2rad, rad2deg};

    #[test]
    fn j2000() {
        let sun = LowPrecisionSun.evaluate(0.0);
        assert_eq!(sun.timestamp_cy, 0.0);
        assert!((sun.direction.norm() - 1.0).abs() < 1.0E-12);

        let (ra, dec) = rect_to_polar(&sun.direction);
        let ra = rad2deg(ra).rem_euclid(360.0);
        let dec = rad2deg(dec);
        assert!((ra - 281.29).abs() < 0.05, "right ascension {}", ra);
        assert!((dec + 23.03).abs() < 0.05, "declination {}", dec);
        assert!((sun.distance_au - 0.98333).abs() < 1.0E-3, "{}", sun.distance_au);
        assert_eq!(LowPrecisionSun.frame(), Frame::Apparent);
    }

    #[test]
    fn seasons() {
        // june solstice 2021-06-21 03:32 UTC and december solstice 2021-12-21 15:59 UTC
        for (j2k_d, expected_dec) in [(7841.648, 23.44), (8025.166, -23.44)] {
            let sun = LowPrecisionSun.evaluate(j2k_d / 36525.0);
            let (_, dec) = rect_to_polar(&sun.direction);
            assert!(
                (rad2deg(dec) - expected_dec).abs() < 0.02,
                "declination {}",
                rad2deg(dec)
            );
        }
    }

    #[test]
    fn equation_of_the_equinoxes() {
        for k in 0..100 {
            let sun = LowPrecisionSun.evaluate(k as f64 / 1000.0);
            assert!(sun.eq_eq_rad.abs() < deg2rad(20.0 / 3600.0));
            assert!(sun.distance_au > 0.983 && sun.distance_au < 1.017);
        }
    }
}
