//! Earth rotation: from celestial (apparent or intermediate) coordinates to
//! the Terrestrial Intermediate Reference System (TIRS).
use map_3d::deg2rad;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::TAU;

use crate::time::JULIAN_CENTURY_DAYS;

/// Rotation axis of [rotation_matrix]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Reduces `x` to [0, range)
pub(crate) fn normalize(x: f64, range: f64) -> f64 {
    x - (x / range).floor() * range
}

/// Matrix rotating the coordinate axes (not the vector) by `angle_rad`
/// around given [Axis].
pub fn rotation_matrix(axis: Axis, angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    match axis {
        Axis::X => Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c),
        Axis::Y => Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c),
        Axis::Z => Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0),
    }
}

/// Unit vector from (longitude like, latitude like) angles
pub fn polar_to_rect(alpha_rad: f64, delta_rad: f64) -> Vector3<f64> {
    let (sin_a, cos_a) = alpha_rad.sin_cos();
    let (sin_d, cos_d) = delta_rad.sin_cos();
    Vector3::new(cos_d * cos_a, cos_d * sin_a, sin_d)
}

/// (alpha, delta) angles of given vector, which need not be of unit length.
/// alpha lies in (-pi, pi]
pub fn rect_to_polar(v: &Vector3<f64>) -> (f64, f64) {
    let w = (v[0] * v[0] + v[1] * v[1]).sqrt();
    (v[1].atan2(v[0]), v[2].atan2(w))
}

/// Greenwich Mean Sidereal Time (radian) at `j2k_ut1_d` days since J2000.0 (UT1),
/// as expressed in the NREL Solar Position Algorithm.
pub fn gmst(j2k_ut1_d: f64) -> f64 {
    let t = j2k_ut1_d / JULIAN_CENTURY_DAYS;
    let theta_deg = 280.46061837 + 360.98564736629 * j2k_ut1_d + 0.000387933 * t * t
        - t * t * t / 38710000.0;
    normalize(deg2rad(theta_deg), TAU)
}

/// Earth Rotation Angle (radian), IAU 2000, at `j2k_ut1_d` days since J2000.0 (UT1)
pub fn era(j2k_ut1_d: f64) -> f64 {
    // fractional day kept apart to preserve precision
    let f = normalize(j2k_ut1_d, 1.0);
    let turns = f + 0.7790572732640 + 0.00273781191135448 * j2k_ut1_d;
    normalize(TAU * turns, TAU)
}

/// Rotates an apparent direction (true equator & equinox) to TIRS,
/// using Greenwich Apparent Sidereal Time = GMST + equation of the equinoxes.
pub fn app_to_tirs(app: &Vector3<f64>, j2k_ut1_d: f64, eq_eq_rad: f64) -> Vector3<f64> {
    let gast = gmst(j2k_ut1_d) + eq_eq_rad;
    rotation_matrix(Axis::Z, gast) * app
}

/// Rotates an intermediate (CIRS) direction to TIRS, using the Earth Rotation Angle.
pub fn cirs_to_tirs(cirs: &Vector3<f64>, j2k_ut1_d: f64) -> Vector3<f64> {
    rotation_matrix(Axis::Z, era(j2k_ut1_d)) * cirs
}
