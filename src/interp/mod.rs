pub mod cache;
mod slots;

pub use cache::InterpolationCache;

use crate::snapshot::Snapshot;
use nalgebra::Vector3;
use thiserror::Error;

/// Interpolation endpoints closer than this (centuries) are considered identical
pub(crate) const DEGENERATE_SPAN_CY: f64 = 1.0E-10;

/// Tracking contract violations and configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("query time {t_cy} exceeds interpolation window ending {next_cy}: background refresh underrun")]
    RefreshUnderrun { t_cy: f64, next_cy: f64 },
    #[error("query time {t_cy} precedes interpolation window starting {last_cy}: time went backwards")]
    BeforeWindow { t_cy: f64, last_cy: f64 },
    #[error("query time {t_cy} is more than one interval past {next_cy}")]
    BeyondWindow { t_cy: f64, next_cy: f64 },
    #[error("recalculation interval must be strictly positive")]
    InvalidInterval,
    #[error("background refresh period must be strictly positive")]
    InvalidRefreshPeriod,
    #[error("unknown refraction model \"{0}\"")]
    UnknownRefractionModel(String),
}

/// Linear blending between two samples, weights (1-a, a).
pub(crate) trait Lerp {
    fn lerp(&self, rhs: &Self, a: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, rhs: &Self, a: f64) -> Self {
        a * rhs + (1.0 - a) * self
    }
}

impl Lerp for Vector3<f64> {
    fn lerp(&self, rhs: &Self, a: f64) -> Self {
        Vector3::new(
            self[0].lerp(&rhs[0], a),
            self[1].lerp(&rhs[1], a),
            self[2].lerp(&rhs[2], a),
        )
    }
}

/// Interpolates between `last` and `next` at `t_cy`, which is expected
/// to lie within [last, next]. The direction is not renormalized.
/// A degenerate window returns `last`.
pub(crate) fn interpolate(last: &Snapshot, next: &Snapshot, t_cy: f64) -> Snapshot {
    let span = next.timestamp_cy - last.timestamp_cy;
    let a = if span < DEGENERATE_SPAN_CY {
        0.0
    } else {
        (t_cy - last.timestamp_cy) / span
    };
    Snapshot {
        timestamp_cy: t_cy,
        direction: last.direction.lerp(&next.direction, a),
        distance_au: last.distance_au.lerp(&next.distance_au, a),
        eq_eq_rad: last.eq_eq_rad.lerp(&next.eq_eq_rad, a),
    }
}
