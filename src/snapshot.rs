use nalgebra::Vector3;

/// Reference frame of the [Snapshot] direction vectors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Frame {
    /// Apparent coordinates: true equator and equinox of date.
    /// The equation of the equinoxes is required to reach the terrestrial frame.
    #[default]
    Apparent,
    /// Celestial Intermediate coordinates: true equator and
    /// Celestial Intermediate Origin. The equinox correction is unused.
    Intermediate,
}

/// Celestial position sample for one instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Snapshot {
    /// Instant this sample applies to, in Julian centuries since J2000.0 (TT)
    pub timestamp_cy: f64,
    /// Direction of the body (unit vector, see [Frame])
    pub direction: Vector3<f64>,
    /// Geocentric distance (AU). 0.0 means infinitely far (no parallax)
    pub distance_au: f64,
    /// Equation of the equinoxes (radian), [Frame::Apparent] only
    pub eq_eq_rad: f64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            timestamp_cy: 0.0,
            direction: Vector3::zeros(),
            distance_au: 0.0,
            eq_eq_rad: 0.0,
        }
    }
}

impl Snapshot {
    /// Builds a new [Snapshot]
    pub fn new(timestamp_cy: f64, direction: Vector3<f64>, distance_au: f64, eq_eq_rad: f64) -> Self {
        Self {
            timestamp_cy,
            direction,
            distance_au,
            eq_eq_rad,
        }
    }
}

/// Implement this trait to provide fully computed [Snapshot]s to the
/// [crate::prelude::InterpolationCache]. This is the expensive calculation
/// (full ephemeris, nutation...) the cache only runs a few times per day,
/// always from the background refresh context and never while holding the
/// cache lock.
pub trait PositionProvider {
    /// Computes the position of the body at `t_cy` (Julian centuries since
    /// J2000.0, TT). Must be a pure function of time.
    fn evaluate(&self, t_cy: f64) -> Snapshot;
    /// [Frame] of the directions this provider returns.
    fn frame(&self) -> Frame {
        Frame::Apparent
    }
}

impl<F: Fn(f64) -> Snapshot> PositionProvider for F {
    fn evaluate(&self, t_cy: f64) -> Snapshot {
        self(t_cy)
    }
}

#[cfg(test)]
mod test {
    use super::{Frame, PositionProvider, Snapshot};
    use nalgebra::Vector3;

    #[test]
    fn closure_provider() {
        let provider = |t: f64| Snapshot::new(t, Vector3::new(1.0, 0.0, 0.0), 1.0, 0.0);
        let s = provider.evaluate(0.25);
        assert_eq!(s.timestamp_cy, 0.25);
        assert_eq!(s.direction, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(provider.frame(), Frame::Apparent);
    }
}
