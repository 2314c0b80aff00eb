//! Time scales used by the position providers and the site transform
use hifitime::{Duration, Epoch, Unit};

/// Modified Julian Date of the J2000.0 fundamental epoch
pub const MJD_J2000: f64 = 51544.5;

/// Julian Date of the J2000.0 fundamental epoch
pub const JD_J2000: f64 = 2451545.0;

/// Length of a Julian century, in days
pub const JULIAN_CENTURY_DAYS: f64 = 36525.0;

/// Converts a [Duration] to Julian centuries.
pub fn duration_to_centuries(dt: Duration) -> f64 {
    dt.to_unit(Unit::Day) / JULIAN_CENTURY_DAYS
}

/// Converts Julian centuries to a [Duration].
pub fn centuries_to_duration(t_cy: f64) -> Duration {
    (t_cy * JULIAN_CENTURY_DAYS) * Unit::Day
}

/// One instant, expressed in every scale the crate works with.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Times {
    /// Days since J2000.0, UTC
    pub j2k_utc_d: f64,
    /// Days since J2000.0, UT1
    pub j2k_ut1_d: f64,
    /// Julian centuries since J2000.0, TT
    pub j2k_tt_cy: f64,
}

impl Times {
    /// Builds [Times] from given [Epoch]. Leap seconds and the TT offset are
    /// resolved by hifitime, UT1 is obtained from UTC and `dut1` (UT1-UTC).
    pub fn new(epoch: Epoch, dut1: Duration) -> Self {
        let j2k_utc_d = epoch.to_mjd_utc_days() - MJD_J2000;
        let j2k_ut1_d = j2k_utc_d + dut1.to_unit(Unit::Day);
        let j2k_tt_cy = (epoch.to_jde_tt_days() - JD_J2000) / JULIAN_CENTURY_DAYS;
        Self {
            j2k_utc_d,
            j2k_ut1_d,
            j2k_tt_cy,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{centuries_to_duration, duration_to_centuries, Times, JULIAN_CENTURY_DAYS};
    use hifitime::{Duration, Epoch, Unit};
    use std::str::FromStr;

    #[test]
    fn century_conversions() {
        let dt = 720.0 * Unit::Minute;
        let t_cy = duration_to_centuries(dt);
        assert!((t_cy - 0.5 / JULIAN_CENTURY_DAYS).abs() < 1.0E-15);

        let back = centuries_to_duration(t_cy);
        assert!((back - dt).abs() < 1.0 * Unit::Microsecond);
    }

    #[test]
    fn j2000_tt() {
        let epoch = Epoch::from_str("2000-01-01T12:00:00 TT").unwrap();
        let times = Times::new(epoch, Duration::ZERO);
        assert!(
            (times.j2k_tt_cy * JULIAN_CENTURY_DAYS * 86400.0).abs() < 1.0E-3,
            "j2k_tt_cy should be null at J2000.0 TT: {}",
            times.j2k_tt_cy
        );
    }

    #[test]
    fn j2000_utc() {
        let epoch = Epoch::from_str("2000-01-01T12:00:00 UTC").unwrap();
        let times = Times::new(epoch, -0.2 * Unit::Second);

        assert!(times.j2k_utc_d.abs() < 1.0E-9, "utc: {}", times.j2k_utc_d);

        let ut1_s = times.j2k_ut1_d * 86400.0;
        assert!((ut1_s + 0.2).abs() < 1.0E-4, "ut1: {}", ut1_s);

        // 32 leap seconds + 32.184s TAI/TT offset
        let tt_s = times.j2k_tt_cy * JULIAN_CENTURY_DAYS * 86400.0;
        assert!((tt_s - 64.184).abs() < 1.0E-3, "tt-utc: {}", tt_s);
    }
}
