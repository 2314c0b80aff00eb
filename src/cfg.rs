use hifitime::{Duration, Unit};
use log::warn;

use crate::interp::Error;

#[cfg(feature = "serde")]
use serde::Deserialize;

fn default_recalc_interval() -> Duration {
    720.0 * Unit::Minute
}

fn default_refresh_period() -> Duration {
    1.0 * Unit::Minute
}

fn default_dut1() -> Duration {
    Duration::ZERO
}

/// Tracking configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Time between two full (expensive) position calculations.
    /// Interpolation errors grow with it: 12h keeps the Sun
    /// within 0.1" of the fully calculated position.
    #[cfg_attr(feature = "serde", serde(default = "default_recalc_interval"))]
    pub recalc_interval: Duration,
    /// Cadence of the background refresh worker.
    /// Should be much shorter than the recalculation interval.
    #[cfg_attr(feature = "serde", serde(default = "default_refresh_period"))]
    pub refresh_period: Duration,
    /// UT1-UTC
    #[cfg_attr(feature = "serde", serde(default = "default_dut1"))]
    pub dut1: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recalc_interval: default_recalc_interval(),
            refresh_period: default_refresh_period(),
            dut1: default_dut1(),
        }
    }
}

impl Config {
    /// Returns [Config] with desired recalculation interval
    pub fn with_recalc_interval(&self, interval: Duration) -> Self {
        let mut s = *self;
        s.recalc_interval = interval;
        s
    }
    /// Returns [Config] with desired background refresh period
    pub fn with_refresh_period(&self, period: Duration) -> Self {
        let mut s = *self;
        s.refresh_period = period;
        s
    }
    /// Returns [Config] with desired UT1-UTC
    pub fn with_dut1(&self, dut1: Duration) -> Self {
        let mut s = *self;
        s.dut1 = dut1;
        s
    }
    /// Verifies this [Config] may be used for tracking
    pub fn validate(&self) -> Result<(), Error> {
        if self.recalc_interval <= Duration::ZERO {
            return Err(Error::InvalidInterval);
        }
        if self.refresh_period <= Duration::ZERO {
            return Err(Error::InvalidRefreshPeriod);
        }
        if self.refresh_period > self.recalc_interval {
            warn!(
                "refresh period {} exceeds recalculation interval {}: expect refresh underruns",
                self.refresh_period, self.recalc_interval
            );
        }
        Ok(())
    }
}
