//! Apparent position interpolation cache
use hifitime::Duration;
use log::{debug, error};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    interp::{interpolate, slots::Slots, Error},
    snapshot::{Frame, PositionProvider, Snapshot},
    time::duration_to_centuries,
};

/// [InterpolationCache] runs the expensive [PositionProvider] only once per
/// recalculation interval and answers high rate position queries by linear
/// interpolation between two previously computed samples ("last" and "next").
/// A third sample ("one after") is computed ahead of time by
/// [InterpolationCache::background_refresh], so the query path never waits
/// on the provider.
///
/// The cache is shared between one high rate caller ([InterpolationCache::query])
/// and one low priority caller ([InterpolationCache::background_refresh]),
/// typically through an [std::sync::Arc]. Both only hold the internal lock
/// for a handful of word sized updates.
#[derive(Debug)]
pub struct InterpolationCache<P: PositionProvider> {
    /// Full position calculator
    provider: P,
    /// Time between full recalculations (centuries)
    interval_cy: f64,
    /// Interpolation endpoints + readiness flag
    slots: Mutex<Slots>,
}

impl<P: PositionProvider> InterpolationCache<P> {
    /// Builds a new [InterpolationCache], computing three samples at
    /// `t0_cy`, `t0_cy + interval` and `t0_cy + 2 * interval`.
    /// Queries within [t0_cy, t0_cy + 2 * interval] are then
    /// served without any background refresh.
    /// `t0_cy`: Julian centuries since J2000.0 (TT) of the first query.
    /// Panics if `interval` is not strictly positive.
    pub fn new(t0_cy: f64, interval: Duration, provider: P) -> Self {
        Self::with_interval_cy(t0_cy, duration_to_centuries(interval), provider)
    }
    /// Same as [InterpolationCache::new], with the interval expressed in centuries.
    pub fn with_interval_cy(t0_cy: f64, interval_cy: f64, provider: P) -> Self {
        assert!(
            interval_cy > 0.0,
            "recalculation interval must be strictly positive ({})",
            interval_cy
        );

        let mut t_cy = t0_cy;
        let last = Self::sample(&provider, t_cy);
        t_cy += interval_cy;
        let next = Self::sample(&provider, t_cy);
        t_cy += interval_cy;
        let one_after = Self::sample(&provider, t_cy);

        debug!(
            "interpolation cache: window [{}, {}], look-ahead {}",
            last.timestamp_cy, next.timestamp_cy, one_after.timestamp_cy
        );

        Self {
            provider,
            interval_cy,
            slots: Mutex::new(Slots::new(last, next, one_after)),
        }
    }
    /// Runs the provider and stamps the result with the requested instant
    fn sample(provider: &P, t_cy: f64) -> Snapshot {
        let mut snapshot = provider.evaluate(t_cy);
        snapshot.timestamp_cy = t_cy;
        snapshot
    }
    fn lock(&self) -> MutexGuard<'_, Slots> {
        // critical sections never panic: a poisoned lock still holds consistent slots
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
    /// Time between two full recalculations (centuries)
    pub fn interval_cy(&self) -> f64 {
        self.interval_cy
    }
    /// [Frame] of the interpolated directions
    pub fn frame(&self) -> Frame {
        self.provider.frame()
    }
    /// True when the look-ahead sample is valid, which means the next
    /// window crossing may proceed.
    pub fn is_ready(&self) -> bool {
        self.lock().ready()
    }
    /// Current interpolation window (last, next), in centuries
    pub fn window(&self) -> (f64, f64) {
        let slots = self.lock();
        (slots.last().timestamp_cy, slots.next().timestamp_cy)
    }
    /// Interpolates the body position at `t_cy` (Julian centuries since
    /// J2000.0, TT). Successive query times are expected to be non decreasing.
    /// Crossing the end of the current window rotates the samples and
    /// requires a background refresh before the following crossing.
    pub fn try_query(&self, t_cy: f64) -> Result<Snapshot, Error> {
        let (last, next) = {
            let mut slots = self.lock();
            if t_cy > slots.next().timestamp_cy {
                if !slots.ready() {
                    return Err(Error::RefreshUnderrun {
                        t_cy,
                        next_cy: slots.next().timestamp_cy,
                    });
                }
                slots.rotate();
                debug!(
                    "interpolation window rotated: [{}, {}]",
                    slots.last().timestamp_cy,
                    slots.next().timestamp_cy
                );
            }
            (*slots.last(), *slots.next())
        };

        if t_cy.is_nan() || t_cy < last.timestamp_cy {
            return Err(Error::BeforeWindow {
                t_cy,
                last_cy: last.timestamp_cy,
            });
        }
        if t_cy > next.timestamp_cy {
            return Err(Error::BeyondWindow {
                t_cy,
                next_cy: next.timestamp_cy,
            });
        }

        Ok(interpolate(&last, &next, t_cy))
    }
    /// Same as [InterpolationCache::try_query], but any contract violation is
    /// fatal: a wrong position is worse than no position at all.
    pub fn query(&self, t_cy: f64) -> Snapshot {
        match self.try_query(t_cy) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("position tracking aborted: {}", e);
                panic!("{}", e);
            },
        }
    }
    /// Computes the look-ahead sample if it has been consumed.
    /// Returns true if the provider actually ran. The provider is never
    /// invoked while holding the lock. Designed to be called from a low
    /// priority context, at least once per recalculation interval.
    pub fn background_refresh(&self) -> bool {
        let next_cy = {
            let slots = self.lock();
            if slots.ready() {
                return false;
            }
            slots.next().timestamp_cy
        };

        let t_cy = next_cy + self.interval_cy;
        debug!("updating look-ahead sample @{}", t_cy);
        let one_after = Self::sample(&self.provider, t_cy);

        let mut slots = self.lock();
        if slots.ready() || slots.next().timestamp_cy != next_cy {
            // a concurrent refresh published first
            debug!("discarding look-ahead sample @{}", t_cy);
            return false;
        }
        slots.fill(one_after);
        true
    }
}
