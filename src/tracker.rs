//! Position tracker
use hifitime::Epoch;
use log::{debug, error, info};
use nalgebra::Vector3;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};

use crate::{
    cfg::Config,
    interp::{Error, InterpolationCache},
    site::{Horizon, Site},
    sky::{app_to_tirs, cirs_to_tirs},
    snapshot::{Frame, PositionProvider, Snapshot},
    time::Times,
};

/// [Tracker] answers high rate position requests for one body, for any number
/// of [Site]s, from an [InterpolationCache] fed by your [PositionProvider].
/// Unless the tracking session is shorter than twice the recalculation
/// interval, the cache must be refreshed, either by calling
/// [Tracker::refresh] from a low priority loop, or by running
/// the [RefreshWorker] returned by [Tracker::spawn_refresh].
#[derive(Debug)]
pub struct Tracker<P: PositionProvider> {
    /// Tracker configuration
    cfg: Config,
    /// Interpolation endpoints, shared with the refresh context
    cache: Arc<InterpolationCache<P>>,
}

impl<P: PositionProvider> Tracker<P> {
    /// Builds a new [Tracker], for a tracking session starting at `t0`.
    /// This runs the [PositionProvider] three times.
    pub fn new(cfg: Config, t0: Epoch, provider: P) -> Result<Self, Error> {
        cfg.validate()?;
        let times = Times::new(t0, cfg.dut1);
        info!(
            "{:?} - tracking session: recalculation every {}",
            t0, cfg.recalc_interval
        );
        let cache = InterpolationCache::new(times.j2k_tt_cy, cfg.recalc_interval, provider);
        Ok(Self {
            cfg,
            cache: Arc::new(cache),
        })
    }
    /// [Config] in use
    pub fn config(&self) -> &Config {
        &self.cfg
    }
    /// Underlying [InterpolationCache]
    pub fn cache(&self) -> &Arc<InterpolationCache<P>> {
        &self.cache
    }
    /// Interpolated (apparent or intermediate) position at `t`
    pub fn geocentric(&self, t: Epoch) -> Result<(Times, Snapshot), Error> {
        let times = Times::new(t, self.cfg.dut1);
        let snapshot = self.cache.try_query(times.j2k_tt_cy)?;
        Ok((times, snapshot))
    }
    /// Direction of the body in the Terrestrial Intermediate Reference
    /// System at `t`, and its geocentric distance (AU).
    pub fn terrestrial(&self, t: Epoch) -> Result<(Vector3<f64>, f64), Error> {
        let (times, snapshot) = self.geocentric(t)?;
        let tirs = match self.cache.frame() {
            Frame::Apparent => {
                app_to_tirs(&snapshot.direction, times.j2k_ut1_d, snapshot.eq_eq_rad)
            },
            Frame::Intermediate => cirs_to_tirs(&snapshot.direction, times.j2k_ut1_d),
        };
        Ok((tirs, snapshot.distance_au))
    }
    /// Topocentric position of the body, seen from `site` at `t`
    pub fn topocentric(&self, t: Epoch, site: &Site) -> Result<Horizon, Error> {
        let (tirs, distance_au) = self.terrestrial(t)?;
        Ok(site.tirs_to_topo(&tirs, distance_au))
    }
    /// Topocentric positions of the body, for each site, at `t`.
    /// The interpolation and earth rotation are only computed once.
    pub fn topocentric_sites(&self, t: Epoch, sites: &[Site]) -> Result<Vec<Horizon>, Error> {
        let (tirs, distance_au) = self.terrestrial(t)?;
        Ok(sites
            .iter()
            .map(|site| site.tirs_to_topo(&tirs, distance_au))
            .collect())
    }
    /// Runs the background refresh on the calling thread.
    /// Returns true if the [PositionProvider] was invoked.
    pub fn refresh(&self) -> bool {
        self.cache.background_refresh()
    }
}

impl<P: PositionProvider + Send + Sync + 'static> Tracker<P> {
    /// Spawns a thread refreshing the cache every [Config::refresh_period],
    /// until the returned [RefreshWorker] is stopped or dropped.
    pub fn spawn_refresh(&self) -> RefreshWorker {
        let cache = Arc::clone(&self.cache);
        let exit = Arc::new(AtomicBool::new(false));
        // validated strictly positive
        let period = std::time::Duration::from_secs_f64(self.cfg.refresh_period.to_seconds());

        let flag = Arc::clone(&exit);
        let handle = thread::spawn(move || {
            debug!("refresh worker: started");
            while !flag.load(Ordering::Acquire) {
                cache.background_refresh();
                thread::park_timeout(period);
            }
            debug!("refresh worker: exiting");
        });

        RefreshWorker {
            exit,
            handle: Some(handle),
        }
    }
}

/// Background refresh thread handle. The thread is stopped and joined
/// on [RefreshWorker::stop] or when dropped.
#[derive(Debug)]
pub struct RefreshWorker {
    exit: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    /// True while the worker thread is running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
    /// Stops and joins the worker thread
    pub fn stop(mut self) {
        self.shutdown();
    }
    fn shutdown(&mut self) {
        self.exit.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                error!("refresh worker: position provider panicked");
            }
        }
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test {
    use super::Tracker;
    use crate::{
        cfg::Config,
        interp::Error,
        site::Site,
        sky::{app_to_tirs, cirs_to_tirs},
        snapshot::{Frame, PositionProvider, Snapshot},
        sun::LowPrecisionSun,
        time::Times,
    };
    use hifitime::{Epoch, Unit};
    use map_3d::deg2rad;
    use nalgebra::Vector3;
    use std::str::FromStr;

    fn melbourne() -> Site {
        let mut site = Site::new(-37.8236, 144.9913, 10.0);
        site.set_temperature_pressure(15.0, 1013.0);
        site.set_timezone(10.0);
        site
    }

    #[test]
    fn interpolated_vs_full() {
        let t0 = Epoch::from_str("2021-06-21T00:00:00 UTC").unwrap();
        let cfg = Config::default().with_dut1(-0.2 * Unit::Second);
        let tracker = Tracker::new(cfg, t0, LowPrecisionSun).unwrap();
        let site = melbourne();

        for minutes in (0..23 * 60).step_by(17) {
            let t = t0 + (minutes as f64) * Unit::Minute;
            let fast = tracker.topocentric(t, &site).unwrap();

            let times = Times::new(t, cfg.dut1);
            let full = LowPrecisionSun.evaluate(times.j2k_tt_cy);
            let tirs = app_to_tirs(&full.direction, times.j2k_ut1_d, full.eq_eq_rad);
            let full = site.tirs_to_topo(&tirs, full.distance_au);

            let err = (fast.rect - full.rect).norm();
            assert!(
                err < deg2rad(0.5 / 3600.0),
                "interpolation error too large {}\" @{:?}",
                err.to_degrees() * 3600.0,
                t
            );
        }
    }

    #[test]
    fn underrun() {
        let t0 = Epoch::from_str("2020-07-16T00:00:00 UTC").unwrap();
        let cfg = Config::default().with_recalc_interval(1.0 * Unit::Hour);
        let tracker = Tracker::new(cfg, t0, LowPrecisionSun).unwrap();
        let site = melbourne();

        assert!(tracker.topocentric(t0 + 90.0 * Unit::Minute, &site).is_ok());
        assert!(matches!(
            tracker.topocentric(t0 + 150.0 * Unit::Minute, &site),
            Err(Error::RefreshUnderrun { .. })
        ));

        assert!(tracker.refresh());
        assert!(!tracker.refresh());
        assert!(tracker.topocentric(t0 + 150.0 * Unit::Minute, &site).is_ok());
        assert!(matches!(
            tracker.topocentric(t0, &site),
            Err(Error::BeforeWindow { .. })
        ));
    }

    #[test]
    fn invalid_config() {
        let t0 = Epoch::from_str("2020-07-16T00:00:00 UTC").unwrap();
        let cfg = Config::default().with_recalc_interval(0.0 * Unit::Hour);
        assert!(matches!(
            Tracker::new(cfg, t0, LowPrecisionSun),
            Err(Error::InvalidInterval)
        ));

        // would spin the refresh worker
        let cfg = Config::default().with_refresh_period(0.0 * Unit::Second);
        assert!(matches!(
            Tracker::new(cfg, t0, LowPrecisionSun),
            Err(Error::InvalidRefreshPeriod)
        ));
    }

    #[test]
    fn multiple_sites() {
        let t0 = Epoch::from_str("2020-07-23T08:00:00 UTC").unwrap();
        let tracker = Tracker::new(Config::default(), t0, LowPrecisionSun).unwrap();

        let mut sites = [
            Site::new(51.5074, -0.1278, 11.0),
            Site::new(48.858093, 2.294694, 307.0),
            Site::new(41.9028, 12.4964, 21.0),
        ];
        for (site, (temperature, pressure)) in sites
            .iter_mut()
            .zip([(11.0, 1013.0), (12.0, 974.0), (15.0, 1010.0)])
        {
            site.set_temperature_pressure(temperature, pressure);
        }

        let t = t0 + 5.0 * Unit::Minute;
        let all = tracker.topocentric_sites(t, &sites).unwrap();
        assert_eq!(all.len(), 3);
        for (site, topo) in sites.iter().zip(all.iter()) {
            let single = tracker.topocentric(t, site).unwrap();
            assert_eq!(*topo, single);
            // summer morning in Europe
            assert!(topo.elevation_deg() > 10.0, "elevation {}", topo.elevation_deg());
            assert!(topo.azimuth_deg() > 60.0 && topo.azimuth_deg() < 180.0);
        }
    }

    /// Body fixed in the intermediate frame, far away
    struct Intermediate;

    impl PositionProvider for Intermediate {
        fn evaluate(&self, t_cy: f64) -> Snapshot {
            Snapshot::new(t_cy, Vector3::new(0.6, 0.8, 0.0), 0.0, 1.0)
        }
        fn frame(&self) -> Frame {
            Frame::Intermediate
        }
    }

    #[test]
    fn intermediate_frame() {
        let t0 = Epoch::from_str("2022-01-01T00:00:00 UTC").unwrap();
        let tracker = Tracker::new(Config::default(), t0, Intermediate).unwrap();

        let t = t0 + 3.0 * Unit::Hour;
        let (tirs, distance_au) = tracker.terrestrial(t).unwrap();
        let times = Times::new(t, tracker.config().dut1);
        let expected = cirs_to_tirs(&Vector3::new(0.6, 0.8, 0.0), times.j2k_ut1_d);

        assert_eq!(distance_au, 0.0);
        // equation of the equinoxes is ignored in this frame
        assert!((tirs - expected).norm() < 1.0E-12);
    }
}
