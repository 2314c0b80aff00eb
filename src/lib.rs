#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod interp;
mod site;
mod snapshot;
mod sun;
mod tracker;

// public modules
pub mod sky;
pub mod time;

// pub export
pub use interp::Error;


// prelude
pub mod prelude {
    pub use crate::cfg::Config;
    pub use crate::interp::{Error, InterpolationCache};
    pub use crate::site::{Horizon, RefractionModel, Site, Surface};
    pub use crate::snapshot::{Frame, PositionProvider, Snapshot};
    pub use crate::sun::LowPrecisionSun;
    pub use crate::time::Times;
    pub use crate::tracker::{RefreshWorker, Tracker};
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
    pub use nalgebra::Vector3;
}
