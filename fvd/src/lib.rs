//! Force-vector design (FVD) roller coaster track generation
//!
//! Tracks are authored as target g-forces over time ([`Transitions`]) and
//! integrated into a heartline ([`TrackSpline`]) that can be queried by arc
//! length and exported to NoLimits 2 (NL2Elem).

extern crate nalgebra as na;

pub mod curve;
pub mod error;
pub mod integrator;
pub mod linalg;
pub mod nl2elem;
pub mod physics;
pub mod spline;
pub mod stats;
pub mod track;
pub mod transitions;
pub mod units;

pub use curve::Curve;
pub use error::{Result, TrackError};
pub use integrator::Fvd;
pub use physics::{SpeedModel, TrackConfig};
pub use spline::{TrackPoint, TrackSpline};
pub use stats::TrackStats;
pub use track::{forces, Track, TrackBuild, TrackSection};
pub use transitions::{Forces, Transition, Transitions};
pub use units::UnitSystem;
