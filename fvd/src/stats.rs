//! Summary figures for a finished track

use crate::spline::TrackSpline;
use crate::units::UnitSystem;

/// Length, height and top speed of a spline, in SI units
#[derive(Debug, Clone, Copy, PartialEq, Default, getset::CopyGetters)]
#[getset(get_copy = "pub")]
pub struct TrackStats {
    /// Arc length (m)
    length: f64,
    /// Highest point minus lowest point (m)
    height: f64,
    /// Fastest point (m/s)
    top_speed: f64,
}

impl TrackStats {
    pub fn from_spline(spline: &TrackSpline) -> Self {
        let height = spline.height_range().map(|(lo, hi)| hi - lo).unwrap_or(0.0);
        let top_speed = spline
            .points
            .iter()
            .map(|p| p.velocity)
            .fold(0.0, f64::max);
        Self {
            length: spline.get_length(),
            height,
            top_speed,
        }
    }

    /// One line summary in `units`
    pub fn describe(&self, units: UnitSystem) -> String {
        let d = units.distance_unit();
        format!(
            "length {:.1} {d}, height {:.1} {d}, top speed {:.1} {}",
            units.meters_to_unit(self.length),
            units.meters_to_unit(self.height),
            units.mps_to_unit(self.top_speed),
            units.velocity_unit()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{Quat, Vec3};
    use crate::spline::TrackPoint;
    use approx::assert_relative_eq;

    #[test]
    fn stats_of_a_small_hill() {
        let spline = TrackSpline::new(vec![
            TrackPoint::new(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, 10.0, 0.0),
            TrackPoint::new(Vec3::new(0.0, 13.0, 4.0), Quat::IDENTITY, 7.0, 0.5),
            TrackPoint::new(Vec3::new(0.0, 8.0, 4.0), Quat::IDENTITY, 12.5, 1.0),
        ]);
        let stats = TrackStats::from_spline(&spline);
        assert_relative_eq!(stats.length(), 10.0);
        assert_relative_eq!(stats.height(), 5.0);
        assert_relative_eq!(stats.top_speed(), 12.5);
    }

    #[test]
    fn empty_spline_is_all_zero() {
        assert_eq!(TrackStats::from_spline(&TrackSpline::default()), TrackStats::default());
    }

    #[test]
    fn describe_converts_units() {
        let stats = TrackStats {
            length: 100.0,
            height: 10.0,
            top_speed: 10.0,
        };
        assert_eq!(
            stats.describe(UnitSystem::MetricKph),
            "length 100.0 m, height 10.0 m, top speed 36.0 km/h"
        );
        assert_eq!(
            stats.describe(UnitSystem::Imperial),
            "length 328.1 ft, height 32.8 ft, top speed 22.4 mph"
        );
    }
}
