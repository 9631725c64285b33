//! Display unit conversion. Everything internal is SI.

use std::fmt;
use std::str::FromStr;

const FEET_PER_METER: f64 = 3.2808399;
const MPH_PER_MPS: f64 = 2.2369363;
const KPH_PER_MPS: f64 = 3.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    /// Meters, but speeds in km/h
    MetricKph,
    Imperial,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown unit system `{0}` (expected metric, metric-kph or imperial)")]
pub struct UnknownUnitSystem(String);

impl UnitSystem {
    pub fn distance_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric | UnitSystem::MetricKph => "m",
            UnitSystem::Imperial => "ft",
        }
    }

    pub fn velocity_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::MetricKph => "km/h",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn meters_to_unit(&self, meters: f64) -> f64 {
        match self {
            UnitSystem::Metric | UnitSystem::MetricKph => meters,
            UnitSystem::Imperial => meters * FEET_PER_METER,
        }
    }

    pub fn mps_to_unit(&self, mps: f64) -> f64 {
        match self {
            UnitSystem::Metric => mps,
            UnitSystem::MetricKph => mps * KPH_PER_MPS,
            UnitSystem::Imperial => mps * MPH_PER_MPS,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitSystem::Metric => "metric",
            UnitSystem::MetricKph => "metric-kph",
            UnitSystem::Imperial => "imperial",
        })
    }
}

impl FromStr for UnitSystem {
    type Err = UnknownUnitSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(UnitSystem::Metric),
            "metric-kph" => Ok(UnitSystem::MetricKph),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(UnknownUnitSystem(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conversions() {
        assert_relative_eq!(UnitSystem::Imperial.meters_to_unit(100.0), 328.08399);
        assert_relative_eq!(UnitSystem::MetricKph.meters_to_unit(100.0), 100.0);
        assert_relative_eq!(UnitSystem::Imperial.mps_to_unit(10.0), 22.369363);
        assert_relative_eq!(UnitSystem::MetricKph.mps_to_unit(10.0), 36.0);
        assert_relative_eq!(UnitSystem::Metric.mps_to_unit(10.0), 10.0);
    }

    #[test]
    fn labels() {
        assert_eq!(UnitSystem::MetricKph.distance_unit(), "m");
        assert_eq!(UnitSystem::MetricKph.velocity_unit(), "km/h");
        assert_eq!(UnitSystem::Imperial.distance_unit(), "ft");
        assert_eq!(UnitSystem::Imperial.velocity_unit(), "mph");
    }

    #[test]
    fn parse_and_display_agree() {
        for unit in [UnitSystem::Metric, UnitSystem::MetricKph, UnitSystem::Imperial] {
            assert_eq!(unit.to_string().parse::<UnitSystem>().unwrap(), unit);
        }
        assert!("furlongs".parse::<UnitSystem>().is_err());
    }
}
