//! Physical constants, the friction/energy model and angle helpers

use crate::linalg::{Quat, Vec3, DOWN, FORWARD, RIGHT, UP};
use crate::spline::TrackPoint;

pub const G: f64 = 9.80665;
/// Default integrator timestep (s)
pub const DT: f64 = 0.001;
/// Roll rates (deg/s) below this are not applied
pub const ROLL_EPSILON: f64 = 0.01;
/// Fraction of the heartline height at which the wheels meet the rail
const CONTACT_HEIGHT_RATIO: f64 = 0.9;

/// Friction and drag parameters shared by every section of a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackConfig {
    /// Rolling friction coefficient
    pub parameter: f64,
    /// Drag coefficient, the loss scales with v³
    pub resistance: f64,
    /// Distance from the rail to the rider's heart
    pub heartline_height: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            parameter: 0.027,
            resistance: 1e-5,
            heartline_height: 1.1,
        }
    }
}

impl From<persist::ConfigData> for TrackConfig {
    fn from(c: persist::ConfigData) -> Self {
        Self {
            parameter: c.parameter,
            resistance: c.resistance,
            heartline_height: c.heartline_height,
        }
    }
}

impl From<TrackConfig> for persist::ConfigData {
    fn from(c: TrackConfig) -> Self {
        Self {
            parameter: c.parameter,
            resistance: c.resistance,
            heartline_height: c.heartline_height,
        }
    }
}

impl TrackConfig {
    /// Where friction is measured: below the heartline, close to the rail
    pub fn contact_point(&self, pos: &Vec3, rot: &Quat) -> Vec3 {
        pos + rot.rotate(&(DOWN * (self.heartline_height * CONTACT_HEIGHT_RATIO)))
    }

    /// Speed after moving the contact point from `last_contact` to `contact`
    /// over `dt` seconds, starting at `velocity`.
    ///
    /// Energy per unit mass: kinetic energy minus drag (v³·dt·resistance),
    /// minus the potential energy gained, minus friction work along the
    /// contact path. Returns `None` once no energy is left, the train has
    /// stalled.
    pub fn next_velocity(
        &self,
        velocity: f64,
        dt: f64,
        last_contact: &Vec3,
        contact: &Vec3,
    ) -> Option<f64> {
        let mut energy = 0.5 * velocity * velocity;
        energy -= velocity * velocity * velocity * dt * self.resistance;
        let climb = contact.y - last_contact.y;
        let path = (contact - last_contact).magnitude();
        energy -= (climb + path * self.parameter) * G;
        if energy <= 0.0 {
            None
        } else {
            Some((2.0 * energy).sqrt())
        }
    }
}

/// How a section's speed evolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedModel {
    /// Constant speed (m/s), no energy bookkeeping
    Fixed(f64),
    /// Speed follows the energy model, starting from the incoming speed
    Friction(TrackConfig),
}

impl SpeedModel {
    /// Picks the model for a section. `None` when the section needs
    /// friction but the track has no config.
    pub fn resolve(fixed_speed: Option<f64>, config: Option<&TrackConfig>) -> Option<Self> {
        match (fixed_speed, config) {
            (Some(v), _) => Some(SpeedModel::Fixed(v)),
            (None, Some(c)) => Some(SpeedModel::Friction(*c)),
            (None, None) => None,
        }
    }

    pub fn initial_velocity(&self, incoming: f64) -> f64 {
        match self {
            SpeedModel::Fixed(v) => *v,
            SpeedModel::Friction(_) => incoming,
        }
    }
}

/// Speed at `point` after travelling from `last_point` over `dt` seconds,
/// 0 if the train stalls on the way. Used by the stepped (non-FVD) sections.
pub fn track_friction(
    config: &TrackConfig,
    last_point: &TrackPoint,
    point: &TrackPoint,
    dt: f64,
) -> f64 {
    let contact = config.contact_point(&point.pos, &point.rot);
    let last_contact = config.contact_point(&last_point.pos, &last_point.rot);
    config
        .next_velocity(last_point.velocity, dt, &last_contact, &contact)
        .unwrap_or(0.0)
}

pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Signed shortest turn from `deg1` to `deg2`, in (-180, 180]
pub fn deg_diff(deg1: f64, deg2: f64) -> f64 {
    let mut diff = deg2 - deg1;
    while diff < -180.0 {
        diff += 360.0;
    }
    while diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Wraps an angle in degrees into [-180, 180]
pub fn fix_angle_range(angle: f64) -> f64 {
    let full = (angle / 360.0).floor();
    let v = angle - full * 360.0;
    if v > 180.0 {
        v - 360.0
    } else if v < -180.0 {
        v + 360.0
    } else {
        v
    }
}

/// Yaw, pitch and roll of an orientation in degrees, measured against the
/// world axes
pub fn euler(rot: &Quat) -> (f64, f64, f64) {
    let dir = rot.rotate(&FORWARD);
    let yaw = rad_to_deg((-dir.x).atan2(-dir.z));
    let pitch = rad_to_deg(dir.y.atan2((dir.x * dir.x + dir.z * dir.z).sqrt()));

    let up = rot.rotate(&UP);
    let right = rot.rotate(&RIGHT);
    let roll = rad_to_deg((-right.y).atan2(up.y));
    (yaw, pitch, roll)
}
