//! Force-vector design integrator
//!
//! Turns target g-forces and roll rate over time into a heartline. Each
//! fixed step rolls the orientation about its own forward axis, then pitches
//! and yaws it by the angular rate needed to feel the target forces at the
//! current speed, and finally advances along the new forward axis.

use crate::linalg::{Quat, FORWARD, RIGHT, UP};
use crate::physics::{deg_to_rad, SpeedModel, DT, G, ROLL_EPSILON};
use crate::spline::{TrackPoint, TrackSpline};
use crate::transitions::{Forces, Transitions};

/// Guards the step count against `length / dt` landing a hair above an
/// integer
const STEP_TOL: f64 = 1e-9;
/// Most points reserved up front, longer runs grow as they go
const MAX_PREALLOC: usize = 1 << 20;

/// Fixed-step integrator
#[derive(Debug, Clone, Copy, PartialEq, getset::CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Fvd {
    /// Timestep (s)
    dt: f64,
}

impl Default for Fvd {
    fn default() -> Self {
        Self { dt: DT }
    }
}

impl Fvd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dt(dt: f64) -> Self {
        Self { dt }
    }

    /// Number of steps needed to cover `length` seconds
    pub fn step_count(&self, length: f64) -> usize {
        if !(length > 0.0) || !(self.dt > 0.0) {
            return 0;
        }
        (length / self.dt - STEP_TOL).ceil().max(0.0) as usize
    }

    /// Integrates `transitions` from `start`.
    ///
    /// Each axis is evaluated against the matching baseline in
    /// `start_forces`. The returned spline does not contain `start` itself,
    /// the first point is one step in. Under [`SpeedModel::Friction`] the
    /// spline ends early if the train runs out of energy.
    pub fn run(
        &self,
        transitions: &Transitions,
        start: &TrackPoint,
        speed: SpeedModel,
        start_forces: &Forces,
    ) -> TrackSpline {
        transitions.lint();

        let steps = self.step_count(transitions.length());
        let mut velocity = speed.initial_velocity(start.velocity);
        let mut pos = start.pos;
        let mut dir = start.rot;
        let mut points: Vec<TrackPoint> = Vec::with_capacity(steps.min(MAX_PREALLOC));

        if !(velocity > 0.0) {
            log::debug!("fvd run skipped, start velocity {velocity}");
            return TrackSpline::new(points);
        }

        for i in 0..steps {
            let time = i as f64 * self.dt;
            let Some(target) = transitions.evaluate(time, start_forces) else {
                break;
            };

            dir = self.orient(dir, &target, velocity);
            pos += dir.rotate(&FORWARD) * (velocity * self.dt);

            if let SpeedModel::Friction(config) = &speed {
                let contact = config.contact_point(&pos, &dir);
                let last_contact = points
                    .last()
                    .map(|p| config.contact_point(&p.pos, &p.rot))
                    .unwrap_or(contact);
                match config.next_velocity(velocity, self.dt, &last_contact, &contact) {
                    Some(v) => velocity = v,
                    None => {
                        log::debug!(
                            "train stalled {time:.3}s into a {:.3}s force section",
                            transitions.length()
                        );
                        break;
                    }
                }
            }

            points.push(TrackPoint::new(pos, dir, velocity, time + start.time));
        }

        TrackSpline::new(points)
    }

    /// One orientation step toward the `target` forces at `velocity`
    fn orient(&self, dir: Quat, target: &Forces, velocity: f64) -> Quat {
        let mut dir = dir;
        if target.roll.abs() > ROLL_EPSILON {
            let roll = Quat::from_axis_angle(&dir.rotate(&FORWARD), deg_to_rad(target.roll) * self.dt);
            dir = roll * dir;
        }

        let up = dir.rotate(&UP).normalize();
        let right = dir.rotate(&RIGHT).normalize();
        // what the rider feels, minus what they should feel
        let force_vec = UP - up * target.vert - right * target.lat;
        let normal_force = -force_vec.dot(&up) * G;
        let lateral_force = -force_vec.dot(&right) * G;

        let pitch = Quat::from_axis_angle(&right, normal_force / velocity * self.dt);
        let yaw = Quat::from_axis_angle(&up, -lateral_force / velocity * self.dt);
        (pitch * yaw * dir).normalize()
    }
}
