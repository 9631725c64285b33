//! Track composition
//!
//! A [`Track`] is a list of sections built one after another: each section
//! starts from the last point of the one before it, and force sections pick
//! up the forces the previous section ended with.

use crate::error::{Result, TrackError};
use crate::integrator::Fvd;
use crate::linalg::{Quat, Vec3, FORWARD, RIGHT, UP};
use crate::physics::{deg_diff, deg_to_rad, euler, track_friction, SpeedModel, TrackConfig, G};
use crate::spline::{TrackPoint, TrackSpline};
use crate::transitions::{Forces, Transitions};

/// Distance between points on straight sections (m)
const STRAIGHT_STEP: f64 = 0.01;
/// Points per curved section
const CURVE_STEPS: usize = 200;
/// Upper bound on the points a single section may produce
pub const MAX_SECTION_STEPS: usize = 1_000_000;
/// How far before the end of a section its exit forces are sampled (m)
const FORCE_SAMPLE_OFFSET: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackSection {
    Straight {
        length: f64,
        fixed_speed: Option<f64>,
    },
    Force {
        fixed_speed: Option<f64>,
        transitions: Transitions,
    },
    /// Constant radius arc. `direction` (deg) turns the bend axis about
    /// forward: 0 bends up, 90 turns flat. `angle` (deg) is the sweep.
    Curved {
        fixed_speed: Option<f64>,
        radius: f64,
        direction: f64,
        angle: f64,
    },
}

fn check_positive(section: usize, what: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TrackError::InvalidSection {
            section,
            what,
            value,
        })
    }
}

impl TrackSection {
    pub fn fixed_speed(&self) -> Option<f64> {
        match self {
            TrackSection::Straight { fixed_speed, .. }
            | TrackSection::Force { fixed_speed, .. }
            | TrackSection::Curved { fixed_speed, .. } => *fixed_speed,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TrackSection::Straight { .. } => "straight",
            TrackSection::Force { .. } => "force",
            TrackSection::Curved { .. } => "curved",
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if let Some(v) = self.fixed_speed() {
            check_positive(index, "fixed speed", v)?;
        }
        match self {
            TrackSection::Straight { length, .. } => check_positive(index, "length", *length),
            TrackSection::Force { transitions, .. } => {
                for segment in transitions
                    .vert
                    .iter()
                    .chain(&transitions.lat)
                    .chain(&transitions.roll)
                {
                    check_positive(index, "transition length", segment.length)?;
                }
                Ok(())
            }
            TrackSection::Curved {
                radius,
                direction,
                angle,
                ..
            } => {
                check_positive(index, "radius", *radius)?;
                check_positive(index, "angle", *angle)?;
                if direction.is_finite() {
                    Ok(())
                } else {
                    Err(TrackError::InvalidSection {
                        section: index,
                        what: "direction",
                        value: *direction,
                    })
                }
            }
        }
    }
}

/// Output of [`Track::get_spline`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBuild {
    pub spline: TrackSpline,
    /// Arc length along `spline` where each section begins, followed by the
    /// total length
    pub section_start_pos: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub sections: Vec<TrackSection>,
    /// Where the first section starts. Its rotation and time are not used,
    /// the first section always starts level at time 0.
    pub anchor: TrackPoint,
    /// Needed by every section without a fixed speed
    pub config: Option<TrackConfig>,
    pub fvd: Fvd,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            sections: vec![TrackSection::Straight {
                length: 10.0,
                fixed_speed: Some(5.0),
            }],
            anchor: TrackPoint::new(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, 10.0, 0.0),
            config: Some(TrackConfig::default()),
            fvd: Fvd::default(),
        }
    }
}

impl Track {
    pub fn new(anchor: TrackPoint, config: Option<TrackConfig>) -> Self {
        Self {
            sections: vec![],
            anchor,
            config,
            fvd: Fvd::default(),
        }
    }

    pub fn with_section(mut self, section: TrackSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Parses a track file of any supported version
    pub fn from_json(json: &str) -> Result<Self> {
        Track::try_from(persist::load_track(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(persist::save_track(&persist::TrackData::from(self))?)
    }

    /// Checks everything that would otherwise fail halfway through a build
    pub fn validate(&self) -> Result<()> {
        // a fixed speed first section never reads the anchor velocity
        if let Some(first) = self.sections.first() {
            if first.fixed_speed().is_none()
                && !(self.anchor.velocity > 0.0 && self.anchor.velocity.is_finite())
            {
                return Err(TrackError::InvalidAnchor(self.anchor.velocity));
            }
        }
        if let Some(config) = &self.config {
            for (what, value) in [
                ("parameter", config.parameter),
                ("resistance", config.resistance),
                ("heartline height", config.heartline_height),
            ] {
                if !value.is_finite() {
                    return Err(TrackError::InvalidConfig { what, value });
                }
            }
        }
        for (i, section) in self.sections.iter().enumerate() {
            section.validate(i)?;
            let steps = self.section_steps(section);
            if steps > MAX_SECTION_STEPS {
                return Err(TrackError::SectionTooLong {
                    section: i,
                    steps,
                    max: MAX_SECTION_STEPS,
                });
            }
            self.speed_model(i, section)?;
        }
        Ok(())
    }

    fn section_steps(&self, section: &TrackSection) -> usize {
        match section {
            TrackSection::Straight { length, .. } => (length / STRAIGHT_STEP).round() as usize,
            TrackSection::Force { transitions, .. } => self.fvd.step_count(transitions.length()),
            TrackSection::Curved { .. } => CURVE_STEPS,
        }
    }

    fn speed_model(&self, index: usize, section: &TrackSection) -> Result<SpeedModel> {
        SpeedModel::resolve(section.fixed_speed(), self.config.as_ref())
            .ok_or(TrackError::MissingFriction { section: index })
    }

    /// One spline per section. A section's spline never contains its start
    /// point, which is the previous section's last point.
    pub fn section_splines(&self) -> Result<Vec<TrackSpline>> {
        self.validate()?;

        let mut splines = Vec::with_capacity(self.sections.len());
        let mut start = TrackPoint {
            rot: Quat::IDENTITY,
            time: 0.0,
            ..self.anchor
        };
        let mut start_forces = Forces::NEUTRAL;

        for (i, section) in self.sections.iter().enumerate() {
            let speed = self.speed_model(i, section)?;
            let spline = self.make_spline(section, &start, speed, &start_forces);
            log::debug!(
                "built {} section {i}: {} points, {:.2} m",
                section.kind(),
                spline.len(),
                spline.get_length()
            );

            if let Some(last) = spline.last() {
                start = *last;
            }
            start_forces = match forces(&spline, spline.get_length() - FORCE_SAMPLE_OFFSET) {
                Some(f) => f,
                None => {
                    log::debug!("section {i} is too short to sample exit forces, carrying {start_forces:?}");
                    start_forces
                }
            };
            splines.push(spline);
        }
        Ok(splines)
    }

    pub fn get_spline(&self) -> Result<TrackBuild> {
        let splines = self.section_splines()?;

        let mut points = Vec::with_capacity(splines.iter().map(TrackSpline::len).sum());
        let mut section_start_pos = Vec::with_capacity(splines.len() + 1);
        let mut total = 0.0;
        let mut prev_last: Option<TrackPoint> = None;
        for spline in splines {
            section_start_pos.push(total);
            if let (Some(prev), Some(first)) = (&prev_last, spline.first()) {
                total += (first.pos - prev.pos).magnitude();
            }
            total += spline.get_length();
            if let Some(last) = spline.last() {
                prev_last = Some(*last);
            }
            points.extend(spline.points);
        }
        section_start_pos.push(total);

        Ok(TrackBuild {
            spline: TrackSpline::new(points),
            section_start_pos,
        })
    }

    pub fn export_to_nl2elem(&self) -> Result<String> {
        self.get_spline()?.spline.export_to_nl2elem()
    }

    fn make_spline(
        &self,
        section: &TrackSection,
        start: &TrackPoint,
        speed: SpeedModel,
        start_forces: &Forces,
    ) -> TrackSpline {
        match section {
            TrackSection::Straight { length, .. } => straight(start, *length, speed),
            TrackSection::Force { transitions, .. } => {
                self.fvd.run(transitions, start, speed, start_forces)
            }
            TrackSection::Curved {
                radius,
                direction,
                angle,
                ..
            } => curved(start, *radius, *direction, *angle, speed),
        }
    }
}

/// Speed after stepping to `point` from the last point pushed (or from
/// `point` itself on the first step). `None` once the train stalls.
fn step_velocity(
    speed: &SpeedModel,
    velocity: f64,
    step: f64,
    points: &[TrackPoint],
    pos: Vec3,
    rot: Quat,
    time: f64,
) -> Option<f64> {
    match speed {
        SpeedModel::Fixed(v) => Some(*v),
        SpeedModel::Friction(config) => {
            let probe = TrackPoint::new(pos, rot, velocity, time);
            let last = points.last().unwrap_or(&probe);
            let v = track_friction(config, last, &probe, step / velocity);
            (v > 0.0).then_some(v)
        }
    }
}

fn straight(start: &TrackPoint, length: f64, speed: SpeedModel) -> TrackSpline {
    let steps = (length / STRAIGHT_STEP).round() as usize;
    let dir = start.rot.rotate(&FORWARD);
    let mut velocity = speed.initial_velocity(start.velocity);
    let mut time = start.time;
    let mut points = Vec::with_capacity(steps);

    for i in 1..=steps {
        let pos = start.pos + dir * (i as f64 * STRAIGHT_STEP);
        let Some(v) = step_velocity(&speed, velocity, STRAIGHT_STEP, &points, pos, start.rot, time)
        else {
            log::debug!("train stalled {:.2} m into a {length:.2} m straight", (i - 1) as f64 * STRAIGHT_STEP);
            break;
        };
        velocity = v;
        time += STRAIGHT_STEP / velocity;
        points.push(TrackPoint::new(pos, start.rot, velocity, time));
    }
    TrackSpline::new(points)
}

fn curved(
    start: &TrackPoint,
    radius: f64,
    direction: f64,
    angle: f64,
    speed: SpeedModel,
) -> TrackSpline {
    let step = deg_to_rad(angle) * radius / CURVE_STEPS as f64;
    let axis = Quat::from_axis_angle(&FORWARD, deg_to_rad(direction)).rotate(&RIGHT);
    let turn = Quat::from_axis_angle(&axis, step / radius);

    let mut pos = start.pos;
    let mut rot = start.rot;
    let mut velocity = speed.initial_velocity(start.velocity);
    let mut time = start.time;
    let mut points = Vec::with_capacity(CURVE_STEPS);

    for i in 0..CURVE_STEPS {
        pos += rot.rotate(&FORWARD) * step;
        let Some(v) = step_velocity(&speed, velocity, step, &points, pos, rot, time) else {
            log::debug!("train stalled {i} of {CURVE_STEPS} steps into a curve");
            break;
        };
        velocity = v;
        rot = rot * turn;
        time += step / velocity;
        points.push(TrackPoint::new(pos, rot, velocity, time));
    }
    TrackSpline::new(points)
}

/// Vertical and lateral forces felt around `distance`, estimated from the
/// change in pitch and yaw across the raw segment there. Roll rate is
/// reported as 0.
pub fn forces(spline: &TrackSpline, distance: f64) -> Option<Forces> {
    let (last, point) = spline.evaluate_no_interpolation(distance)?;
    let dist = (point.pos - last.pos).magnitude();
    if !(dist > 0.0) {
        return None;
    }

    let (last_yaw, last_pitch, _) = euler(&last.rot);
    let (yaw, pitch, roll) = euler(&point.rot);
    let pitch_from_last = deg_to_rad(deg_diff(last_pitch, pitch));
    let yaw_from_last = deg_to_rad(deg_diff(last_yaw, yaw));
    // yaw turns less of the heading the steeper the track
    let yaw_scale = deg_to_rad(pitch.abs()).cos();

    let normal_d_angle = pitch_from_last * deg_to_rad(-roll).cos()
        - yaw_scale * -yaw_from_last * deg_to_rad(-roll).sin();
    let lateral_d_angle = -pitch_from_last * deg_to_rad(roll).sin()
        - yaw_scale * yaw_from_last * deg_to_rad(roll).cos();

    let v2 = point.velocity * point.velocity;
    let force_vec = UP
        + point.rot.rotate(&UP) * (v2 * normal_d_angle / dist / G)
        + point.rot.rotate(&RIGHT) * (v2 * lateral_d_angle / dist / G);

    Some(Forces::new(
        force_vec.dot(&last.rot.rotate(&UP)),
        force_vec.dot(&last.rot.rotate(&RIGHT)),
        0.0,
    ))
}

impl From<&persist::SectionData> for TrackSection {
    fn from(data: &persist::SectionData) -> Self {
        match data {
            persist::SectionData::Straight {
                length,
                fixed_speed,
            } => TrackSection::Straight {
                length: *length,
                fixed_speed: *fixed_speed,
            },
            persist::SectionData::Force {
                fixed_speed,
                transitions,
            } => TrackSection::Force {
                fixed_speed: *fixed_speed,
                transitions: transitions.into(),
            },
            persist::SectionData::Curved {
                fixed_speed,
                radius,
                direction,
                angle,
            } => TrackSection::Curved {
                fixed_speed: *fixed_speed,
                radius: *radius,
                direction: *direction,
                angle: *angle,
            },
        }
    }
}

impl From<&TrackSection> for persist::SectionData {
    fn from(section: &TrackSection) -> Self {
        match section {
            TrackSection::Straight {
                length,
                fixed_speed,
            } => persist::SectionData::Straight {
                length: *length,
                fixed_speed: *fixed_speed,
            },
            TrackSection::Force {
                fixed_speed,
                transitions,
            } => persist::SectionData::Force {
                fixed_speed: *fixed_speed,
                transitions: transitions.into(),
            },
            TrackSection::Curved {
                fixed_speed,
                radius,
                direction,
                angle,
            } => persist::SectionData::Curved {
                fixed_speed: *fixed_speed,
                radius: *radius,
                direction: *direction,
                angle: *angle,
            },
        }
    }
}

/// Converts a loaded file, rejecting tracks that cannot be built
impl TryFrom<persist::TrackData> for Track {
    type Error = TrackError;

    fn try_from(data: persist::TrackData) -> Result<Self> {
        let data = data.migrate()?;
        let track = Track {
            sections: data.sections.iter().map(TrackSection::from).collect(),
            anchor: TrackPoint::from(&data.anchor),
            config: data.config.map(TrackConfig::from),
            fvd: Fvd::default(),
        };
        track.validate()?;
        Ok(track)
    }
}

impl From<&Track> for persist::TrackData {
    fn from(track: &Track) -> Self {
        Self {
            version: persist::CURRENT_VERSION,
            sections: track.sections.iter().map(Into::into).collect(),
            config: track.config.map(Into::into),
            anchor: (&track.anchor).into(),
        }
    }
}
