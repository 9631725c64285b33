//! Arc-length indexed track splines

use crate::linalg::{lerp, vlerp, Quat, Vec3};

/// State of the train's heartline at one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub pos: Vec3,
    pub rot: Quat,
    /// Speed (m/s)
    pub velocity: f64,
    /// Seconds since the start of the track
    pub time: f64,
}

impl TrackPoint {
    pub fn new(pos: Vec3, rot: Quat, velocity: f64, time: f64) -> Self {
        Self {
            pos,
            rot,
            velocity,
            time,
        }
    }
}

impl From<&persist::PointData> for TrackPoint {
    fn from(p: &persist::PointData) -> Self {
        Self {
            pos: Vec3::from(p.pos),
            rot: Quat::from_array(p.rot),
            velocity: p.velocity,
            time: p.time,
        }
    }
}

impl From<&TrackPoint> for persist::PointData {
    fn from(p: &TrackPoint) -> Self {
        Self {
            pos: [p.pos.x, p.pos.y, p.pos.z],
            rot: p.rot.to_array(),
            velocity: p.velocity,
            time: p.time,
        }
    }
}

/// A raw point picked by [`TrackSpline::interval_points`], with its arc
/// length from the start of the spline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalPoint {
    pub point: TrackPoint,
    pub dist: f64,
}

/// Tolerance when deciding an interval has been covered
const INTERVAL_TOL: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSpline {
    pub points: Vec<TrackPoint>,
}

impl TrackSpline {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    /// Consecutive point pairs with the distance between them
    fn segments(&self) -> impl Iterator<Item = (&TrackPoint, &TrackPoint, f64)> {
        self.points
            .windows(2)
            .map(|w| (&w[0], &w[1], (w[1].pos - w[0].pos).magnitude()))
    }

    /// Total arc length
    pub fn get_length(&self) -> f64 {
        self.segments().map(|(_, _, d)| d).sum()
    }

    /// Interpolated point `distance` meters along the spline, `None` beyond
    /// either end
    pub fn evaluate(&self, distance: f64) -> Option<TrackPoint> {
        if distance < 0.0 {
            return None;
        }
        if distance == 0.0 {
            return self.points.first().copied();
        }
        let mut total = 0.0;
        for (prev, curr, segment_length) in self.segments() {
            if total + segment_length >= distance {
                let t = if segment_length > 0.0 {
                    (distance - total) / segment_length
                } else {
                    0.0
                };
                if t <= 0.0 {
                    return Some(*prev);
                }
                return Some(TrackPoint {
                    pos: vlerp(&prev.pos, &curr.pos, t),
                    rot: prev.rot.slerp(&curr.rot, t),
                    velocity: lerp(prev.velocity, curr.velocity, t),
                    time: lerp(prev.time, curr.time, t),
                });
            }
            total += segment_length;
        }
        None
    }

    /// The raw pair of points bracketing `distance`, without interpolating
    pub fn evaluate_no_interpolation(&self, distance: f64) -> Option<(&TrackPoint, &TrackPoint)> {
        if distance < 0.0 {
            return None;
        }
        let mut total = 0.0;
        for (prev, curr, segment_length) in self.segments() {
            if total + segment_length >= distance {
                return Some((prev, curr));
            }
            total += segment_length;
        }
        None
    }

    /// Picks raw points roughly every `interval` meters.
    ///
    /// A point is taken once the distance accumulated since the last taken
    /// point reaches `interval`, so spacing is never below `interval` and
    /// depends on where the raw points fall. With `include_endpoints` the
    /// first and last raw points are always present (never twice).
    pub fn interval_points(&self, interval: f64, include_endpoints: bool) -> Vec<IntervalPoint> {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return vec![];
        };
        let mut out = vec![];
        if include_endpoints {
            out.push(IntervalPoint {
                point: *first,
                dist: 0.0,
            });
        }

        let mut interval_accum = 0.0;
        let mut dist_accum = 0.0;
        let mut last_taken = 0;
        for (i, (_, curr, segment_length)) in self.segments().enumerate() {
            interval_accum += segment_length;
            dist_accum += segment_length;
            if interval_accum + INTERVAL_TOL >= interval {
                interval_accum = 0.0;
                last_taken = i + 1;
                out.push(IntervalPoint {
                    point: *curr,
                    dist: dist_accum,
                });
            }
        }

        if include_endpoints && last_taken != self.points.len() - 1 {
            out.push(IntervalPoint {
                point: *last,
                dist: dist_accum,
            });
        }
        out
    }

    /// Lowest and highest heartline y
    pub fn height_range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.pos.y).fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }

    /// Appends another spline's points after this one's
    pub fn extend(&mut self, other: TrackSpline) {
        self.points.extend(other.points);
    }
}

impl From<&persist::SplineData> for TrackSpline {
    fn from(data: &persist::SplineData) -> Self {
        Self::new(data.points.iter().map(TrackPoint::from).collect())
    }
}

impl From<&TrackSpline> for persist::SplineData {
    fn from(spline: &TrackSpline) -> Self {
        Self {
            points: spline.points.iter().map(Into::into).collect(),
        }
    }
}
