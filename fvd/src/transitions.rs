//! Per-axis timelines of g-force and roll-rate transitions
//!
//! A [`Transitions`] holds three independent sequences of timed segments
//! (vertical g, lateral g, roll rate in deg/s). Each segment contributes a
//! shaped delta on top of everything before it, so the value of an axis at
//! time `t` is the starting baseline plus the end values of all completed
//! segments plus the partial value of the active one.

use crate::curve::{timewarp, Curve};

/// One timed, shaped segment on a single axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub curve: Curve,
    /// Signed magnitude of the change over the segment
    pub value: f64,
    /// Duration in seconds
    pub length: f64,
    pub tension: f64,
    pub center: f64,
    /// Length follows the other axes instead of being authored
    pub dynamic_length: bool,
}

impl Transition {
    pub fn new(curve: Curve, value: f64, length: f64) -> Self {
        Self {
            curve,
            value,
            length,
            tension: 0.0,
            center: 0.0,
            dynamic_length: false,
        }
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    pub fn with_center(mut self, center: f64) -> Self {
        self.center = center;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic_length = true;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Value contributed at `t` seconds into the segment
    pub fn eval(&self, t: f64) -> f64 {
        self.curve
            .eval(timewarp(t / self.length, self.center, self.tension))
            * self.value
    }

    /// Value contributed once the segment has run to completion
    pub fn full_delta(&self) -> f64 {
        self.curve.end_value() * self.value
    }
}

impl From<&persist::TransitionData> for Transition {
    fn from(t: &persist::TransitionData) -> Self {
        Self {
            curve: t.curve.into(),
            value: t.value,
            length: t.length,
            tension: t.tension,
            center: t.center.unwrap_or_default(),
            dynamic_length: t.dynamic_length,
        }
    }
}

impl From<&Transition> for persist::TransitionData {
    fn from(t: &Transition) -> Self {
        Self {
            curve: t.curve.into(),
            value: t.value,
            length: t.length,
            tension: t.tension,
            center: Some(t.center),
            dynamic_length: t.dynamic_length,
        }
    }
}

pub fn transitions_length(segments: &[Transition]) -> f64 {
    segments.iter().map(|t| t.length).sum()
}

/// Value of an axis at time `t`, offset by `start`.
///
/// `None` outside `[0, length)`. Segment boundaries are inclusive on both
/// sides, so a time shared by two segments resolves to the earlier one.
pub fn transitions_evaluate(segments: &[Transition], t: f64, start: f64) -> Option<f64> {
    if t < 0.0 || t >= transitions_length(segments) {
        return None;
    }
    let mut value = start;
    let mut time_accum = 0.0;
    for segment in segments {
        if time_accum <= t && t <= time_accum + segment.length {
            return Some(value + segment.eval(t - time_accum));
        }
        value += segment.full_delta();
        time_accum += segment.length;
    }
    None
}

/// The segment active at `t`, for hit-testing in editors
pub fn transitions_get_at_t(segments: &[Transition], t: f64) -> Option<&Transition> {
    if t < 0.0 || t >= transitions_length(segments) {
        return None;
    }
    let mut time_accum = 0.0;
    for segment in segments {
        if time_accum <= t && t <= time_accum + segment.length {
            return Some(segment);
        }
        time_accum += segment.length;
    }
    None
}

/// Vertical g, lateral g and roll rate (deg/s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forces {
    pub vert: f64,
    pub lat: f64,
    pub roll: f64,
}

impl Forces {
    pub const fn new(vert: f64, lat: f64, roll: f64) -> Self {
        Self { vert, lat, roll }
    }

    /// Level, unbanked flight: 1g down into the seat
    pub const NEUTRAL: Forces = Forces::new(1.0, 0.0, 0.0);
}

impl Default for Forces {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transitions {
    pub vert: Vec<Transition>,
    pub lat: Vec<Transition>,
    pub roll: Vec<Transition>,
}

impl Default for Transitions {
    fn default() -> Self {
        Self {
            vert: vec![Transition::new(Curve::Cubic, 0.0, 1.0)],
            lat: vec![Transition::new(Curve::Cubic, 0.0, 1.0).dynamic()],
            roll: vec![Transition::new(Curve::Plateau, 0.0, 1.0)],
        }
    }
}

impl Transitions {
    pub fn new(vert: Vec<Transition>, lat: Vec<Transition>, roll: Vec<Transition>) -> Self {
        Self { vert, lat, roll }
    }

    /// Summed durations of the vert, lat and roll axes
    pub fn axis_lengths(&self) -> [f64; 3] {
        [
            transitions_length(&self.vert),
            transitions_length(&self.lat),
            transitions_length(&self.roll),
        ]
    }

    /// Valid duration: the shortest axis wins and anything authored past it
    /// on the other axes is never evaluated.
    pub fn length(&self) -> f64 {
        let [vert, lat, roll] = self.axis_lengths();
        vert.min(lat).min(roll)
    }

    pub fn has_mismatched_lengths(&self) -> bool {
        const TOL: f64 = 1e-9;
        let [vert, lat, roll] = self.axis_lengths();
        (vert - lat).abs() > TOL || (vert - roll).abs() > TOL
    }

    /// Logs a warning if the axes end at different times
    pub fn lint(&self) {
        if self.has_mismatched_lengths() {
            let [vert, lat, roll] = self.axis_lengths();
            log::warn!(
                "transition axes end at different times (vert {vert:.3}s, lat {lat:.3}s, roll {roll:.3}s), only the first {:.3}s will be used",
                self.length()
            );
        }
    }

    /// Target forces at `t`, each axis offset by the matching baseline in
    /// `start`. `None` outside `[0, length)`.
    pub fn evaluate(&self, t: f64, start: &Forces) -> Option<Forces> {
        if t < 0.0 || t >= self.length() {
            return None;
        }
        Some(Forces {
            vert: transitions_evaluate(&self.vert, t, start.vert)?,
            lat: transitions_evaluate(&self.lat, t, start.lat)?,
            roll: transitions_evaluate(&self.roll, t, start.roll)?,
        })
    }

    /// Stretches the first dynamic segment of each axis so the axis ends
    /// with the shorter of the other two. Dynamic segments on the other
    /// axes count as unbounded, so two fully dynamic axes leave the third
    /// alone.
    pub fn update_dynamic_lengths(&mut self) {
        fn fixed_length(segments: &[Transition]) -> f64 {
            segments
                .iter()
                .map(|t| if t.dynamic_length { f64::INFINITY } else { t.length })
                .sum()
        }

        fn stretch_first_dynamic(segments: &mut [Transition], target: f64) {
            if !target.is_finite() {
                return;
            }
            if let Some(segment) = segments.iter_mut().find(|t| t.dynamic_length) {
                segment.length = target;
            }
        }

        let target = fixed_length(&self.roll).min(fixed_length(&self.lat));
        stretch_first_dynamic(&mut self.vert, target);

        let target = fixed_length(&self.roll).min(fixed_length(&self.vert));
        stretch_first_dynamic(&mut self.lat, target);

        let target = fixed_length(&self.lat).min(fixed_length(&self.vert));
        stretch_first_dynamic(&mut self.roll, target);
    }
}

impl From<&persist::TransitionsData> for Transitions {
    fn from(data: &persist::TransitionsData) -> Self {
        Self {
            vert: data.vert.iter().map(Transition::from).collect(),
            lat: data.lat.iter().map(Transition::from).collect(),
            roll: data.roll.iter().map(Transition::from).collect(),
        }
    }
}

impl From<&Transitions> for persist::TransitionsData {
    fn from(t: &Transitions) -> Self {
        Self {
            vert: t.vert.iter().map(Into::into).collect(),
            lat: t.lat.iter().map(Into::into).collect(),
            roll: t.roll.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segs() -> Vec<Transition> {
        vec![
            Transition::new(Curve::Linear, 2.0, 1.0),
            Transition::new(Curve::Cubic, -1.0, 2.0),
            Transition::new(Curve::QuarticBump, 3.0, 1.0),
        ]
    }

    #[test]
    fn length_is_additive() {
        let a = segs();
        let b = vec![Transition::new(Curve::Plateau, 1.0, 0.5)];
        let joined: Vec<_> = a.iter().chain(b.iter()).copied().collect();
        assert_relative_eq!(
            transitions_length(&joined),
            transitions_length(&a) + transitions_length(&b)
        );
        assert_eq!(transitions_length(&[]), 0.0);
    }

    #[test]
    fn evaluate_accumulates_completed_segments() {
        let s = segs();
        assert_relative_eq!(transitions_evaluate(&s, 0.0, 1.0).unwrap(), 1.0);
        assert_relative_eq!(transitions_evaluate(&s, 0.5, 1.0).unwrap(), 2.0);
        // shared boundary resolves to the first segment at its end
        assert_relative_eq!(transitions_evaluate(&s, 1.0, 1.0).unwrap(), 3.0);
        assert_relative_eq!(transitions_evaluate(&s, 2.0, 1.0).unwrap(), 2.5);
        // bump returns to where it started
        assert_relative_eq!(transitions_evaluate(&s, 3.5, 1.0).unwrap(), 5.0);
        assert_relative_eq!(
            transitions_evaluate(&s, 3.999_999, 1.0).unwrap(),
            2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn evaluate_out_of_domain() {
        let s = segs();
        assert_eq!(transitions_evaluate(&s, -0.1, 0.0), None);
        assert_eq!(transitions_evaluate(&s, 4.0, 0.0), None);
        assert_eq!(transitions_evaluate(&[], 0.0, 0.0), None);
    }

    #[test]
    fn get_at_t_finds_segment() {
        let s = segs();
        assert_eq!(transitions_get_at_t(&s, 0.2), Some(&s[0]));
        assert_eq!(transitions_get_at_t(&s, 1.5), Some(&s[1]));
        assert_eq!(transitions_get_at_t(&s, 3.2), Some(&s[2]));
        assert_eq!(transitions_get_at_t(&s, 9.0), None);
    }

    #[test]
    fn shortest_axis_bounds_length() {
        let t = Transitions::new(
            vec![Transition::new(Curve::Plateau, 0.0, 1.0)],
            vec![Transition::new(Curve::Linear, 0.0, 30.0)],
            vec![Transition::new(Curve::Plateau, 0.0, 1.0)],
        );
        assert_eq!(t.length(), 1.0);
        assert!(t.has_mismatched_lengths());
        assert!(t.evaluate(0.99, &Forces::NEUTRAL).is_some());
        assert!(t.evaluate(1.0, &Forces::NEUTRAL).is_none());
        assert!(t.evaluate(-0.01, &Forces::NEUTRAL).is_none());
        assert!(!Transitions::default().has_mismatched_lengths());
    }

    #[test]
    fn evaluate_uses_per_axis_baseline() {
        let t = Transitions::new(
            vec![Transition::new(Curve::Linear, 1.0, 2.0)],
            vec![Transition::new(Curve::Linear, -0.5, 2.0)],
            vec![Transition::new(Curve::Linear, 90.0, 2.0)],
        );
        let f = t.evaluate(1.0, &Forces::new(1.0, 0.25, 10.0)).unwrap();
        assert_relative_eq!(f.vert, 1.5);
        assert_relative_eq!(f.lat, 0.0);
        assert_relative_eq!(f.roll, 55.0);
    }

    #[test]
    fn timewarped_segment() {
        let t = Transition::new(Curve::Linear, 4.0, 2.0).with_center(2.0);
        // center 2 squares the normalized time
        assert_relative_eq!(t.eval(1.0), 1.0);
        assert_relative_eq!(t.full_delta(), 4.0);
    }

    #[test]
    fn dynamic_lengths_follow_other_axes() {
        let mut t = Transitions::new(
            vec![
                Transition::new(Curve::Cubic, 1.0, 2.0),
                Transition::new(Curve::Cubic, -1.0, 1.5),
            ],
            vec![Transition::new(Curve::Cubic, 0.0, 1.0).dynamic()],
            vec![
                Transition::new(Curve::Plateau, 0.0, 1.0),
                Transition::new(Curve::Plateau, 0.0, 9.0).dynamic(),
            ],
        );
        t.update_dynamic_lengths();
        // vert has no dynamic segment and is untouched
        assert_eq!(t.vert[1].length, 1.5);
        // lat follows vert (roll is unbounded because of its dynamic segment)
        assert_eq!(t.lat[0].length, 3.5);
        // roll's dynamic segment: lat is dynamic too, so vert wins
        assert_eq!(t.roll[1].length, 3.5);
        assert_eq!(t.roll[0].length, 1.0);
    }

    #[test]
    fn dynamic_lengths_leave_unbounded_alone() {
        let mut t = Transitions::default();
        t.vert[0].dynamic_length = true;
        t.roll[0].dynamic_length = true;
        t.lat[0].length = 4.0;
        t.update_dynamic_lengths();
        // every axis is dynamic, there is nothing to follow
        assert_eq!(t.vert[0].length, 1.0);
        assert_eq!(t.lat[0].length, 4.0);
        assert_eq!(t.roll[0].length, 1.0);
    }
}
