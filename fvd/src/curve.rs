//! Transition curve shapes and the timewarp applied before evaluating them

use std::f64::consts::PI;

/// Easing shape of a transition. Every curve maps normalized time in
/// `[0, 1]` to a normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    Linear,
    Quadratic,
    Cubic,
    /// Fast rise, long hold, fast fall back to zero
    Plateau,
    Sinusoidal,
    /// Symmetric bump, zero at both ends
    QuarticBump,
}

impl Curve {
    pub const ALL: [Curve; 6] = [
        Curve::Linear,
        Curve::Quadratic,
        Curve::Cubic,
        Curve::Plateau,
        Curve::Sinusoidal,
        Curve::QuarticBump,
    ];

    /// Evaluates the shape at `t`, clamped to `[0, 1]`
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::Cubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Curve::Quadratic => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Curve::Plateau => 1.0 - (-15.0 * (1.0 - (2.0 * t - 1.0).abs()).powi(3)).exp(),
            Curve::Sinusoidal => 0.5 * (1.0 - (PI * t).cos()),
            Curve::QuarticBump => t * t * (16.0 + t * (-32.0 + t * 16.0)),
        }
    }

    /// Value at the end of a segment, which is what a completed segment
    /// contributes to everything after it
    pub fn end_value(&self) -> f64 {
        self.eval(1.0)
    }
}

impl From<persist::CurveData> for Curve {
    fn from(c: persist::CurveData) -> Self {
        match c {
            persist::CurveData::Linear => Curve::Linear,
            persist::CurveData::Quadratic => Curve::Quadratic,
            persist::CurveData::Cubic => Curve::Cubic,
            persist::CurveData::Plateau => Curve::Plateau,
            persist::CurveData::Sinusoidal => Curve::Sinusoidal,
            persist::CurveData::QuarticBump => Curve::QuarticBump,
        }
    }
}

impl From<Curve> for persist::CurveData {
    fn from(c: Curve) -> Self {
        match c {
            Curve::Linear => persist::CurveData::Linear,
            Curve::Quadratic => persist::CurveData::Quadratic,
            Curve::Cubic => persist::CurveData::Cubic,
            Curve::Plateau => persist::CurveData::Plateau,
            Curve::Sinusoidal => persist::CurveData::Sinusoidal,
            Curve::QuarticBump => persist::CurveData::QuarticBump,
        }
    }
}

/// Below this magnitude `center` and `tension` leave time untouched
const WARP_DEADZONE: f64 = 0.01;

/// Reparametrizes normalized time: `center` skews it toward either end,
/// then `tension` compresses (positive) or stretches (negative) it around
/// the midpoint.
pub fn timewarp(t: f64, center: f64, tension: f64) -> f64 {
    warp_tension(warp_center(t, center), tension)
}

fn warp_center(t: f64, center: f64) -> f64 {
    if center.abs() < WARP_DEADZONE {
        t
    } else if center > 0.0 {
        t.powf(2f64.powf(center / 2.0))
    } else {
        1.0 - (1.0 - t).powf(2f64.powf(-center / 2.0))
    }
}

fn warp_tension(t: f64, tension: f64) -> f64 {
    if tension.abs() < WARP_DEADZONE {
        t
    } else if tension > 0.0 {
        0.5 * ((2.0 * tension * (t - 0.5)).sinh() / tension.sinh() + 1.0)
    } else {
        0.5 * ((2.0 * tension.sinh() * (t - 0.5)).asinh() / tension + 1.0)
    }
}
