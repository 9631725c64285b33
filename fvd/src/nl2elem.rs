//! NL2Elem export
//!
//! NoLimits 2 imports a heartline as a flat list of `<vertex>` control
//! points followed by `<roll>` frames placed at a normalized arc length
//! (`coord`). Positions and frames are written fixed-point with six
//! decimals. `coord` is written in full precision exponent form so that
//! closely spaced frames near the end of a long track stay distinct.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::linalg::{RIGHT, UP};
use crate::spline::TrackSpline;

/// Default spacing (m) between exported points
pub const EXPORT_INTERVAL: f64 = 1.0;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;
const DESCRIPTION: &str = "fvd exported spline";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename = "root")]
pub struct Document {
    pub element: Element,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Element {
    pub description: String,
    #[serde(default)]
    pub vertex: Vec<Vertex>,
    #[serde(default)]
    pub roll: Vec<Roll>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vertex {
    pub x: String,
    pub y: String,
    pub z: String,
    pub strict: bool,
}

/// Banking frame: the local up and right axes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Roll {
    pub ux: String,
    pub uy: String,
    pub uz: String,
    pub rx: String,
    pub ry: String,
    pub rz: String,
    pub coord: String,
}

fn fixed(v: f64) -> String {
    format!("{v:.6}")
}

fn exact(v: f64) -> String {
    format!("{v:e}")
}

impl Document {
    /// Resamples `spline` every `interval` meters, keeping both ends
    pub fn from_spline(spline: &TrackSpline, interval: f64) -> Self {
        let points = spline.interval_points(interval, true);
        let last = points.len().saturating_sub(1);

        let vertex = points
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                x: fixed(p.point.pos.x),
                y: fixed(p.point.pos.y),
                z: fixed(p.point.pos.z),
                strict: i == 0 || i == last,
            })
            .collect();

        let total: f64 = points
            .windows(2)
            .map(|w| (w[1].point.pos - w[0].point.pos).magnitude())
            .sum();
        let mut current = 0.0;
        let roll = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i > 0 {
                    current += (p.point.pos - points[i - 1].point.pos).magnitude();
                }
                let coord = if total <= 0.0 {
                    0.0
                } else if i == last {
                    1.0
                } else {
                    current / total
                };
                let up = p.point.rot.rotate(&UP);
                let right = p.point.rot.rotate(&RIGHT);
                Roll {
                    ux: fixed(up.x),
                    uy: fixed(up.y),
                    uz: fixed(up.z),
                    rx: fixed(right.x),
                    ry: fixed(right.y),
                    rz: fixed(right.z),
                    coord: exact(coord),
                }
            })
            .collect();

        Self {
            element: Element {
                description: DESCRIPTION.to_string(),
                vertex,
                roll,
            },
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        let body = quick_xml::se::to_string(self)?;
        Ok(format!("{XML_DECL}{body}"))
    }
}

impl TrackSpline {
    /// NL2Elem document sampled every [`EXPORT_INTERVAL`] meters
    pub fn export_to_nl2elem(&self) -> Result<String> {
        self.export_to_nl2elem_with_interval(EXPORT_INTERVAL)
    }

    pub fn export_to_nl2elem_with_interval(&self, interval: f64) -> Result<String> {
        if !(interval > 0.0 && interval.is_finite()) {
            return Err(TrackError::InvalidInterval(interval));
        }
        Document::from_spline(self, interval).to_xml()
    }
}
