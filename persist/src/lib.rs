//! Track file schema
//!
//! Plain serde types mirroring the track JSON written by the editor. Files
//! are versioned: version 1 files predate the `center` field on transitions,
//! version 2 files must carry it. [`load_track`] always hands back a value
//! migrated to [`CURRENT_VERSION`].

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 2;

/// Files written before the `version` field existed
const LEGACY_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    LEGACY_VERSION
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed track json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported track file version {0} (newest known is {CURRENT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("version {version} files require `{field}` ({location})")]
    MissingField {
        version: u32,
        field: &'static str,
        location: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CurveData {
    Linear,
    Quadratic,
    Cubic,
    Plateau,
    Sinusoidal,
    QuarticBump,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TransitionData {
    pub curve: CurveData,
    pub value: f64,
    pub length: f64,
    pub tension: f64,
    /// Absent in version 1 files, filled in by [`TrackData::migrate`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<f64>,
    pub dynamic_length: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransitionsData {
    pub vert: Vec<TransitionData>,
    pub lat: Vec<TransitionData>,
    pub roll: Vec<TransitionData>,
}

impl TransitionsData {
    fn axes_mut(&mut self) -> [(&'static str, &mut Vec<TransitionData>); 3] {
        [
            ("vert", &mut self.vert),
            ("lat", &mut self.lat),
            ("roll", &mut self.roll),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum SectionData {
    #[serde(rename_all = "camelCase")]
    Straight {
        length: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_speed: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Force {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_speed: Option<f64>,
        transitions: TransitionsData,
    },
    #[serde(rename_all = "camelCase")]
    Curved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_speed: Option<f64>,
        radius: f64,
        /// Bank direction in degrees
        direction: f64,
        /// Sweep angle in degrees
        angle: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigData {
    pub parameter: f64,
    pub resistance: f64,
    pub heartline_height: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointData {
    pub pos: [f64; 3],
    /// w, x, y, z
    pub rot: [f64; 4],
    pub velocity: f64,
    pub time: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrackData {
    #[serde(default = "legacy_version")]
    pub version: u32,
    pub sections: Vec<SectionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigData>,
    pub anchor: PointData,
}

impl TrackData {
    /// Brings a freshly parsed file up to [`CURRENT_VERSION`]
    pub fn migrate(mut self) -> Result<Self, PersistError> {
        if self.version == 0 || self.version > CURRENT_VERSION {
            return Err(PersistError::UnsupportedVersion(self.version));
        }
        let version = self.version;
        for (i, section) in self.sections.iter_mut().enumerate() {
            let SectionData::Force { transitions, .. } = section else {
                continue;
            };
            for (axis, segments) in transitions.axes_mut() {
                for (j, segment) in segments.iter_mut().enumerate() {
                    if segment.center.is_some() {
                        continue;
                    }
                    if version >= 2 {
                        return Err(PersistError::MissingField {
                            version,
                            field: "center",
                            location: format!("section {i}, {axis} transition {j}"),
                        });
                    }
                    segment.center = Some(0.0);
                }
            }
        }
        self.version = CURRENT_VERSION;
        Ok(self)
    }
}

/// Computed spline points, as dumped by the testbed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SplineData {
    pub points: Vec<PointData>,
}

/// Parses and migrates a track file
pub fn load_track(json: &str) -> Result<TrackData, PersistError> {
    serde_json::from_str::<TrackData>(json)?.migrate()
}

/// Serializes a track at the current schema version
pub fn save_track(data: &TrackData) -> Result<String, PersistError> {
    let mut data = data.clone();
    data.version = CURRENT_VERSION;
    Ok(serde_json::to_string_pretty(&data)?)
}
