use approx::assert_relative_eq;
use fvd::{nl2elem::Document, Track, TrackError, TrackSection, TrackStats};

/// Written before transitions had a `center`
const LEGACY_TRACK: &str = r#"{
    "sections": [
        { "type": "straight", "length": 12, "fixedSpeed": 6 },
        {
            "type": "force",
            "transitions": {
                "vert": [
                    { "curve": "cubic", "value": -0.5, "length": 1, "tension": 0, "dynamicLength": false },
                    { "curve": "cubic", "value": 0.5, "length": 1, "tension": 0, "dynamicLength": false }
                ],
                "lat": [
                    { "curve": "cubic", "value": 0, "length": 2, "tension": 0, "dynamicLength": true }
                ],
                "roll": [
                    { "curve": "plateau", "value": 40, "length": 1, "tension": 0.5, "dynamicLength": false },
                    { "curve": "plateau", "value": -40, "length": 1, "tension": 0, "dynamicLength": false }
                ]
            }
        },
        { "type": "curved", "radius": 30, "direction": 90, "angle": 60 }
    ],
    "config": { "parameter": 0.027, "resistance": 0.00001, "heartlineHeight": 1.1 },
    "anchor": { "pos": [0, 5, 0], "rot": [1, 0, 0, 0], "velocity": 12, "time": 0 }
}"#;

#[test]
fn legacy_file_builds_and_exports() {
    let track = Track::from_json(LEGACY_TRACK).unwrap();
    assert_eq!(track.sections.len(), 3);
    let TrackSection::Force { transitions, .. } = &track.sections[1] else {
        panic!("second section should be a force section");
    };
    assert!(transitions.vert.iter().all(|t| t.center == 0.0));
    assert_eq!(transitions.roll[0].tension, 0.5);

    let build = track.get_spline().unwrap();
    assert_eq!(build.section_start_pos.len(), 4);
    // straight in 0.01 m steps, 2 s of force section in 1 ms steps, 200 curve steps
    assert_eq!(build.spline.len(), 1200 + 2000 + 200);

    let stats = TrackStats::from_spline(&build.spline);
    assert_relative_eq!(stats.length(), build.spline.get_length());
    assert!(stats.top_speed() >= 6.0);

    let xml = build.spline.export_to_nl2elem_with_interval(2.0).unwrap();
    let doc: Document = quick_xml::de::from_str(&xml).unwrap();
    let vertices = &doc.element.vertex;
    assert_eq!(vertices.len(), doc.element.roll.len());
    assert!(vertices.len() > 10);
    assert!(vertices[0].strict && vertices[vertices.len() - 1].strict);
    assert_eq!(vertices.iter().filter(|v| v.strict).count(), 2);
    assert_eq!(doc.element.roll[0].coord, "0e0");
    assert_eq!(doc.element.roll[vertices.len() - 1].coord, "1e0");
}

#[test]
fn saved_file_is_current_version_and_reloads() {
    let track = Track::from_json(LEGACY_TRACK).unwrap();
    let json = track.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"], 2);
    assert_eq!(value["sections"][1]["transitions"]["vert"][0]["center"], 0.0);
    assert_eq!(Track::from_json(&json).unwrap(), track);
}

#[test]
fn file_without_config_needs_fixed_speeds() {
    let without_config = LEGACY_TRACK.replace(
        r#""config": { "parameter": 0.027, "resistance": 0.00001, "heartlineHeight": 1.1 },"#,
        "",
    );
    assert!(matches!(
        Track::from_json(&without_config),
        Err(TrackError::MissingFriction { section: 1 })
    ));
}

#[test]
fn rejects_unknown_section() {
    let bad = LEGACY_TRACK.replace(r#""type": "curved""#, r#""type": "spiral""#);
    assert!(matches!(Track::from_json(&bad), Err(TrackError::Persist(_))));
}
