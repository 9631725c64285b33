use std::path::Path;

use anyhow::Context;
use fvd::{
    Curve, Track, TrackConfig, TrackPoint, TrackSection, TrackSpline, Transition, Transitions,
    UnitSystem,
};
use plotters::prelude::*;

/// Station, lift, drop, turnaround, airtime hill and brake run
pub fn sample_track() -> Track {
    let anchor = TrackPoint::new(
        fvd::linalg::Vec3::new(0.0, 10.0, 0.0),
        fvd::linalg::Quat::IDENTITY,
        10.0,
        0.0,
    );
    let drop = Transitions::new(
        vec![
            Transition::new(Curve::Cubic, -1.0, 1.0),
            Transition::new(Curve::Linear, 0.0, 1.5),
            Transition::new(Curve::Cubic, 3.0, 1.5).with_tension(1.0),
            Transition::new(Curve::Cubic, -2.0, 1.0),
        ],
        vec![Transition::new(Curve::Cubic, 0.0, 5.0).dynamic()],
        vec![Transition::new(Curve::Plateau, 0.0, 5.0)],
    );
    let airtime = Transitions::new(
        vec![
            Transition::new(Curve::Cubic, -1.0, 0.8),
            Transition::new(Curve::Linear, 0.0, 0.6),
            Transition::new(Curve::Cubic, 1.0, 0.8).with_center(-0.5),
        ],
        vec![Transition::new(Curve::Cubic, 0.0, 2.2)],
        vec![
            Transition::new(Curve::Plateau, 45.0, 1.1),
            Transition::new(Curve::Plateau, -45.0, 1.1),
        ],
    );

    Track::new(anchor, Some(TrackConfig::default()))
        .with_section(TrackSection::Straight {
            length: 20.0,
            fixed_speed: Some(5.0),
        })
        .with_section(TrackSection::Curved {
            fixed_speed: Some(4.0),
            radius: 20.0,
            direction: 0.0,
            angle: 30.0,
        })
        .with_section(TrackSection::Straight {
            length: 40.0,
            fixed_speed: Some(4.0),
        })
        .with_section(TrackSection::Curved {
            fixed_speed: Some(4.0),
            radius: 20.0,
            direction: 180.0,
            angle: 30.0,
        })
        .with_section(TrackSection::Force {
            fixed_speed: None,
            transitions: drop,
        })
        .with_section(TrackSection::Curved {
            fixed_speed: None,
            radius: 25.0,
            direction: 90.0,
            angle: 180.0,
        })
        .with_section(TrackSection::Force {
            fixed_speed: None,
            transitions: airtime,
        })
        .with_section(TrackSection::Straight {
            length: 30.0,
            fixed_speed: None,
        })
}

/// Arc length at every point, starting from 0 at the first
pub fn distances(spline: &TrackSpline) -> Vec<f64> {
    let mut total = 0.0;
    let mut out = Vec::with_capacity(spline.len());
    for (i, p) in spline.points.iter().enumerate() {
        if i > 0 {
            total += (p.pos - spline.points[i - 1].pos).magnitude();
        }
        out.push(total);
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Draws speed and height against distance, one above the other
pub fn plot_profile(spline: &TrackSpline, units: UnitSystem, path: &Path) -> anyhow::Result<()> {
    let dist: Vec<f64> = distances(spline)
        .into_iter()
        .map(|d| units.meters_to_unit(d))
        .collect();
    let speed: Vec<f64> = spline
        .points
        .iter()
        .map(|p| units.mps_to_unit(p.velocity))
        .collect();
    let height: Vec<f64> = spline
        .points
        .iter()
        .map(|p| units.meters_to_unit(p.pos.y))
        .collect();
    let max_dist = dist.last().copied().unwrap_or(0.0).max(1.0);

    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(384);

    for (area, name, unit, data, color) in [
        (&upper, "speed", units.velocity_unit(), &speed, &RED),
        (&lower, "height", units.distance_unit(), &height, &BLUE),
    ] {
        let (lo, hi) = range(data.iter().copied());
        let (lo, hi) = if lo > hi { (0.0, 1.0) } else { (lo.min(0.0), hi.max(lo + 1.0)) };
        let mut chart = ChartBuilder::on(area)
            .caption(format!("{name} ({unit})"), ("sans-serif", 24))
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..max_dist, lo..hi)?;
        chart.configure_mesh().draw()?;
        chart.draw_series(LineSeries::new(
            dist.iter().copied().zip(data.iter().copied()),
            color,
        ))?;
    }

    root.present()
        .with_context(|| format!("failed to write plot {}", path.display()))?;
    Ok(())
}
