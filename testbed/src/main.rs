use std::{fs, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use fvd::{nl2elem::EXPORT_INTERVAL, Track, TrackStats, UnitSystem};

#[derive(Debug, clap::Parser)]
#[command(about = "Builds an FVD track, prints its stats and writes exports")]
struct Args {
    /// Track json file, the built-in sample track when omitted
    track: Option<PathBuf>,
    /// Write an NL2Elem export here
    #[arg(short, long)]
    export: Option<PathBuf>,
    /// Spacing of exported points (m)
    #[arg(short, long, default_value_t = EXPORT_INTERVAL)]
    interval: f64,
    /// metric, metric-kph or imperial
    #[arg(short, long, default_value_t = UnitSystem::Metric)]
    units: UnitSystem,
    /// Dump every spline point as json
    #[arg(long)]
    dump_points: Option<PathBuf>,
    /// Plot speed and height against distance (png)
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Write the track back out at the current file version
    #[arg(long)]
    save: Option<PathBuf>,
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<Track> {
    let Some(path) = path else {
        log::info!("no track given, using the sample track");
        return Ok(testbed::sample_track());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Track::from_json(&json).with_context(|| format!("failed to load {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::debug!("{args:#?}");

    let track = load(args.track.as_ref())?;

    let start = Instant::now();
    let build = track.get_spline()?;
    log::info!(
        "built {} sections into {} points in {:.1} ms",
        track.sections.len(),
        build.spline.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let units = args.units;
    println!("{}", TrackStats::from_spline(&build.spline).describe(units));
    for (i, (section, pos)) in track
        .sections
        .iter()
        .zip(&build.section_start_pos)
        .enumerate()
    {
        println!(
            "  {i:>2} {:<8} starts at {:.1} {}",
            section.kind(),
            units.meters_to_unit(*pos),
            units.distance_unit()
        );
    }

    if let Some(path) = &args.export {
        let xml = build.spline.export_to_nl2elem_with_interval(args.interval)?;
        fs::write(path, xml).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote NL2Elem export to {}", path.display());
    }

    if let Some(path) = &args.dump_points {
        let json = serde_json::to_string(&persist::SplineData::from(&build.spline))?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("dumped {} points to {}", build.spline.len(), path.display());
    }

    if let Some(path) = &args.plot {
        testbed::plot_profile(&build.spline, units, path)?;
        log::info!("plotted profile to {}", path.display());
    }

    if let Some(path) = &args.save {
        fs::write(path, track.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("saved track to {}", path.display());
    }

    Ok(())
}
