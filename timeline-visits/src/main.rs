mod algo;
mod model;
mod report;
mod timeline;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{bail, WrapErr};
use geo_types::Point;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use regex::Regex;
use uom::si::length::meter;

use crate::algo::SphericalDistance;
use crate::model::{RunStats, TimeInterval, VisitMatch};
use crate::timeline::{Extraction, TimelineFile, TimelineRecord};

/// Reports every interval of a Google Maps Timeline export spent within a
/// given radius of a reference point.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Latitude of the reference location in decimal degrees
    #[clap(allow_hyphen_values = true)]
    latitude: f64,
    /// Longitude of the reference location in decimal degrees
    #[clap(allow_hyphen_values = true)]
    longitude: f64,
    /// Search circle radius in meters
    radius: f64,
    /// Directory containing the timeline export files
    #[clap(default_value = "GMapsJSONFiles")]
    export_dir: PathBuf,
}

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let args = Args::parse();
    validate(&args)?;
    let reference = Point::new(args.longitude, args.latitude);

    let files = export_files(&args.export_dir)?;
    let progress = scan_progress(files.len() as u64);

    let mut matches = Vec::new();
    let mut stats = RunStats::default();
    for path in &files {
        match scan_file(path, &reference, args.radius) {
            Ok((file_matches, file_stats)) => {
                matches.extend(file_matches);
                stats.absorb(file_stats);
            }
            // one unreadable file must not end the run
            Err(e) => warn!("skipping {}: {:#}", path.display(), e),
        }
        progress.inc(1);
    }
    progress.finish();

    let matches = report::chronological(matches)?;
    for line in report::render(&matches) {
        println!("{}", line);
    }

    debug!(
        "malformed record ratio (inspect if > 1%): {}",
        stats.malformed_ratio()
    );
    Ok(())
}

fn validate(args: &Args) -> eyre::Result<()> {
    if !(-90.0..=90.0).contains(&args.latitude) {
        bail!("latitude accepted range is [-90, 90]");
    }
    if !(-180.0..=180.0).contains(&args.longitude) {
        bail!("longitude accepted range is [-180, 180]");
    }
    if args.radius <= 0.0 || args.radius >= 100_000.0 {
        bail!("radius accepted range is (0, 100000) meters");
    }
    Ok(())
}

/// Export files are named `<year>_<MONTH>.json`; anything else in the
/// directory is ignored. The list is sorted by name to keep runs
/// deterministic.
fn export_files(dir: &Path) -> eyre::Result<Vec<PathBuf>> {
    let name_filter = Regex::new(
        r"^[0-9]{4}_(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)?\.json$",
    )?;
    let mut files = Vec::new();
    for entry in
        std::fs::read_dir(dir).wrap_err_with(|| format!("reading {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && name_filter.is_match(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn scan_progress(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("█▓░"),
    );
    progress.set_message("Working on it...");
    progress
}

/// Scans one export file. A file that cannot be opened or decoded surfaces
/// as `Err` and contributes nothing to the statistics; per-record problems
/// only move the counters.
fn scan_file(
    path: &Path,
    reference: &Point<f64>,
    radius: f64,
) -> eyre::Result<(Vec<VisitMatch>, RunStats)> {
    let file: TimelineFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;

    let mut matches = Vec::new();
    let mut stats = RunStats::default();
    for object in file.timeline_objects {
        stats.attempted += 1;
        let (coordinates, interval) = match TimelineRecord::from(object).extract() {
            Extraction::Matched {
                coordinates,
                interval,
            } => (coordinates, interval),
            Extraction::Dropped => continue,
            Extraction::Malformed => {
                stats.malformed += 1;
                continue;
            }
        };

        let mut within_radius = Vec::new();
        for coordinate in coordinates {
            let distance = reference.spherical_distance(&coordinate.to_point());
            let meters = distance.get::<meter>().trunc() as u64;
            if meters as f64 <= radius {
                within_radius.push(meters);
            }
        }
        if within_radius.is_empty() {
            continue;
        }
        match interval {
            TimeInterval::Known { .. } => {
                matches.extend(within_radius.into_iter().map(|distance_m| VisitMatch {
                    distance_m,
                    interval: interval.clone(),
                }));
            }
            // the record matched but has nothing to report an interval with;
            // counts like any other missing required field
            TimeInterval::Unknown => stats.malformed += 1,
        }
    }
    Ok((matches, stats))
}
