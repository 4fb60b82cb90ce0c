//! Sky Information Tool
//!
//! Prints where the Sun, Moon and planets are for an observer, when they next
//! rise and set, and how bright they are.
//!
//! Usage:
//!   cargo run --bin sky_info -- --lat 51.48 --lon 0.0 [--time 2010-12-25T12:00:00Z] [--json]

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};
use flexi_logger::Logger;
use log::{debug, info};
use serde::Serialize;
use skyframe::almanac::{next_rise_set, RiseSetIndicator, RiseSetOutcome};
use skyframe::planetlib::phase::{magnitude, percent_illuminated};
use skyframe::positions::position_of;
use skyframe::time::{mean_sidereal_time, FixedClock};
use skyframe::{AstronomerModel, Body, LatLong, ModelConfig, RaDec};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Sky Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Shows positions, rise/set times and magnitudes of solar system bodies",
    long_about = None
)]
struct Args {
    /// Observer latitude in degrees, north positive
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lat: f64,

    /// Observer longitude in degrees, east positive
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lon: f64,

    /// Instant to report on (RFC 3339), defaults to now
    #[arg(short, long)]
    time: Option<String>,

    /// Only report these bodies (repeatable)
    #[arg(short, long = "body")]
    bodies: Vec<Body>,

    /// Print JSON instead of a table
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Observer model configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum EventReport {
    At { time: String },
    NoEvent { reason: String },
    Failed,
}

impl From<RiseSetOutcome> for EventReport {
    fn from(outcome: RiseSetOutcome) -> Self {
        match outcome {
            RiseSetOutcome::Converged(t) => EventReport::At {
                time: t.to_rfc3339(),
            },
            RiseSetOutcome::NoEventInRange(class) => EventReport::NoEvent {
                reason: class.to_string(),
            },
            RiseSetOutcome::FailedToConverge => EventReport::Failed,
        }
    }
}

impl std::fmt::Display for EventReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventReport::At { time } => f.write_str(time),
            EventReport::NoEvent { reason } => f.write_str(reason),
            EventReport::Failed => f.write_str("-"),
        }
    }
}

#[derive(Debug, Serialize)]
struct BodyReport {
    name: &'static str,
    position: RaDec,
    rise: EventReport,
    set: EventReport,
    magnitude: f64,
    illuminated_percent: f64,
}

#[derive(Debug, Serialize)]
struct SkyReport {
    time: String,
    location: LatLong,
    local_sidereal_time: f64,
    zenith: RaDec,
    magnetic_declination: f64,
    field_of_view: f64,
    bodies: Vec<BodyReport>,
}

fn body_report(
    body: Body,
    time: &DateTime<Utc>,
    location: &LatLong,
) -> skyframe::Result<BodyReport> {
    Ok(BodyReport {
        name: body.name(),
        position: position_of(body, time)?,
        rise: next_rise_set(body, time, location, RiseSetIndicator::Rise).into(),
        set: next_rise_set(body, time, location, RiseSetIndicator::Set).into(),
        magnitude: magnitude(body, time)?,
        illuminated_percent: percent_illuminated(body, time)?,
    })
}

fn build_report(args: &Args, time: DateTime<Utc>) -> Result<SkyReport> {
    let config = match &args.config {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::default(),
    };
    let location = LatLong::new(args.lat, args.lon);

    let mut model = AstronomerModel::with_clock(config, FixedClock::new(time.timestamp_millis()));
    model.set_location(location);
    let zenith = RaDec::from_geocentric(&model.zenith());

    let bodies: Vec<Body> = if args.bodies.is_empty() {
        Body::visible().collect()
    } else {
        args.bodies.clone()
    };

    let mut reports = Vec::with_capacity(bodies.len());
    for body in bodies {
        debug!("Computing {}", body);
        reports.push(body_report(body, &time, &location)?);
    }

    Ok(SkyReport {
        time: time.to_rfc3339(),
        location,
        local_sidereal_time: mean_sidereal_time(&time, location.longitude()),
        zenith,
        magnetic_declination: model.magnetic_correction(),
        field_of_view: model.field_of_view(),
        bodies: reports,
    })
}

fn print_table(report: &SkyReport) {
    println!("Time:      {}", report.time);
    println!("Location:  {}", report.location);
    println!("LST:       {:.4}°", report.local_sidereal_time);
    println!("Zenith:    {}", report.zenith);
    println!("Mag. decl: {:+.2}°", report.magnetic_declination);
    println!();
    println!(
        "{:<8} {:>9} {:>9} {:>27} {:>27} {:>7} {:>6}",
        "Body", "RA", "Dec", "Rise", "Set", "Mag", "Lit%"
    );
    println!("{}", "-".repeat(100));
    for b in &report.bodies {
        println!(
            "{:<8} {:>9.3} {:>+9.3} {:>27} {:>27} {:>7.2} {:>6.1}",
            b.name,
            b.position.ra,
            b.position.dec,
            b.rise.to_string(),
            b.set.to_string(),
            b.magnitude,
            b.illuminated_percent
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let _logger = Logger::try_with_env_or_str(level)?.log_to_stderr().start()?;

    let time = match &args.time {
        Some(s) => DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc),
        None => Utc::now(),
    };
    info!("Sky report for ({}, {}) at {}", args.lat, args.lon, time);

    let report = build_report(&args, time)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}
