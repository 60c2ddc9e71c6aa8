mod geolocation;
mod loader;
mod report;

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;

use geolocation::FixedGeolocation;
use holitrack_engine::{
    CalendarStatus, Clock, ClockOverride, DEFAULT_MAP_ZOOM, DataLoader, FixedClock, GeoPoint,
    GeolocationProvider, HolidayConfig, HolidayMode, OverrideClock, StaticDataLoader,
    TrackerEngine, TrackerRuntime, TrackerSession, TrackerSnapshot, UtcOffset,
};
use loader::DirectoryDataLoader;
use report::TrackReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable colored output
    Console,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "holitrack", version)]
#[command(about = "Follow the Easter Bunny or Santa as the holiday sweeps across the time zones")]
struct Args {
    /// Holiday to track (easter, christmas); unknown names fall back to easter
    #[arg(long, default_value = "easter")]
    holiday: String,

    /// Custom holiday config JSON, used instead of --holiday
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding cities.json, landmass.json and holidays/*.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// List all cities and exit
    #[arg(long)]
    list_cities: bool,

    /// Print the arrival schedule for the active or next holiday and exit
    #[arg(long)]
    schedule: bool,

    /// Pretend the current instant is this time (RFC 3339 or YYYY-MM-DDTHH:MM:SS, UTC)
    #[arg(long)]
    mock_time: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD), keeping the real time of day
    #[arg(long)]
    mock_date: Option<String>,

    /// URL or query string carrying mock_time / mock_date parameters
    #[arg(long)]
    query: Option<String>,

    /// Map zoom level used to size the delivery hop
    #[arg(long, default_value_t = DEFAULT_MAP_ZOOM)]
    zoom: u8,

    /// Number of snapshots to record
    #[arg(long, default_value_t = 1)]
    ticks: usize,

    /// Replay instead of running live: advance a simulated clock this many minutes per tick
    #[arg(long)]
    step_minutes: Option<i64>,

    /// Viewer latitude for the nearby check and arrival estimate
    #[arg(long, requires = "viewer_lon", allow_hyphen_values = true)]
    viewer_lat: Option<f64>,

    /// Viewer longitude for the nearby check and arrival estimate
    #[arg(long, requires = "viewer_lat", allow_hyphen_values = true)]
    viewer_lon: Option<f64>,

    /// Offset used for arrival labels, e.g. UTC+09:00
    #[arg(long, default_value = "UTC+00:00")]
    display_offset: String,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.ticks == 0 {
        bail!("--ticks must be at least 1");
    }

    let overrides = resolve_overrides(&args);
    let live_clock = OverrideClock::system(overrides);
    let replay_clock = args.step_minutes.map(|_| FixedClock::new(live_clock.now()));
    let clock: Arc<dyn Clock> = match &replay_clock {
        Some(clock) => Arc::new(clock.clone()),
        None => Arc::new(live_clock),
    };

    let mut session = match &args.data_dir {
        Some(dir) => build_session(&TrackerEngine::new(DirectoryDataLoader::new(dir)), &args, clock)?,
        None => build_session(&TrackerEngine::new(StaticDataLoader), &args, clock)?,
    };
    session.set_zoom(args.zoom);
    session.set_display_offset(UtcOffset::parse_or_utc(&args.display_offset));

    if args.list_cities {
        return list_cities(&args, &session);
    }
    if args.schedule {
        return print_schedule(&args, &mut session);
    }

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner(session.config());
    }

    let config = session.config().clone();
    let (snapshots, status) = match (replay_clock, args.step_minutes) {
        (Some(clock), Some(step)) => run_replay(session, &clock, &args, step),
        _ => run_live(session, &args).await?,
    };
    write_reports(&args, &config, &status, &snapshots)
}

fn resolve_overrides(args: &Args) -> ClockOverride {
    let explicit = ClockOverride {
        mock_time: args.mock_time.clone(),
        mock_date: args.mock_date.clone(),
    };
    let query = if explicit.is_empty() {
        args.query
            .as_deref()
            .map(ClockOverride::from_query)
            .unwrap_or_default()
    } else {
        explicit
    };
    ClockOverride::resolve(query, ClockOverride::from_env())
}

fn build_session<L: DataLoader>(
    engine: &TrackerEngine<L>,
    args: &Args,
    clock: Arc<dyn Clock>,
) -> Result<TrackerSession> {
    let session = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config = HolidayConfig::from_json(&raw)
                .with_context(|| format!("invalid holiday config {}", path.display()))?;
            engine.create_session_with_config(config, clock)
        }
        None => engine.create_session(HolidayMode::parse_lenient(&args.holiday), clock),
    };
    session.context("failed to create tracker session")
}

fn viewer_point(args: &Args) -> Option<GeoPoint> {
    Some(GeoPoint::new(args.viewer_lat?, args.viewer_lon?))
}

fn announce_banner(config: &HolidayConfig) {
    let emoji = config
        .delivery_items
        .first()
        .map_or("🎁", |item| item.emoji.as_str());
    println!(
        "{}",
        format!("{emoji} Holitrack: {}", config.character_name)
            .bright_cyan()
            .bold()
    );
    println!("{}", "================================".cyan());
}

fn list_cities(args: &Args, session: &TrackerSession) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => report::write_json(output_target.writer(), session.cities())?,
        ReportFormat::Console => report::write_city_list(output_target.writer(), session.cities())?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn print_schedule(args: &Args, session: &mut TrackerSession) -> Result<()> {
    let schedule = session
        .upcoming_schedule()
        .context("no upcoming holiday could be resolved")?;
    let display = UtcOffset::parse_or_utc(&args.display_offset);
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => report::write_json(output_target.writer(), &*schedule)?,
        ReportFormat::Console => {
            report::write_schedule(output_target.writer(), session.config(), &schedule, display)?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

/// Drive the session on the tokio runtime at the real tick cadence.
async fn run_live(
    session: TrackerSession,
    args: &Args,
) -> Result<(Vec<TrackerSnapshot>, CalendarStatus)> {
    let geolocation = viewer_point(args)
        .map(|point| Arc::new(FixedGeolocation::new(point)) as Arc<dyn GeolocationProvider>);
    let handle = TrackerRuntime::spawn(session, geolocation);
    let mut snapshots_rx = handle.subscribe();

    let mut snapshots = Vec::with_capacity(args.ticks);
    while snapshots.len() < args.ticks {
        snapshots_rx
            .changed()
            .await
            .context("tracker stopped publishing snapshots")?;
        if let Some(snapshot) = snapshots_rx.borrow_and_update().clone() {
            snapshots.push(snapshot);
        }
    }

    let status = handle.with_session(|session| session.status().clone());
    handle.shutdown().await;
    Ok((snapshots, status))
}

/// Step a simulated clock through the journey without waiting.
fn run_replay(
    mut session: TrackerSession,
    clock: &FixedClock,
    args: &Args,
    step_minutes: i64,
) -> (Vec<TrackerSnapshot>, CalendarStatus) {
    if let Some(point) = viewer_point(args) {
        session.set_viewer_location(point.latitude, point.longitude);
        session.refresh_calendar();
    }
    let step = TimeDelta::minutes(step_minutes).num_milliseconds();
    let mut snapshots = Vec::with_capacity(args.ticks);
    for _ in 0..args.ticks {
        snapshots.push(session.tick());
        clock.advance_millis(step);
        session.refresh_calendar();
    }
    (snapshots, session.status().clone())
}

fn write_reports(
    args: &Args,
    config: &HolidayConfig,
    status: &CalendarStatus,
    snapshots: &[TrackerSnapshot],
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let report = TrackReport {
        holiday: &config.id,
        character_name: &config.character_name,
        status,
        snapshots,
    };
    match args.report {
        ReportFormat::Json => report::write_json(&mut output_target, &report)?,
        ReportFormat::Console => report::write_console(&mut output_target, config, &report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
