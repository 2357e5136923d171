use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use timeline::{
    apply_script, ActionLog, EngineConfig, Frame, InteractionController, TickOutcome, Timecode,
    TimecodeFormat, Timeline, TimelineSnapshot, SNAPSHOT_VERSION,
};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "timeline-cli")]
#[command(about = "Headless timeline editing: inspect layouts, apply edit scripts, simulate playback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration (JSON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty timeline file
    New {
        /// Output file path
        output: PathBuf,

        #[arg(long, default_value = "30")]
        fps: f64,

        /// Declared project length in frames
        #[arg(long, default_value = "300")]
        total_frames: Frame,
    },

    /// Print the effective end frame, the dynamic rows and their tracks
    Inspect {
        /// Timeline file path
        project: PathBuf,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply a JSON edit script and write the resulting timeline
    Apply {
        /// Timeline file path
        project: PathBuf,

        /// Edit script: a JSON array of commands
        script: PathBuf,

        /// Output file path (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Simulate real-time playback at 60 Hz
    Play {
        /// Timeline file path
        project: PathBuf,

        /// How long to run, in seconds
        #[arg(long, default_value = "5")]
        seconds: f64,

        /// Playback rate
        #[arg(long, default_value = "1.0")]
        rate: f64,

        #[arg(long)]
        looping: bool,

        /// Start frame or HH:MM:SS:FF timecode (defaults to the saved playhead)
        #[arg(long)]
        from: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::New {
            output,
            fps,
            total_frames,
        } => new_command(output, fps, total_frames),
        Commands::Inspect { project, json } => inspect_command(config, project, json),
        Commands::Apply {
            project,
            script,
            output,
        } => apply_command(config, project, script, output),
        Commands::Play {
            project,
            seconds,
            rate,
            looping,
            from,
        } => play_command(config, project, seconds, rate, looping, from).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = EngineConfig::from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn load_timeline(config: EngineConfig, path: &Path) -> Result<Timeline> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading timeline {}", path.display()))?;
    let snapshot = TimelineSnapshot::from_json(&text)
        .with_context(|| format!("parsing timeline {}", path.display()))?;
    if snapshot.fps <= 0.0 {
        bail!("timeline {} has invalid fps {}", path.display(), snapshot.fps);
    }
    Ok(Timeline::from_snapshot(config, snapshot))
}

fn write_snapshot(timeline: &Timeline, output: Option<&Path>) -> Result<()> {
    let json = timeline.snapshot().to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Timeline written to: {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn new_command(output: PathBuf, fps: f64, total_frames: Frame) -> Result<()> {
    if fps <= 0.0 {
        bail!("fps must be positive, got {}", fps);
    }
    let snapshot = TimelineSnapshot {
        version: SNAPSHOT_VERSION,
        fps,
        total_frames: total_frames.max(0),
        current_frame: 0,
        zoom: 1.0,
        in_point: None,
        out_point: None,
        markers: Vec::new(),
        tracks: Vec::new(),
    };
    std::fs::write(&output, snapshot.to_json()?)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("Created timeline {:?} ({} frames @ {} fps)", output, total_frames, fps);
    Ok(())
}

#[derive(Serialize)]
struct TrackReport {
    id: String,
    name: String,
    start_frame: Frame,
    end_frame: Frame,
    locked: bool,
    linked_to: Option<String>,
}

#[derive(Serialize)]
struct RowReport {
    id: String,
    tracks: Vec<TrackReport>,
}

#[derive(Serialize)]
struct InspectReport {
    fps: f64,
    total_frames: Frame,
    effective_end_frame: Frame,
    duration: String,
    rows: Vec<RowReport>,
    markers: Vec<Frame>,
    inspected_at: String,
}

fn inspect_command(config: EngineConfig, project: PathBuf, json: bool) -> Result<()> {
    let timeline = load_timeline(config, &project)?;

    let rows = timeline
        .rows()
        .iter()
        .map(|row| {
            let mut tracks: Vec<_> = timeline
                .tracks()
                .iter()
                .filter(|t| t.row_key() == row.key())
                .collect();
            tracks.sort_by_key(|t| t.start_frame);
            RowReport {
                id: row.id(),
                tracks: tracks
                    .into_iter()
                    .map(|t| TrackReport {
                        id: t.id.to_string(),
                        name: t.name.clone(),
                        start_frame: t.start_frame,
                        end_frame: t.end_frame,
                        locked: t.locked,
                        linked_to: t.linked_partner().map(|p| p.to_string()),
                    })
                    .collect(),
            }
        })
        .collect();

    let report = InspectReport {
        fps: timeline.state().fps,
        total_frames: timeline.state().total_frames,
        effective_end_frame: timeline.effective_end_frame(),
        duration: Timecode::from_frame(
            timeline.effective_end_frame(),
            timeline.state().fps,
            TimecodeFormat::NonDropFrame,
        )
        .to_string(),
        rows,
        markers: timeline.markers().frames(),
        inspected_at: chrono::Utc::now().to_rfc3339(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} @ {} fps, effective end frame {} ({}, declared {})",
        project.display(),
        report.fps,
        report.effective_end_frame,
        report.duration,
        report.total_frames
    );
    for row in &report.rows {
        println!("  {}", row.id);
        if row.tracks.is_empty() {
            println!("    (empty)");
        }
        for track in &row.tracks {
            let mut flags = Vec::new();
            if track.locked {
                flags.push("locked".to_string());
            }
            if let Some(partner) = &track.linked_to {
                flags.push(format!("linked {}", partner));
            }
            println!(
                "    [{:>6}, {:>6})  {}  {}  {}",
                track.start_frame,
                track.end_frame,
                track.id,
                track.name,
                flags.join(", ")
            );
        }
    }
    if !report.markers.is_empty() {
        println!("  markers: {:?}", report.markers);
    }
    Ok(())
}

fn apply_command(
    config: EngineConfig,
    project: PathBuf,
    script: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let log = ActionLog::new();
    let mut timeline = load_timeline(config, &project)?.with_recorder(Box::new(log.clone()));
    let text = std::fs::read_to_string(&script)
        .with_context(|| format!("reading script {}", script.display()))?;

    let applied = apply_script(&mut timeline, &text, Instant::now())
        .with_context(|| format!("applying {}", script.display()))?;
    info!("Applied {} commands ({} history entries)", applied, log.len());
    for label in log.labels() {
        debug!(label = %label, "history");
    }

    write_snapshot(&timeline, output.as_deref())
}

async fn play_command(
    config: EngineConfig,
    project: PathBuf,
    seconds: f64,
    rate: f64,
    looping: bool,
    from: Option<String>,
) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("--seconds must be a non-negative number, got {}", seconds);
    }
    let mut timeline = load_timeline(config, &project)?;
    let mut controller = InteractionController::new(1280.0, 720.0);
    if let Some(from) = from {
        let frame = parse_start(&from, timeline.state().fps)?;
        timeline.set_current_frame(frame);
    }
    timeline.set_looping(looping);

    let start = Instant::now();
    timeline.set_playback_rate(rate, start);
    timeline.play(start);
    info!(
        "Playing from frame {} at {}x (end {}, looping {})",
        timeline.current_frame(),
        timeline.playback().playback_rate,
        timeline.effective_end_frame(),
        looping
    );

    let run_for = Duration::from_secs_f64(seconds);
    let mut interval = tokio::time::interval(Duration::from_millis(16));
    let mut last_report = start;
    let mut ticks: u64 = 0;

    loop {
        interval.tick().await;
        let now = Instant::now();
        ticks += 1;
        match controller.update(&mut timeline, now) {
            TickOutcome::Advanced(frame) => {
                if now.duration_since(last_report) >= Duration::from_secs(1) {
                    last_report = now;
                    let fps = timeline.state().fps;
                    let tc = Timecode::from_frame(frame, fps, TimecodeFormat::NonDropFrame);
                    info!("frame {} ({})", frame, tc);
                }
            }
            TickOutcome::Looped(frame) => info!("looped to frame {}", frame),
            TickOutcome::Stopped(frame) => {
                info!("reached the end at frame {}", frame);
                break;
            }
            TickOutcome::Idle => {
                warn!("playback stopped unexpectedly");
                break;
            }
        }
        if now.duration_since(start) >= run_for {
            timeline.pause();
            break;
        }
    }

    info!(
        "Stopped at frame {} after {} ticks ({:.2}s)",
        timeline.current_frame(),
        ticks,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// A plain frame number, or a timecode at the timeline's rate.
fn parse_start(raw: &str, fps: f64) -> Result<Frame> {
    if let Ok(frame) = raw.parse::<Frame>() {
        return Ok(frame);
    }
    let tc = Timecode::parse(raw, fps).with_context(|| format!("invalid --from {raw:?}"))?;
    Ok(tc.to_frame())
}
