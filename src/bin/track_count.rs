//! `track-count` binary: track a MOT detection file and count line crossings.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin track-count -- --detections det.txt --config config.json --sequence MOT17-09
//! cargo run --bin track-count -- --detections det.txt --line 0,500,1920,500 --entry down --exit up
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use bytetrack_counter::integration::{MotDetections, MotWriter};
use bytetrack_counter::{CountingPipeline, Direction, LineConfig, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "track-count",
    version,
    about = "ByteTrack tracking with directional line-crossing counts"
)]
struct Args {
    /// MOT-format detection file (`frame,id,left,top,width,height,conf,...`).
    #[arg(short, long, value_name = "FILE")]
    detections: PathBuf,

    /// JSON run configuration with `tracker` parameters and per-sequence `lines`.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sequence name used to pick the counting line from the config.
    #[arg(short, long, default_value = "sequence")]
    sequence: String,

    /// Counting line as `x1,y1,x2,y2`; overrides the config's line.
    #[arg(
        long,
        value_name = "X1,Y1,X2,Y2",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    line: Option<Vec<f32>>,

    /// Direction counted as entry when `--line` is given.
    #[arg(long, requires = "line")]
    entry: Option<Direction>,

    /// Direction counted as exit when `--line` is given.
    #[arg(long, requires = "line")]
    exit: Option<Direction>,

    /// Process at least this many frames, padding with empty frames.
    #[arg(long)]
    frames: Option<u32>,

    /// Output directory for `tracks.txt` and `results.json`.
    #[arg(short, long, value_name = "DIR", default_value = "outputs")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .init();

    let run_config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            RunConfig::from_json(path)?
        }
        None => RunConfig::default(),
    };

    let line = resolve_line(&args, &run_config)?;
    info!(
        sequence = %args.sequence,
        start = ?line.start,
        end = ?line.end,
        entry = %line.entry,
        exit = %line.exit,
        "counting line"
    );

    let mut source = MotDetections::from_path(&args.detections)
        .with_context(|| format!("reading detections from {}", args.detections.display()))?;
    if let Some(frames) = args.frames {
        source = source.with_total_frames(frames);
    }
    info!("Frames: {}", source.total_frames());

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;
    let tracks_path = args.output.join("tracks.txt");
    let mut writer = MotWriter::create(&tracks_path)
        .with_context(|| format!("creating {}", tracks_path.display()))?;

    let mut pipeline = CountingPipeline::new(source, run_config.tracker.clone(), line)?;
    while let Some(report) = pipeline.step()? {
        writer.write_frame(report.frame, &report.tracks)?;
    }
    writer.flush()?;

    let summary = pipeline.summary(args.sequence.clone());
    let results_path = args.output.join("results.json");
    std::fs::write(&results_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", results_path.display()))?;

    let counts = summary.counts;
    println!("{}", "=".repeat(50));
    println!("Results:");
    println!("{}", "=".repeat(50));
    println!("Entry: {}", counts.entry);
    println!("Exit: {}", counts.exit);
    println!("Total crossings: {}", counts.total_crossings);
    println!("Unique tracks: {}", counts.unique_tracks);
    println!("{}", "=".repeat(50));
    println!("Tracks saved: {}", tracks_path.display());
    println!("Results saved: {}", results_path.display());

    Ok(())
}

fn resolve_line(args: &Args, run_config: &RunConfig) -> Result<LineConfig> {
    let Some(coords) = args.line.as_deref() else {
        return Ok(run_config.line_for(&args.sequence)?.clone());
    };
    let [x1, y1, x2, y2] = coords else {
        bail!("--line takes exactly four values, got {}", coords.len());
    };
    let (Some(entry), Some(exit)) = (args.entry, args.exit) else {
        bail!("--line requires both --entry and --exit");
    };
    let line = LineConfig {
        start: [*x1, *y1],
        end: [*x2, *y2],
        entry,
        exit,
    };
    line.validate()?;
    Ok(line)
}
