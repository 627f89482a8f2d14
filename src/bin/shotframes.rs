use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use ffmpeg_next::util::log::Level as FfmpegLogLevel;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use shotframes::{
    FrameData, Nested, PositionSpec, SamplerConfig, SequenceSampler, SessionOptions, ShotBoundary,
    ShotLabel, VideoAnnotation, VideoSession, WindowAnchor,
};

const CLI_AFTER_HELP: &str = "Examples:\n  shotframes info input.mp4 --json\n  shotframes frames input.mp4 --positions '[0, [10, 11], [[200]]]'\n  shotframes window input.mp4 --center 120 --size 5\n  shotframes sample input.mp4 --boundaries 131:132,400:410 --length 16 --count 4 --seed 7\n  shotframes completions zsh > _shotframes";

#[derive(Debug, Parser)]
#[command(
    name = "shotframes",
    version,
    about = "Inspect frame extraction and shot-boundary sequence sampling",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnchorArg {
    From,
    Midpoint,
    To,
}

impl From<AnchorArg> for WindowAnchor {
    fn from(value: AnchorArg) -> Self {
        match value {
            AnchorArg::From => WindowAnchor::From,
            AnchorArg::Midpoint => WindowAnchor::Midpoint,
            AnchorArg::To => WindowAnchor::To,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print frame count, frame rate, and dimensions.
    #[command(about = "Print video information", visible_alias = "probe")]
    Info {
        /// Input video path.
        input: PathBuf,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fetch a nested list of positions.
    #[command(about = "Fetch frames for a nested position list")]
    Frames {
        /// Input video path.
        input: PathBuf,
        /// JSON position spec, e.g. '[0, [10, 11]]'.
        #[arg(long)]
        positions: String,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fetch the frames around a centre frame.
    #[command(about = "Fetch a clamped window of frames")]
    Window {
        /// Input video path.
        input: PathBuf,
        #[arg(long)]
        center: u64,
        #[arg(long, default_value_t = 5)]
        size: u64,
    },

    /// Sample labelled windows around shot boundaries.
    #[command(about = "Sample labelled sequences")]
    Sample {
        /// Input video path.
        input: PathBuf,
        /// Comma-separated FROM:TO boundary pairs.
        #[arg(long)]
        boundaries: String,
        #[arg(long, default_value_t = 16)]
        length: usize,
        #[arg(long, default_value_t = 1)]
        stride: u64,
        #[arg(long, default_value_t = 5)]
        offset: u64,
        #[arg(long, default_value_t = 1)]
        min_shots: usize,
        #[arg(long, value_enum, default_value = "from")]
        anchor: AnchorArg,
        /// Seed for reproducible sampling.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of sequences to sample.
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Decode the sampled frames as well.
        #[arg(long)]
        decode: bool,
        /// Show a progress bar while decoding.
        #[arg(long)]
        progress: bool,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn parse_boundaries(value: &str) -> Result<Vec<(u64, u64)>, Box<dyn std::error::Error>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(u64, u64), Box<dyn std::error::Error>> {
            let (from, to) = pair
                .split_once(':')
                .ok_or_else(|| format!("boundary must be FROM:TO, got {pair}"))?;
            Ok((from.trim().parse::<u64>()?, to.trim().parse::<u64>()?))
        })
        .collect()
}

fn frame_json(frame: &FrameData) -> Value {
    json!({
        "position": frame.position(),
        "timestamp": frame.timestamp(),
        "width": frame.frame().width(),
        "height": frame.frame().height(),
    })
}

fn nested_json(frames: &Nested<FrameData>) -> Value {
    match frames {
        Nested::Item(frame) => frame_json(frame),
        Nested::Group(children) => Value::Array(children.iter().map(nested_json).collect()),
    }
}

fn colored_label(label: ShotLabel) -> String {
    let digit = label.index().to_string();
    match label {
        ShotLabel::PreviousShot => digit.blue().to_string(),
        ShotLabel::Transition => digit.yellow().bold().to_string(),
        ShotLabel::NextShot => digit.green().to_string(),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    ffmpeg_next::init()?;
    let level = match cli.global.log_level.as_deref() {
        Some(value) => {
            parse_log_level(value).ok_or_else(|| format!("unknown FFmpeg log level: {value}"))?
        }
        None if cli.global.verbose => FfmpegLogLevel::Info,
        None => FfmpegLogLevel::Error,
    };
    ffmpeg_next::util::log::set_level(level);

    let options = SessionOptions::new();

    match cli.command {
        Commands::Info { input, json } => {
            let session = VideoSession::open(&input, &options)?;
            let info = session.info();
            if json {
                let value = json!({
                    "identifier": info.identifier,
                    "total_frames": info.total_frames,
                    "frames_per_second": info.frames_per_second,
                    "duration_seconds": info.duration_seconds(),
                    "width": info.width,
                    "height": info.height,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", info.identifier.bold());
                println!("Frames: {}", info.total_frames);
                println!("FPS: {:.3}", info.frames_per_second);
                println!("Duration: {:.3}s", info.duration_seconds());
                println!("Resolution: {}x{}", info.width, info.height);
            }
        }
        Commands::Frames {
            input,
            positions,
            json,
        } => {
            let value: Value = serde_json::from_str(&positions)?;
            let spec = PositionSpec::from_json(&value)?;
            let mut session = VideoSession::open(&input, &options)?;
            let frames = session.fetch_spec(&spec)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&nested_json(&frames))?);
            } else {
                for frame in frames.leaves() {
                    println!(
                        "frame {:>8}  {:>10.3}s  {}x{}",
                        frame.position(),
                        frame.timestamp(),
                        frame.frame().width(),
                        frame.frame().height(),
                    );
                }
            }
            if cli.global.verbose {
                eprintln!("{:?}", session.stats());
            }
        }
        Commands::Window {
            input,
            center,
            size,
        } => {
            let mut session = VideoSession::open(&input, &options)?;
            let frames = session.fetch_window(center, size)?;
            let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
            println!("{positions:?}");
        }
        Commands::Sample {
            input,
            boundaries,
            length,
            stride,
            offset,
            min_shots,
            anchor,
            seed,
            count,
            decode,
            progress,
            json,
        } => {
            let pairs = parse_boundaries(&boundaries)?;
            let mut session = VideoSession::open(&input, &options)?;
            let info = session.info().clone();
            let video = VideoAnnotation::from_pairs(
                info.identifier.clone(),
                info.total_frames,
                info.frames_per_second,
                &pairs,
            )?;

            let config = SamplerConfig::new()
                .with_sequence_length(length)
                .with_stride(stride)
                .with_random_offset_range(offset)
                .with_min_shots(min_shots)
                .with_anchor(anchor.into());
            let mut sampler = match seed {
                Some(seed) => SequenceSampler::seeded(config, seed)?,
                None => SequenceSampler::from_entropy(config)?,
            };

            let bar = if progress && decode {
                let bar = ProgressBar::new(count as u64);
                bar.set_style(
                    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} sequences")?
                        .progress_chars("=>-"),
                );
                Some(bar)
            } else {
                None
            };

            let mut samples = Vec::with_capacity(count);
            for _ in 0..count {
                let sequence = sampler.sample_sequence(&video)?;
                if decode {
                    session.fetch_many(sequence.positions())?;
                }
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
                samples.push(sequence);
            }
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }

            if json {
                let value: Vec<Value> = samples
                    .iter()
                    .map(|sequence| {
                        json!({
                            "boundary": [sequence.boundary().from(), sequence.boundary().to()],
                            "positions": sequence.positions(),
                            "labels": sequence.label_indices(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for sequence in &samples {
                    let boundary: &ShotBoundary = sequence.boundary();
                    let labels: Vec<String> =
                        sequence.labels().iter().copied().map(colored_label).collect();
                    println!(
                        "{} {}..{}  frames {:?}..{:?}",
                        "boundary".bold(),
                        boundary.from(),
                        boundary.to(),
                        sequence.positions().first(),
                        sequence.positions().last(),
                    );
                    println!("  {}", labels.join(" "));
                }
            }

            if cli.global.verbose {
                let stats = session.stats();
                eprintln!(
                    "decoded {} frames, {} cache hits, {} reversal(s)",
                    stats.frames_decoded, stats.cache.hits, stats.seek_reversals,
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "shotframes", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
