//! Speaker Diarization CLI

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use diarize_rs::{
    audio, Config, DiarizationPipeline, TimeIndex, TranscriptAssembler, TranscriptFormat,
    VoiceActivityDetector,
};

/// Offline speaker diarization
#[derive(Parser)]
#[command(name = "diarize-rs")]
#[command(about = "Attribute speech segments in a recording to distinct speakers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Diarize an audio file and write a transcript
    Run {
        /// Input audio file path
        input: PathBuf,

        /// Transcript output path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transcript format (blocks, bracketed, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Target number of speakers
        #[arg(short, long)]
        speakers: Option<usize>,

        /// Normalized VAD energy threshold (0.0 - 1.0)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Minimum speech segment length in seconds
        #[arg(short, long)]
        min_segment: Option<f32>,

        /// Also print the structured segment list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect speech intervals only (no clustering or transcript)
    Vad {
        /// Input audio file path
        input: PathBuf,

        /// Normalized VAD energy threshold (0.0 - 1.0)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Minimum speech segment length in seconds
        #[arg(short, long)]
        min_segment: Option<f32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - quiet by default, use -v for more
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            format,
            speakers,
            threshold,
            min_segment,
            json,
        } => {
            if let Some(speakers) = speakers {
                config.cluster.num_speakers = speakers;
            }
            if let Some(threshold) = threshold {
                config.vad.energy_threshold = threshold;
            }
            if let Some(min_segment) = min_segment {
                config.vad.min_segment_length = min_segment;
            }
            if let Some(format) = format {
                config.output.format = parse_format(&format)?;
            }
            if let Some(output) = output {
                config.output.output_path = Some(output);
            }
            config.validate().context("Invalid configuration")?;

            run_diarization(config, input, json)
        }
        Commands::Vad {
            input,
            threshold,
            min_segment,
        } => {
            if let Some(threshold) = threshold {
                config.vad.energy_threshold = threshold;
            }
            if let Some(min_segment) = min_segment {
                config.vad.min_segment_length = min_segment;
            }
            config.validate().context("Invalid configuration")?;

            run_vad(config, input)
        }
    }
}

fn parse_format(s: &str) -> Result<TranscriptFormat> {
    match s {
        "blocks" => Ok(TranscriptFormat::Blocks),
        "bracketed" => Ok(TranscriptFormat::Bracketed),
        "json" => Ok(TranscriptFormat::Json),
        other => anyhow::bail!("Unknown transcript format '{}' (blocks, bracketed, json)", other),
    }
}

/// Run the full pipeline on one file
fn run_diarization(config: Config, input: PathBuf, print_json: bool) -> Result<()> {
    let output_path = config.output.output_path.clone();
    let format = config.output.format;

    let pipeline = DiarizationPipeline::new(config);
    let result = pipeline
        .run_file(&input)
        .with_context(|| format!("Failed to diarize {}", input.display()))?;

    info!(
        "Diarization complete: {} segments",
        result.segments.len()
    );

    if let Some(ref path) = output_path {
        let assembler = TranscriptAssembler::new(format);
        assembler
            .write(&result.segments, path)
            .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
        println!("Transcript written to {}", path.display());
    } else {
        print!("{}", result.transcript);
    }

    if print_json {
        println!("{}", diarize_rs::transcript::segments_to_json(&result.segments)?);
    }

    Ok(())
}

/// Print detected speech intervals without clustering
fn run_vad(config: Config, input: PathBuf) -> Result<()> {
    let samples = audio::load_canonical(&input, config.audio.sample_rate)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let grid = TimeIndex::new(config.audio.sample_rate, config.audio.hop_size);
    let vad = VoiceActivityDetector::new(&config.vad);
    let intervals = vad.detect(&samples, grid);

    if intervals.is_empty() {
        println!("No speech detected");
    } else {
        for interval in &intervals {
            println!(
                "{} --> {}  ({:.2}s)",
                audio::format_hms(interval.start),
                audio::format_hms(interval.end),
                interval.end - interval.start
            );
        }
    }

    Ok(())
}
