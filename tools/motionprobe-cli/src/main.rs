//! MotionProbe CLI: synthesize sources, generate labeled camera-motion
//! clips, and evaluate vision backends on them.
//!
//! Usage:
//!   motionprobe synth [OPTIONS]       Render the synthetic source scene
//!   motionprobe generate [OPTIONS]    Generate labeled motion clips
//!   motionprobe validate [DIR]        Check a clip directory against its manifest
//!   motionprobe run [DIR]             Evaluate a backend on a clip directory
//!   motionprobe parse [FILE]          Parse a backend reply into a prediction
//!   motionprobe check                 Check tools, credentials, and config

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use motionprobe_common::HarnessConfig;

mod commands;

use commands::{BorderArg, ClipFormat};

#[derive(Parser)]
#[command(
    name = "motionprobe",
    about = "Synthetic camera-motion benchmark for vision-language models",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the synthetic depth-layered source scene
    Synth {
        /// Output path (a video file, or a directory for PNG frames)
        #[arg(short, long, default_value = "test_input.mp4")]
        output: PathBuf,

        /// Frame width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Frame height
        #[arg(long, default_value = "720")]
        height: u32,

        /// Duration in seconds
        #[arg(long, default_value = "3.0")]
        duration: f64,

        /// Frame rate
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Output format
        #[arg(long, value_enum, default_value = "mp4")]
        format: ClipFormat,
    },

    /// Generate labeled camera-motion clips from a source
    Generate {
        /// Source video or PNG directory (synthetic scene when omitted)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory (defaults to the configured output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Motion label to generate, e.g. pan_right; repeatable.
        /// The nine canonical motions when omitted.
        #[arg(short, long = "motion")]
        motions: Vec<String>,

        /// Frames per clip (defaults to the source length)
        #[arg(long)]
        frames: Option<usize>,

        /// Cap on decoded source frames
        #[arg(long)]
        max_source_frames: Option<usize>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<f64>,

        /// Border policy for pixels warped in from outside the frame
        #[arg(long, value_enum)]
        border: Option<BorderArg>,

        /// Clip format
        #[arg(long, value_enum, default_value = "mp4")]
        format: ClipFormat,
    },

    /// Check a clip directory against its manifest
    Validate {
        /// Clip directory (defaults to the configured output_dir)
        dir: Option<PathBuf>,
    },

    /// Evaluate a vision backend on a clip directory
    Run {
        /// Clip directory (defaults to the configured output_dir)
        dir: Option<PathBuf>,

        /// Backend: gemini|openai|anthropic|scripted
        #[arg(short, long)]
        backend: Option<String>,

        /// Model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Frames sampled per clip
        #[arg(short = 'n', long)]
        frames: Option<usize>,

        /// Maximum concurrent backend calls
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Prompt preset: general|detailed|binary
        #[arg(short, long)]
        prompt: Option<String>,

        /// Custom prompt text file (overrides the preset)
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Canned reply for the scripted backend; repeatable
        #[arg(long = "response")]
        responses: Vec<String>,

        /// Report path (defaults to results.json in the clip directory)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Parse a backend reply and print the prediction as JSON
    Parse {
        /// Reply file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Check ffmpeg, credentials, and configuration
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => HarnessConfig::load(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    motionprobe_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Synth {
            output,
            width,
            height,
            duration,
            fps,
            format,
        } => commands::synth::run(output, width, height, duration, fps, format),
        Commands::Generate {
            source,
            output,
            motions,
            frames,
            max_source_frames,
            fps,
            border,
            format,
        } => commands::generate::run(
            config,
            commands::generate::GenerateArgs {
                source,
                output,
                motions,
                frames,
                max_source_frames,
                fps,
                border,
                format,
            },
        ),
        Commands::Validate { dir } => {
            let dir = dir.unwrap_or_else(|| config.output_dir.clone());
            commands::validate::run(dir)
        }
        Commands::Run {
            dir,
            backend,
            model,
            frames,
            concurrency,
            prompt,
            prompt_file,
            responses,
            report,
        } => {
            commands::run::run(
                config,
                commands::run::RunArgs {
                    dir,
                    backend,
                    model,
                    frames,
                    concurrency,
                    prompt,
                    prompt_file,
                    responses,
                    report,
                },
            )
            .await
        }
        Commands::Parse { file } => commands::parse::run(file),
        Commands::Check => commands::check::run(&config),
    }
}
