//! Generate labeled camera-motion clips.

use std::path::PathBuf;

use anyhow::Context;
use motionprobe_common::HarnessConfig;
use motionprobe_media::synthetic::{
    frames_for_duration, synthetic_source, DEFAULT_DURATION_SECS, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use motionprobe_media::ClipAssembler;
use motionprobe_model::{Frame, MotionSpec};
use motionprobe_transform::{GenerateOptions, MotionTransformEngine};

use super::{encoder_for, kinematics, provider_for, BorderArg, ClipFormat};

pub struct GenerateArgs {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub motions: Vec<String>,
    pub frames: Option<usize>,
    pub max_source_frames: Option<usize>,
    pub fps: Option<f64>,
    pub border: Option<BorderArg>,
    pub format: ClipFormat,
}

fn load_source(args: &GenerateArgs, fps: f64) -> anyhow::Result<Vec<Frame>> {
    match &args.source {
        Some(path) => {
            println!("Decoding source: {}", path.display());
            // An unreadable source ends the run: no clip can be produced.
            provider_for(path, args.max_source_frames)
                .decode(path)
                .map_err(|e| anyhow::anyhow!("Cannot read source: {e}"))
        }
        None => {
            let count = frames_for_duration(DEFAULT_DURATION_SECS, fps);
            println!(
                "Using synthetic source: {DEFAULT_WIDTH}x{DEFAULT_HEIGHT}, {count} frames"
            );
            Ok(synthetic_source(DEFAULT_WIDTH, DEFAULT_HEIGHT, count)?)
        }
    }
}

pub fn run(mut config: HarnessConfig, args: GenerateArgs) -> anyhow::Result<()> {
    if let Some(frames) = args.frames {
        config.generation.frame_count = Some(frames);
    }
    if let Some(fps) = args.fps {
        config.generation.fps = fps;
    }
    if let Some(border) = args.border {
        config.generation.border = border.into();
    }
    config.validate()?;

    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let kinematics = kinematics(&config.generation);
    let specs: Vec<MotionSpec> = if args.motions.is_empty() {
        MotionSpec::canonical_suite(&kinematics)?
    } else {
        args.motions
            .iter()
            .map(|label| {
                MotionSpec::from_label(label, &kinematics)
                    .with_context(|| format!("Invalid motion '{label}'"))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let encoder = encoder_for(args.format)?;
    let source = load_source(&args, config.generation.fps)?;

    let engine = MotionTransformEngine::new(GenerateOptions::from_config(&config.generation));
    println!("Generating {} clip(s) into {}", specs.len(), output_dir.display());

    let mut clips = Vec::with_capacity(specs.len());
    let mut failures = Vec::new();
    for (spec, result) in specs.iter().zip(engine.generate_batch(&source, &specs)) {
        match result {
            Ok(clip) => clips.push(clip),
            Err(e) => failures.push(format!("{}: {e}", spec.label())),
        }
    }

    let assembler = ClipAssembler::new(&output_dir, encoder);
    let suite = assembler.assemble_all(&clips)?;
    failures.extend(suite.failed.iter().map(|(id, e)| format!("{id}: {e}")));

    for handle in &suite.handles {
        println!(
            "  [OK] {:<12} {} frames -> {}",
            handle.id,
            handle.frame_count,
            handle.path.display()
        );
    }
    for failure in &failures {
        println!("  [FAIL] {failure}");
    }
    println!("Manifest: {}", suite.manifest_path.display());

    if suite.handles.is_empty() {
        anyhow::bail!("No clips were generated");
    }
    Ok(())
}
