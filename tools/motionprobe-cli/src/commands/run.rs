//! Evaluate a vision backend on a generated clip directory.

use std::path::PathBuf;

use motionprobe_common::HarnessConfig;
use motionprobe_eval::{ExcludedClip, RunnerSettings, SuiteReport, SuiteRunner, REPORT_FILE};
use motionprobe_inference::{build_adapter, BackendKind, PromptTemplate};
use motionprobe_media::load_suite;
use motionprobe_model::ClipManifest;

use super::provider_for;

pub struct RunArgs {
    pub dir: Option<PathBuf>,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub frames: Option<usize>,
    pub concurrency: Option<usize>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
    pub responses: Vec<String>,
    pub report: Option<PathBuf>,
}

/// Fold command-line overrides into the loaded config.
fn apply_overrides(config: &mut HarnessConfig, args: &RunArgs) -> anyhow::Result<()> {
    let inference = &mut config.inference;

    if !args.responses.is_empty() && args.backend.is_none() {
        inference.backend = "scripted".to_string();
    }
    if let Some(backend) = &args.backend {
        let kind = BackendKind::parse(backend)?;
        // Switching backends also switches its default model and key variable.
        if BackendKind::parse(&inference.backend).ok() != Some(kind) {
            inference.model = kind.default_model().to_string();
            inference.api_key_env = kind.default_api_key_env().to_string();
            inference.base_url = None;
        }
        inference.backend = backend.clone();
    }
    if !args.responses.is_empty() {
        inference.scripted_responses = args.responses.clone();
    }
    if let Some(model) = &args.model {
        inference.model = model.clone();
    }
    if let Some(concurrency) = args.concurrency {
        inference.concurrency = concurrency;
    }
    if let Some(frames) = args.frames {
        config.sampling.frame_count = frames;
    }

    if let Some(preset) = &args.prompt {
        config.prompt.preset = preset.clone();
        config.prompt.custom = None;
    }
    if let Some(path) = &args.prompt_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read prompt {}: {e}", path.display()))?;
        config.prompt.custom = Some(text);
    }
    Ok(())
}

pub async fn run(mut config: HarnessConfig, args: RunArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;
    config.validate()?;

    let dir = args.dir.clone().unwrap_or_else(|| config.output_dir.clone());
    let prompt = PromptTemplate::from_config(&config.prompt)?;
    let adapter = build_adapter(&config.inference)?;

    let manifest =
        ClipManifest::load(&dir).map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;
    let first_clip = manifest
        .clips
        .values()
        .next()
        .map(|entry| dir.join(&entry.file))
        .ok_or_else(|| anyhow::anyhow!("Manifest in {} lists no clips", dir.display()))?;
    let provider = provider_for(&first_clip, None);

    println!("Loading clips from {}", dir.display());
    let loaded = load_suite(&dir, provider.as_ref())?;
    if loaded.clips.is_empty() {
        anyhow::bail!("None of the {} listed clips could be decoded", manifest.len());
    }

    let settings = RunnerSettings::from_config(&config);
    let runner = SuiteRunner::new(adapter, prompt, settings)?;
    let backend = runner.adapter().name().to_string();
    let model = runner.adapter().model().to_string();

    let mut run = runner.run(loaded.clips).await;
    run.excluded
        .extend(loaded.failed.into_iter().map(|(clip_id, e)| ExcludedClip {
            clip_id,
            reason: e.to_string(),
        }));

    let report = SuiteReport::new(run, &backend, &model, settings.sample_count);
    let report_path = args.report.unwrap_or_else(|| dir.join(REPORT_FILE));
    report.save(&report_path)?;

    println!();
    print!("{report}");
    println!();
    println!("Report: {}", report_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            dir: None,
            backend: None,
            model: None,
            frames: None,
            concurrency: None,
            prompt: None,
            prompt_file: None,
            responses: Vec::new(),
            report: None,
        }
    }

    #[test]
    fn switching_backend_resets_model_and_key() {
        let mut config = HarnessConfig::default();
        apply_overrides(
            &mut config,
            &RunArgs {
                backend: Some("openai".into()),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(config.inference.model, "gpt-4o");
        assert_eq!(config.inference.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn responses_select_scripted_backend() {
        let mut config = HarnessConfig::default();
        apply_overrides(
            &mut config,
            &RunArgs {
                responses: vec!["MOTION_TYPE: static".into()],
                frames: Some(4),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(config.inference.backend, "scripted");
        assert_eq!(config.inference.scripted_responses.len(), 1);
        assert_eq!(config.sampling.frame_count, 4);
    }

    #[test]
    fn explicit_model_wins() {
        let mut config = HarnessConfig::default();
        apply_overrides(
            &mut config,
            &RunArgs {
                backend: Some("anthropic".into()),
                model: Some("claude-test".into()),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(config.inference.model, "claude-test");
    }
}
