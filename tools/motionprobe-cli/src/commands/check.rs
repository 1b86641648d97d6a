//! Check external tools, credentials, and configuration.

use motionprobe_common::HarnessConfig;
use motionprobe_inference::BackendKind;
use motionprobe_media::command_exists;

pub fn run(config: &HarnessConfig) -> anyhow::Result<()> {
    println!("MotionProbe System Check");
    println!("{}", "=".repeat(50));

    let mut required_ok = true;

    for tool in ["ffmpeg", "ffprobe"] {
        if command_exists(tool) {
            println!("[OK] {tool} found");
        } else {
            println!("[WARN] {tool} not found: video sources and mp4 clips unavailable (PNG still works)");
        }
    }

    match config.validate() {
        Ok(()) => println!("[OK] Configuration is valid"),
        Err(e) => {
            required_ok = false;
            println!("[FAIL] Configuration: {e}");
        }
    }

    let inference = &config.inference;
    match BackendKind::parse(&inference.backend) {
        Ok(kind) => {
            println!("[OK] Backend: {} (model {})", inference.backend, inference.model);
            if kind.needs_api_key() {
                let present = std::env::var(&inference.api_key_env)
                    .map(|key| !key.trim().is_empty())
                    .unwrap_or(false);
                if present {
                    println!("[OK] API key found in {}", inference.api_key_env);
                } else {
                    required_ok = false;
                    println!("[FAIL] API key missing: set {}", inference.api_key_env);
                }
            } else if inference.scripted_responses.is_empty() {
                println!("[WARN] Scripted backend has no responses configured");
            }
        }
        Err(e) => {
            required_ok = false;
            println!("[FAIL] {e}");
        }
    }

    println!();
    println!("Output directory: {}", config.output_dir.display());
    println!(
        "Sampling: {} frames per clip, concurrency {}",
        config.sampling.frame_count, inference.concurrency
    );

    println!();
    if required_ok {
        println!("All required capabilities are available. MotionProbe is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
