//! Validate a clip directory against its manifest.

use std::path::PathBuf;

use motionprobe_model::ClipManifest;

pub fn run(dir: PathBuf) -> anyhow::Result<()> {
    println!("Validating clip directory: {}", dir.display());

    let manifest =
        ClipManifest::load(&dir).map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;

    println!("  Version: {}", manifest.version);
    println!("  Created: {}", manifest.created_at);
    println!(
        "  Resolution: {}x{} @ {}fps",
        manifest.width, manifest.height, manifest.fps
    );
    println!("  Clips: {}", manifest.len());
    for (id, entry) in &manifest.clips {
        println!(
            "    {:<12} {:<12} {} frames",
            id,
            entry.ground_truth.label(),
            entry.frame_count
        );
    }

    let errors = manifest.validate_files(&dir);
    if errors.is_empty() {
        println!("  Files: All present");
        println!("\nClip directory is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Missing clips will be skipped by `run`.",
            errors.len()
        );
    }

    Ok(())
}
