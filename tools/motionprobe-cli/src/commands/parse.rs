//! Parse a backend reply into a structured prediction.

use std::io::Read;
use std::path::PathBuf;

use motionprobe_eval::parse_response;

pub fn run(file: Option<PathBuf>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let prediction = parse_response(&text);
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}
