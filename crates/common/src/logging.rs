//! Logging and tracing initialization.
//!
//! Logs go to stderr so `motionprobe parse` and the run summary can be piped.

use crate::config::LoggingConfig;

/// HTTP stack crates that are chatty at debug level during inference runs.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rustls"];

/// Filter directives for `config`: the configured level, with the HTTP
/// stack held at `warn` unless the level names one of its crates.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = config.level.trim().to_string();
    if directives.is_empty() {
        directives.push_str("info");
    }
    for target in QUIET_TARGETS {
        let named = directives
            .split(',')
            .any(|d| d.split('=').next().map(str::trim) == Some(*target));
        if !named {
            directives.push_str(&format!(",{target}=warn"));
        }
    }
    directives
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
