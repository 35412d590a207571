//! Tracing bootstrap.
//!
//! stdout carries IPC responses, so every log line goes to stderr. Init is
//! idempotent and never panics; an unparsable filter falls back to `info`.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

pub fn init(level: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(event = "logging_initialized", level);
        }
    });
}
