use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// School console sidecar: speaks line-delimited JSON on stdin/stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "schoold")]
#[command(about = "Client-side core of the school administration console", version)]
pub struct Config {
    /// Base URL of the school backend (the `/api` prefix is added per request)
    #[arg(long, env = "SCHOOLD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Workspace directory holding the local store; opened at startup when set
    #[arg(long, env = "SCHOOLD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter, e.g. `info` or `schoold=debug`
    #[arg(long, env = "SCHOOLD_LOG", default_value = "info")]
    pub log_level: String,
}
