use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use schoold::api::{ApiClient, HttpTransport};
use schoold::config::Config;
use schoold::{ipc, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    logging::init(&config.log_level);

    let transport = HttpTransport::new(&config.api_url)?;
    tracing::info!(event = "sidecar_started", api_url = %transport.base_url());
    let mut state = ipc::AppState::new(ApiClient::new(Arc::new(transport)));
    if let Some(ws) = &config.workspace {
        // A broken workspace must not keep the sidecar from starting.
        if let Err(e) = ipc::open_workspace(&mut state, ws) {
            tracing::error!(event = "workspace_open_failed", path = %ws.display(), error = %e);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req).await,
            Err(e) => {
                // Can't reply without id.
                serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                })
            }
        };

        let mut out = serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string());
        out.push('\n');
        if stdout.write_all(out.as_bytes()).await.is_err() {
            break;
        }
        let _ = stdout.flush().await;
    }

    tracing::info!(event = "sidecar_stopped");
    Ok(())
}
