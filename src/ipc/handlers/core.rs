use std::path::{Path, PathBuf};

use serde_json::json;

use super::auth::session_json;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "authenticated": state.session.is_authenticated(),
        }),
    )
}

/// Opens the store under `path`. A session already held in memory is saved
/// there; otherwise a previously saved one is restored. Returns whether a
/// session was restored.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<bool> {
    let conn = db::open_db(path)?;
    let restored = if state.session.is_authenticated() {
        state.session.persist(&conn)?;
        false
    } else {
        state.session.restore(&conn)?
    };
    tracing::info!(event = "workspace_opened", path = %path.display(), restored);
    state.workspace = Some(path.to_path_buf());
    state.db = Some(conn);
    Ok(restored)
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(restored) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "restored": restored,
                "session": session_json(state),
            }),
        ),
        Err(e) => err(&req.id, "store_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
