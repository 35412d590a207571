use serde_json::{json, Value};

use crate::guard::{self, Screen};
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_screen, HandlerErr};
use crate::ipc::types::{AppState, Request};

/// Current view of `screen`, or a placeholder marker for pages without a
/// controller.
pub fn screen_view(state: &mut AppState, screen: Screen) -> Value {
    let route = guard::route_of(screen);
    let view = match state.screens.controller_mut(screen) {
        Some(ctl) => ctl.view(),
        None => json!({ "placeholder": true }),
    };
    json!({
        "screen": screen,
        "path": route.path,
        "title": route.title,
        "view": view,
    })
}

async fn handle_open(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let path = get_required_str(&req.params, "path")?;
    let screen = require_screen(state, &path)?;
    let api = state.client();
    let role = state.session.role();
    if let Some(ctl) = state.screens.controller_mut(screen) {
        tracing::debug!(event = "screen_open", path = %path);
        ctl.set_viewer(role);
        ctl.activate(&api, &mut state.notices).await;
    }
    Ok(screen_view(state, screen))
}

fn handle_view(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let path = get_required_str(&req.params, "path")?;
    let screen = require_screen(state, &path)?;
    Ok(screen_view(state, screen))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "screen.open" => handle_open(state, req).await,
        "screen.view" => handle_view(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
