use serde_json::{json, Value};

use super::screens::screen_view;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_screen, require_write, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::screens::timetable::{DeleteOutcome, ENTRY_FORM};

const PATH: &str = "/timetable";

async fn handle_select(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    let class_id = get_required_str(&req.params, "classId")?;
    let section_id = get_required_str(&req.params, "sectionId")?;
    let api = state.client();
    state
        .screens
        .timetable
        .select(&class_id, &section_id, &api, &mut state.notices)
        .await;
    Ok(screen_view(state, Screen::Timetable))
}

fn handle_grid(state: &mut AppState) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    let tt = &state.screens.timetable;
    if tt.selection().is_none() {
        return Err(HandlerErr::new("bad_params", "select a class and section first"));
    }
    Ok(json!({ "selection": tt.selection(), "grid": tt.grid() }))
}

async fn handle_delete(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    require_write(state, ENTRY_FORM.write_roles, "deleting timetable entries")?;
    let entry_id = get_required_str(&req.params, "entryId")?;
    let confirmed = req
        .params
        .get("confirmed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let api = state.client();
    let outcome = state
        .screens
        .timetable
        .delete(&entry_id, confirmed, &api, &mut state.notices)
        .await;
    let mut out = screen_view(state, Screen::Timetable);
    out["outcome"] = json!(match outcome {
        DeleteOutcome::NeedsConfirmation => "needsConfirmation",
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::Failed => "failed",
    });
    Ok(out)
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "timetable.select" => handle_select(state, req).await,
        "timetable.grid" => handle_grid(state),
        "timetable.delete" => handle_delete(state, req).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
