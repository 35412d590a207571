use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_screen, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn handle_sections_for(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_screen(state, "/classes")?;
    let class_id = get_required_str(&req.params, "classId")?;
    let sections = state.screens.classes.sections_for(&class_id);
    Ok(json!({ "classId": class_id, "sections": sections }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.sectionsFor" => handle_sections_for(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
