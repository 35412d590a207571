use serde_json::Value;

use super::screens::screen_view;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{require_screen, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn search_term(params: &Value) -> String {
    params
        .get("term")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn handle_students_search(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, "/students")?;
    state.screens.students.set_search(&search_term(&req.params));
    Ok(screen_view(state, Screen::Students))
}

fn handle_teachers_search(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, "/teachers")?;
    state.screens.teachers.set_search(&search_term(&req.params));
    Ok(screen_view(state, Screen::Teachers))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "students.search" => handle_students_search(state, req),
        "teachers.search" => handle_teachers_search(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
