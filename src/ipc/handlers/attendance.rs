use chrono::NaiveDate;
use serde_json::{json, Value};

use super::screens::screen_view;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_screen, require_write, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use crate::screens::attendance::SUBMIT_ROLES;

const PATH: &str = "/attendance";

fn parse_date(raw: Option<String>) -> Result<Option<NaiveDate>, HandlerErr> {
    match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| HandlerErr::new("bad_params", format!("invalid date: {}", s))),
    }
}

async fn handle_select(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    let class_id = get_required_str(&req.params, "classId")?;
    let section_id = get_required_str(&req.params, "sectionId")?;
    let date = parse_date(get_optional_str(&req.params, "date"))?;
    let api = state.client();
    state
        .screens
        .attendance
        .select(&class_id, &section_id, date, &api, &mut state.notices)
        .await;
    Ok(screen_view(state, Screen::Attendance))
}

fn handle_mark(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    require_write(state, SUBMIT_ROLES, "marking attendance")?;
    let student_id = get_required_str(&req.params, "studentId")?;
    let raw = get_required_str(&req.params, "status")?;
    let status = AttendanceStatus::parse(&raw)
        .ok_or_else(|| HandlerErr::new("bad_params", format!("unknown status: {}", raw)))?;
    if !state.screens.attendance.mark(&student_id, status) {
        return Err(HandlerErr::new(
            "not_found",
            format!("student {} is not on the roster", student_id),
        ));
    }
    Ok(screen_view(state, Screen::Attendance))
}

async fn handle_submit(state: &mut AppState) -> Result<Value, HandlerErr> {
    require_screen(state, PATH)?;
    require_write(state, SUBMIT_ROLES, "submitting attendance")?;
    let api = state.client();
    let saved = state
        .screens
        .attendance
        .submit(&api, &mut state.notices)
        .await;
    let mut out = screen_view(state, Screen::Attendance);
    out["saved"] = json!(saved);
    Ok(out)
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "attendance.select" => handle_select(state, req).await,
        "attendance.mark" => handle_mark(state, req),
        "attendance.submit" => handle_submit(state).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
