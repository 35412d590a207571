use serde_json::{json, Value};

use super::screens::screen_view;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, require_screen, HandlerErr};
use crate::ipc::types::{AppState, Request};

async fn handle_report_card(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, "/exams")?;
    // A missing student is reported as a notice, like an empty picker.
    let student_id = get_optional_str(&req.params, "studentId").unwrap_or_default();
    let exam_type_id = get_optional_str(&req.params, "examTypeId");
    let api = state.client();
    let loaded = state
        .screens
        .exams
        .load_report_card(&student_id, exam_type_id.as_deref(), &api, &mut state.notices)
        .await;
    let mut out = screen_view(state, Screen::Exams);
    out["loaded"] = json!(loaded);
    Ok(out)
}

fn handle_close_report_card(state: &mut AppState) -> Result<Value, HandlerErr> {
    require_screen(state, "/exams")?;
    state.screens.exams.close_report_card();
    Ok(screen_view(state, Screen::Exams))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "exams.reportCard" => handle_report_card(state, req).await,
        "exams.closeReportCard" => handle_close_report_card(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
