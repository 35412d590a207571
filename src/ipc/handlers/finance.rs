use serde_json::{json, Value};

use super::screens::screen_view;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, require_screen, require_write, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::screens::finance::{ReportRange, LEDGER_ROLES};
use crate::screens::ScreenController;

async fn handle_report(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    require_screen(state, "/finance")?;
    require_write(state, LEDGER_ROLES, "viewing the financial report")?;
    let range = ReportRange {
        date_from: get_optional_str(&req.params, "dateFrom"),
        date_to: get_optional_str(&req.params, "dateTo"),
    };
    let api = state.client();
    let role = state.session.role();
    state.screens.finance.set_viewer(role);
    let loaded = state
        .screens
        .finance
        .load_report(range, &api, &mut state.notices)
        .await;
    let mut out = screen_view(state, Screen::Finance);
    out["loaded"] = json!(loaded);
    Ok(out)
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "finance.report" => handle_report(state, req).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
