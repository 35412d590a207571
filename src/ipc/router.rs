use serde_json::json;

use super::error::err;
use super::handlers;
use super::types::{AppState, Request};

/// Dispatches one request and attaches the notices it raised.
pub async fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let mut resp = dispatch(state, &req).await;
    resp["notices"] = json!(state.notices.drain());
    resp
}

async fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::auth::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::nav::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::screens::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::forms::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::classes::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::timetable::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::attendance::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::exams::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::finance::try_handle(state, req).await {
        return resp;
    }
    if let Some(resp) = handlers::upload::try_handle(state, req).await {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
