use std::path::PathBuf;

use serde_json::{json, Value};

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::screens::upload_photo;

async fn handle_upload(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    if !state.session.is_authenticated() {
        return Err(HandlerErr::new("unauthenticated", "sign in required"));
    }
    let path = PathBuf::from(get_required_str(&req.params, "path")?);
    let api = state.client();
    match upload_photo(&api, &path, &mut state.notices).await {
        Some(url) => Ok(json!({ "url": url })),
        None => Err(HandlerErr::new("upload_failed", "Failed to upload photo")),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "upload.file" => handle_upload(state, req).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
