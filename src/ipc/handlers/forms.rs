use std::path::PathBuf;

use serde_json::{json, Value};

use super::screens::screen_view;
use crate::form::Form;
use crate::guard::Screen;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_screen, HandlerErr};
use crate::ipc::types::{AppState, Request};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Resolves `params.path` + `params.form` to a dialog, running the route
/// guard and, for `Access::Write`, the form's own role check.
fn with_form<'a>(
    state: &'a mut AppState,
    req: &Request,
    access: Access,
) -> Result<(Screen, &'a mut Form), HandlerErr> {
    let path = get_required_str(&req.params, "path")?;
    let key = get_required_str(&req.params, "form")?;
    let screen = require_screen(state, &path)?;
    let role = state.session.role();
    let form = state
        .screens
        .controller_mut(screen)
        .and_then(|ctl| ctl.form_mut(&key))
        .ok_or_else(|| HandlerErr::new("not_found", format!("no form {} on {}", key, path)))?;
    if access == Access::Write && !form.spec().allows(role) {
        return Err(HandlerErr::new(
            "unauthorized",
            format!("creating from {} is not available to this role", key),
        ));
    }
    Ok((screen, form))
}

fn handle_open(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let (screen, form) = with_form(state, req, Access::Write)?;
    form.open();
    Ok(screen_view(state, screen))
}

fn handle_close(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let (screen, form) = with_form(state, req, Access::Read)?;
    form.close();
    Ok(screen_view(state, screen))
}

fn handle_set(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let field = get_required_str(&req.params, "field")?;
    let value = req.params.get("value").cloned().unwrap_or(Value::Null);
    let (screen, form) = with_form(state, req, Access::Write)?;
    form.set(&field, &value)
        .map_err(|e| HandlerErr::new("bad_params", e.to_string()))?;
    Ok(screen_view(state, screen))
}

async fn handle_submit(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let key = get_required_str(&req.params, "form")?;
    let (screen, _) = with_form(state, req, Access::Write)?;

    let photo = get_optional_str(&req.params, "photoPath").map(PathBuf::from);
    match screen {
        Screen::Students => state.screens.students.set_photo(photo),
        Screen::Teachers => state.screens.teachers.set_photo(photo),
        _ => {}
    }

    let api = state.client();
    let role = state.session.role();
    let created = match state.screens.controller_mut(screen) {
        Some(ctl) => {
            ctl.set_viewer(role);
            ctl.submit_form(&key, &api, &mut state.notices).await
        }
        None => None,
    }
    .unwrap_or(false);

    let mut out = screen_view(state, screen);
    out["created"] = json!(created);
    Ok(out)
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "form.open" => handle_open(state, req),
        "form.close" => handle_close(state, req),
        "form.set" => handle_set(state, req),
        "form.submit" => handle_submit(state, req).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
