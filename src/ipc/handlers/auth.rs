use serde_json::json;

use crate::api::ApiError;
use crate::guard::{DASHBOARD_PATH, LOGIN_PATH};
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::nav::menu_for;
use crate::session::Credentials;

pub fn session_json(state: &AppState) -> serde_json::Value {
    let role = state.session.role();
    json!({
        "authenticated": state.session.is_authenticated(),
        "user": state.session.current_user(),
        "role": role.map(|r| r.as_str()),
        "menu": menu_for(role),
    })
}

async fn handle_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let credentials = Credentials {
        username: get_required_str(&req.params, "username")?,
        password: get_required_str(&req.params, "password")?,
    };
    let api = state.api.clone();
    state.session.login(&api, &credentials).await?;
    // A fresh identity must not see the previous user's cached pages.
    state.screens = Default::default();
    state.persist_session();

    let mut out = session_json(state);
    out["redirect"] = json!(DASHBOARD_PATH);
    Ok(out)
}

fn handle_logout(state: &mut AppState) -> serde_json::Value {
    let was_active = state.end_session();
    json!({ "wasActive": was_active, "redirect": LOGIN_PATH })
}

async fn handle_me(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    if !state.session.is_authenticated() {
        return Err(HandlerErr::new("unauthenticated", "no active session")
            .with_details(json!({ "redirect": LOGIN_PATH })));
    }
    let api = state.api.clone();
    match state.session.refresh_user(&api).await {
        Ok(_) => {
            state.persist_session();
            Ok(session_json(state))
        }
        Err(ApiError::Authentication(msg)) => {
            state.end_session();
            Err(HandlerErr::new("unauthenticated", msg).with_details(json!({ "redirect": LOGIN_PATH })))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.login" => handle_login(state, req).await,
        "auth.logout" => Ok(handle_logout(state)),
        "auth.session" => Ok(session_json(state)),
        "auth.me" => handle_me(state).await,
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
