//! Shared plumbing for handlers: typed errors, param extraction and the
//! guard checks every screen-scoped method runs first.

use serde_json::{json, Value};

use super::error::err;
use super::types::AppState;
use crate::api::ApiError;
use crate::guard::{self, Resolution, Screen};
use crate::model::Role;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<ApiError> for HandlerErr {
    fn from(e: ApiError) -> Self {
        let details = e.status().map(|s| json!({ "status": s }));
        HandlerErr {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Runs the navigation guard for `path` and returns the screen it renders.
/// Redirects become errors carrying the redirect target.
pub fn require_screen(state: &AppState, path: &str) -> Result<Screen, HandlerErr> {
    match guard::resolve(path, state.session.current_user()) {
        Resolution::Render(screen) => Ok(screen),
        Resolution::Redirect(to) if to == guard::LOGIN_PATH => {
            Err(HandlerErr::new("unauthenticated", "sign in required")
                .with_details(json!({ "redirect": to })))
        }
        Resolution::Redirect(to) if to == guard::UNAUTHORIZED_PATH => Err(HandlerErr::new(
            "unauthorized",
            format!("{} is not available to this role", guard::normalize_path(path)),
        )
        .with_details(json!({ "redirect": to }))),
        Resolution::Redirect(to) => Err(HandlerErr::new(
            "not_found",
            format!("no screen at {}", guard::normalize_path(path)),
        )
        .with_details(json!({ "redirect": to }))),
    }
}

/// Write check for a mutation; nothing is sent to the backend on failure.
pub fn require_write(state: &AppState, roles: &[Role], action: &str) -> Result<(), HandlerErr> {
    match state.session.role() {
        Some(r) if roles.contains(&r) => Ok(()),
        _ => Err(HandlerErr::new(
            "unauthorized",
            format!("{} requires one of: {}", action, role_list(roles)),
        )),
    }
}

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
}
