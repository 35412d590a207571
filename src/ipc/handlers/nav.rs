use serde_json::json;

use crate::guard::{self, Resolution};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::nav::menu_for;

fn handle_menu(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "items": menu_for(state.session.role()) }))
}

fn handle_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = req.params.get("path").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let result = match guard::resolve(path, state.session.current_user()) {
        Resolution::Render(screen) => {
            let route = guard::route_of(screen);
            json!({ "render": screen, "path": route.path, "title": route.title })
        }
        Resolution::Redirect(to) => json!({ "redirect": to }),
    };
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "nav.menu" => Some(handle_menu(state, req)),
        "route.resolve" => Some(handle_resolve(state, req)),
        _ => None,
    }
}
