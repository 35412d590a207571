use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::api::ApiClient;
use crate::notify::Notices;
use crate::screens::Screens;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Unauthenticated client; see [`AppState::client`].
    pub api: ApiClient,
    pub session: Session,
    pub screens: Screens,
    pub notices: Notices,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            workspace: None,
            db: None,
            api,
            session: Session::default(),
            screens: Screens::default(),
            notices: Notices::default(),
        }
    }

    /// Client carrying the current session's bearer token.
    pub fn client(&self) -> ApiClient {
        self.api.with_token(self.session.token().map(|t| t.to_string()))
    }

    /// Writes the session to the workspace store, if one is open. Store
    /// failures are logged; the in-memory session stays authoritative.
    pub fn persist_session(&self) {
        let Some(conn) = &self.db else { return };
        if let Err(e) = self.session.persist(conn) {
            tracing::warn!(event = "session_persist_failed", error = %e);
        }
    }

    /// Ends the session everywhere: memory, store and every screen's cache.
    pub fn end_session(&mut self) -> bool {
        let was_active = self.session.logout();
        self.persist_session();
        self.screens = Screens::default();
        was_active
    }
}
