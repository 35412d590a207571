//! The signed-in identity shared by every screen.
//!
//! Written only by login/logout/restore; everything else reads it through
//! `AppState`.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ApiClient, ApiError};
use crate::db;
use crate::model::{Role, User};

const SESSION_KEY: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: User,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

#[derive(Debug, Default)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|u| u.role())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Exchanges credentials for a token. The previous session, if any, is
    /// kept untouched when the exchange fails.
    pub async fn login(&mut self, api: &ApiClient, credentials: &Credentials) -> Result<&User, ApiError> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let resp = match api.with_token(None).post_json("/auth/login", body).await {
            Ok(v) => v,
            Err(ApiError::Rejected { status, detail }) if status == 401 || status == 403 => {
                return Err(ApiError::Authentication(
                    detail.unwrap_or_else(|| "Login failed".to_string()),
                ));
            }
            Err(e) => return Err(e),
        };
        let token: TokenResponse =
            serde_json::from_value(resp).map_err(|e| ApiError::Decode(e.to_string()))?;

        tracing::info!(event = "login", user_id = %token.user.id, role = %token.user.role);
        self.token = Some(token.access_token);
        Ok(self.user.insert(token.user))
    }

    /// Clears identity and token. Returns whether a session was active.
    pub fn logout(&mut self) -> bool {
        let was_active = self.user.is_some() || self.token.is_some();
        if was_active {
            tracing::info!(event = "logout");
        }
        self.user = None;
        self.token = None;
        was_active
    }

    /// Re-reads the user record behind the current token. A rejected token
    /// ends the session.
    pub async fn refresh_user(&mut self, api: &ApiClient) -> Result<&User, ApiError> {
        let client = api.with_token(self.token.clone());
        match client.get_json("/auth/me", &[]).await {
            Ok(v) => {
                let user: User =
                    serde_json::from_value(v).map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(self.user.insert(user))
            }
            Err(ApiError::Rejected { status: 401, detail }) => {
                self.logout();
                Err(ApiError::Authentication(
                    detail.unwrap_or_else(|| "Session expired".to_string()),
                ))
            }
            Err(e) => Err(e),
        }
    }

    pub fn persist(&self, conn: &Connection) -> anyhow::Result<()> {
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => {
                let stored = StoredSession {
                    token: token.clone(),
                    user: user.clone(),
                };
                db::settings_set_json(conn, SESSION_KEY, &serde_json::to_value(stored)?)
            }
            _ => db::settings_delete(conn, SESSION_KEY).map(|_| ()),
        }
    }

    /// Loads a persisted session. Returns whether one was found.
    pub fn restore(&mut self, conn: &Connection) -> anyhow::Result<bool> {
        let Some(raw) = db::settings_get_json(conn, SESSION_KEY)? else {
            return Ok(false);
        };
        let stored: StoredSession = match serde_json::from_value(raw) {
            Ok(s) => s,
            Err(e) => {
                // Unreadable entry from an older build; drop it.
                tracing::warn!(event = "session_restore_discarded", error = %e);
                db::settings_delete(conn, SESSION_KEY)?;
                return Ok(false);
            }
        };
        tracing::info!(event = "session_restored", user_id = %stored.user.id);
        self.token = Some(stored.token);
        self.user = Some(stored.user);
        Ok(true)
    }
}
