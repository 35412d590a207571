use thiserror::Error;

/// Failure classes for a call against the school backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were rejected (or the token is no longer accepted).
    #[error("{0}")]
    Authentication(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// A success response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided `detail` message, when the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Authentication(msg) => Some(msg.as_str()),
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "auth_failed",
            ApiError::Rejected { .. } => "rejected",
            ApiError::Transport(_) => "network_error",
            ApiError::Decode(_) => "decode_failed",
        }
    }

    /// Message shown to the user: the server's detail, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail()
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.to_string())
            .unwrap_or_else(|| fallback.to_string())
    }
}
