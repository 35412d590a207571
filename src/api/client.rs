use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::transport::{ApiRequest, Body, Method, Transport};

/// Authenticated view of the backend. Cheap to clone; the token is fixed per
/// instance so a stale client cannot outlive a logout.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            token: None,
        }
    }

    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            token,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.execute(Method::Get, path, query.to_vec(), Body::Empty)
            .await
    }

    /// GET a collection endpoint; the body must be an array of `T`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, ApiError> {
        let body = self.get_json(path, query).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(Method::Post, path, Vec::new(), Body::Json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::Delete, path, Vec::new(), Body::Empty)
            .await
            .map(|_| ())
    }

    /// Multipart upload to the generic file endpoint; returns the stored URL.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let body = self
            .execute(
                Method::Post,
                "/upload",
                Vec::new(),
                Body::File {
                    file_name: file_name.to_string(),
                    bytes,
                },
            )
            .await?;
        body.get("url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::Decode("upload response has no url".to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Body,
    ) -> Result<Value, ApiError> {
        let req = ApiRequest {
            method,
            path: path.to_string(),
            query,
            body,
            bearer: self.token.clone(),
        };
        let resp = self.transport.send(req).await?;
        if resp.is_success() {
            return Ok(resp.body);
        }
        let detail = resp
            .body
            .get("detail")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        tracing::warn!(event = "api_rejected", path, status = resp.status, detail = ?detail);
        Err(ApiError::Rejected {
            status: resp.status,
            detail,
        })
    }
}
