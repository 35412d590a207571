use serde::de::DeserializeOwned;

use crate::api::{ApiClient, ApiError};
use crate::notify::Notices;

/// Client-side mirror of one backend collection endpoint.
///
/// The mirror is only ever replaced wholesale: after a mutation the owning
/// screen re-fetches instead of patching items in place. A failed fetch
/// leaves the collection empty and raises exactly one notice.
#[derive(Debug, Clone)]
pub struct RemoteCollection<T> {
    label: &'static str,
    endpoint: &'static str,
    query: Vec<(String, String)>,
    items: Vec<T>,
    loading: bool,
}

impl<T: DeserializeOwned> RemoteCollection<T> {
    pub fn new(label: &'static str, endpoint: &'static str) -> Self {
        Self {
            label,
            endpoint,
            query: Vec::new(),
            items: Vec::new(),
            loading: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_query(&mut self, query: Vec<(String, String)>) {
        self.query = query;
    }

    /// Marks the collection as in flight. Pair with [`Self::settle`].
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Issues the GET without touching local state, so several collections
    /// can be fetched concurrently and settled afterwards.
    pub async fn load(&self, api: &ApiClient) -> Result<Vec<T>, ApiError> {
        api.list(self.endpoint, &self.query).await
    }

    /// Applies a fetch outcome. Returns whether it succeeded.
    pub fn settle(&mut self, outcome: Result<Vec<T>, ApiError>, notices: &mut Notices) -> bool {
        self.loading = false;
        match outcome {
            Ok(items) => {
                tracing::debug!(event = "collection_loaded", endpoint = self.endpoint, count = items.len());
                self.items = items;
                true
            }
            Err(e) => {
                tracing::warn!(event = "collection_failed", endpoint = self.endpoint, error = %e);
                self.items.clear();
                notices.error(format!("Failed to fetch {}", self.label));
                false
            }
        }
    }

    pub async fn refresh(&mut self, api: &ApiClient, notices: &mut Notices) -> bool {
        self.begin();
        let outcome = self.load(api).await;
        self.settle(outcome, notices)
    }
}
