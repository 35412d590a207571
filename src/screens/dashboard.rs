use async_trait::async_trait;
use serde_json::{json, Value};

use super::ScreenController;
use crate::api::ApiClient;
use crate::form::Form;
use crate::notify::Notices;

/// Landing page. The counters are whatever `/dashboard/stats` returns.
#[derive(Debug, Default)]
pub struct DashboardScreen {
    stats: Option<Value>,
    loading: bool,
}

impl DashboardScreen {
    pub fn stats(&self) -> Option<&Value> {
        self.stats.as_ref()
    }
}

#[async_trait]
impl ScreenController for DashboardScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.loading = true;
        let outcome = api.get_json("/dashboard/stats", &[]).await;
        self.loading = false;
        match outcome {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => {
                tracing::warn!(event = "dashboard_stats_failed", error = %e);
                self.stats = None;
                notices.error("Failed to fetch dashboard stats");
            }
        }
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn view(&self) -> Value {
        json!({ "loading": self.loading, "stats": self.stats })
    }

    fn form_mut(&mut self, _key: &str) -> Option<&mut Form> {
        None
    }
}
