//! Daily attendance for one class section: roster, per-student status, and a
//! single batch submit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use super::ScreenController;
use crate::api::{ApiClient, ApiError};
use crate::form::Form;
use crate::model::{filter_by_fk, AttendanceStatus, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

/// Roles allowed to submit attendance.
pub const SUBMIT_ROLES: &[Role] = &[Role::Admin, Role::Teacher];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSelection {
    pub class_id: String,
    pub section_id: String,
    pub date: NaiveDate,
}

impl AttendanceSelection {
    fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

pub struct AttendanceScreen {
    classes: RemoteCollection<Record>,
    sections: RemoteCollection<Record>,
    roster: Vec<Record>,
    statuses: HashMap<String, AttendanceStatus>,
    stats: Option<Value>,
    selection: Option<AttendanceSelection>,
    date: NaiveDate,
}

impl Default for AttendanceScreen {
    fn default() -> Self {
        Self {
            classes: RemoteCollection::new("classes", "/classes"),
            sections: RemoteCollection::new("sections", "/sections"),
            roster: Vec::new(),
            statuses: HashMap::new(),
            stats: None,
            selection: None,
            date: Local::now().date_naive(),
        }
    }
}

/// Status for every roster student: the stored record for `date` when one
/// exists with a known status, else present.
pub fn merge_statuses(roster: &[Record], existing: &[Record], date: &str) -> HashMap<String, AttendanceStatus> {
    let mut stored: HashMap<&str, AttendanceStatus> = HashMap::new();
    for r in existing {
        let same_day = r.text("date").map(|d| d.starts_with(date)).unwrap_or(true);
        if !same_day {
            continue;
        }
        if let (Some(student), Some(status)) = (
            r.text("student_id"),
            r.text("status").and_then(AttendanceStatus::parse),
        ) {
            stored.insert(student, status);
        }
    }
    roster
        .iter()
        .map(|s| {
            let status = stored.get(s.id()).copied().unwrap_or(AttendanceStatus::Present);
            (s.id().to_string(), status)
        })
        .collect()
}

impl AttendanceScreen {
    pub fn selection(&self) -> Option<&AttendanceSelection> {
        self.selection.as_ref()
    }

    pub fn roster(&self) -> &[Record] {
        &self.roster
    }

    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.statuses.get(student_id).copied()
    }

    pub fn stats(&self) -> Option<&Value> {
        self.stats.as_ref()
    }

    /// Chooses class, section and date, then fetches roster, existing
    /// records and stats together. Each failed fetch raises its own notice.
    pub async fn select(
        &mut self,
        class_id: &str,
        section_id: &str,
        date: Option<NaiveDate>,
        api: &ApiClient,
        notices: &mut Notices,
    ) {
        if let Some(d) = date {
            self.date = d;
        }
        let sel = AttendanceSelection {
            class_id: class_id.to_string(),
            section_id: section_id.to_string(),
            date: self.date,
        };
        let scope = vec![
            ("class_id".to_string(), sel.class_id.clone()),
            ("section_id".to_string(), sel.section_id.clone()),
        ];
        let mut dated = scope.clone();
        dated.push(("date".to_string(), sel.date_str()));

        let (roster, existing, stats) = futures::join!(
            api.list::<Record>("/students", &scope),
            api.list::<Record>("/attendance", &dated),
            api.get_json("/attendance/stats", &scope)
        );

        self.roster = match roster {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(event = "attendance_roster_failed", error = %e);
                notices.error("Failed to fetch students");
                Vec::new()
            }
        };
        let existing = match existing {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(event = "attendance_records_failed", error = %e);
                notices.error("Failed to fetch attendance");
                Vec::new()
            }
        };
        self.stats = match stats {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(event = "attendance_stats_failed", error = %e);
                notices.error("Failed to fetch attendance stats");
                None
            }
        };
        self.statuses = merge_statuses(&self.roster, &existing, &sel.date_str());
        self.selection = Some(sel);
    }

    /// Sets one student's status. Returns false for a student not on the roster.
    pub fn mark(&mut self, student_id: &str, status: AttendanceStatus) -> bool {
        if !self.roster.iter().any(|s| s.id() == student_id) {
            return false;
        }
        self.statuses.insert(student_id.to_string(), status);
        true
    }

    /// Bulk body in roster order. `None` until a selection exists.
    pub fn submit_payload(&self) -> Option<Value> {
        let sel = self.selection.as_ref()?;
        let date = sel.date_str();
        let records: Vec<Value> = self
            .roster
            .iter()
            .map(|s| {
                let status = self.statuses.get(s.id()).copied().unwrap_or(AttendanceStatus::Present);
                json!({
                    "student_id": s.id(),
                    "class_id": sel.class_id,
                    "section_id": sel.section_id,
                    "date": date,
                    "status": status.as_str(),
                })
            })
            .collect();
        Some(json!({ "attendance_records": records }))
    }

    /// Posts the whole roster at once. All-or-nothing: one notice either way,
    /// stats re-fetched on success.
    pub async fn submit(&mut self, api: &ApiClient, notices: &mut Notices) -> bool {
        let Some(body) = self.submit_payload() else {
            notices.error("Select a class and section first");
            return false;
        };
        match api.post_json("/attendance/bulk", body).await {
            Ok(_) => {
                tracing::info!(event = "attendance_submitted", count = self.roster.len());
                notices.success("Attendance marked successfully");
                self.refresh_stats(api, notices).await;
                true
            }
            Err(e) => {
                notices.error(e.user_message("Failed to mark attendance"));
                false
            }
        }
    }

    async fn refresh_stats(&mut self, api: &ApiClient, notices: &mut Notices) {
        let Some(sel) = &self.selection else { return };
        let scope = [
            ("class_id".to_string(), sel.class_id.clone()),
            ("section_id".to_string(), sel.section_id.clone()),
        ];
        let outcome: Result<Value, ApiError> = api.get_json("/attendance/stats", &scope).await;
        match outcome {
            Ok(v) => self.stats = Some(v),
            Err(e) => {
                tracing::warn!(event = "attendance_stats_failed", error = %e);
                notices.error("Failed to fetch attendance stats");
            }
        }
    }

    fn counts(&self) -> Value {
        let mut present = 0;
        let mut absent = 0;
        let mut late = 0;
        for s in &self.roster {
            match self.statuses.get(s.id()) {
                Some(AttendanceStatus::Absent) => absent += 1,
                Some(AttendanceStatus::Late) => late += 1,
                _ => present += 1,
            }
        }
        json!({ "present": present, "absent": absent, "late": late, "total": self.roster.len() })
    }
}

#[async_trait]
impl ScreenController for AttendanceScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.classes.begin();
        self.sections.begin();
        let (classes, sections) = futures::join!(self.classes.load(api), self.sections.load(api));
        self.classes.settle(classes, notices);
        self.sections.settle(sections, notices);
    }

    fn is_loading(&self) -> bool {
        self.classes.is_loading() || self.sections.is_loading()
    }

    fn view(&self) -> Value {
        let sections: Vec<&Record> = match &self.selection {
            Some(sel) => filter_by_fk(self.sections.items(), "class_id", &sel.class_id),
            None => self.sections.items().iter().collect(),
        };
        let rows: Vec<Value> = self
            .roster
            .iter()
            .map(|s| {
                let status = self.statuses.get(s.id()).copied().unwrap_or(AttendanceStatus::Present);
                s.with_fields([("status", json!(status.as_str()))])
            })
            .collect();
        json!({
            "loading": self.is_loading(),
            "classes": self.classes.items(),
            "sections": sections,
            "date": self.date.format("%Y-%m-%d").to_string(),
            "selection": self.selection.as_ref().map(|s| json!({
                "classId": s.class_id,
                "sectionId": s.section_id,
                "date": s.date_str(),
            })),
            "students": rows,
            "counts": self.counts(),
            "stats": self.stats,
        })
    }

    fn form_mut(&mut self, _key: &str) -> Option<&mut Form> {
        None
    }
}
