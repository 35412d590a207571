//! Weekly timetable for one class section, shown as a day × slot grid.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldSpec, Form, FormSpec};
use crate::model::{filter_by_fk, lookup_text, Record, Role, TimetableEntry, PLACEHOLDER};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub const DAYS: [&str; 6] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

pub const TIME_SLOTS: [&str; 8] = [
    "08:00-09:00",
    "09:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "12:00-13:00",
    "13:00-14:00",
    "14:00-15:00",
    "15:00-16:00",
];

pub static ENTRY_FORM: FormSpec = FormSpec {
    key: "entry",
    success: "Timetable entry created successfully",
    failure: "Failed to create entry",
    endpoint: "/timetable",
    fields: &[
        FieldSpec::text("class_id").required(),
        FieldSpec::text("section_id").required(),
        FieldSpec::text("subject_id").required(),
        FieldSpec::text("teacher_id").required(),
        FieldSpec::text("day_of_week").required(),
        FieldSpec::text("start_time").required(),
        FieldSpec::text("end_time").required(),
        FieldSpec::text("room_number"),
    ],
    write_roles: &[Role::Admin],
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub class_id: String,
    pub section_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub day: &'static str,
    pub entry_id: Option<String>,
    pub subject: String,
    pub teacher: String,
    pub room: Option<String>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.entry_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub slot: &'static str,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing sent; the UI must ask the user first.
    NeedsConfirmation,
    Deleted,
    Failed,
}

/// `09:00:00` and `9:00` both compare as `09:00`.
fn clock_key(t: &str) -> String {
    let mut parts = t.trim().split(':');
    let h = parts.next().unwrap_or("").trim();
    let m = parts.next().unwrap_or("00").trim();
    match (h.parse::<u32>(), m.parse::<u32>()) {
        (Ok(h), Ok(m)) => format!("{:02}:{:02}", h, m),
        _ => t.trim().to_string(),
    }
}

fn slot_start(slot: &str) -> &str {
    slot.split('-').next().unwrap_or(slot)
}

/// First entry scheduled on `day` starting at the beginning of `slot`.
pub fn entry_for_slot<'a>(entries: &'a [TimetableEntry], day: &str, slot: &str) -> Option<&'a TimetableEntry> {
    let start = clock_key(slot_start(slot));
    entries
        .iter()
        .find(|e| e.day_of_week.eq_ignore_ascii_case(day) && clock_key(&e.start_time) == start)
}

/// Builds the fixed 8-row × 6-column grid. Subject/teacher ids that do not
/// resolve show the placeholder.
pub fn build_grid(entries: &[TimetableEntry], subjects: &[Record], teachers: &[Record]) -> Vec<GridRow> {
    TIME_SLOTS
        .iter()
        .map(|&slot| GridRow {
            slot,
            cells: DAYS
                .iter()
                .map(|&day| match entry_for_slot(entries, day, slot) {
                    Some(e) => Cell {
                        day,
                        entry_id: Some(e.id.clone()),
                        subject: lookup_text(subjects, &e.subject_id, "name"),
                        teacher: lookup_text(teachers, &e.teacher_id, "name"),
                        room: e.room_number.clone(),
                    },
                    None => Cell {
                        day,
                        entry_id: None,
                        subject: PLACEHOLDER.to_string(),
                        teacher: PLACEHOLDER.to_string(),
                        room: None,
                    },
                })
                .collect(),
        })
        .collect()
}

pub struct TimetableScreen {
    classes: RemoteCollection<Record>,
    sections: RemoteCollection<Record>,
    subjects: RemoteCollection<Record>,
    teachers: RemoteCollection<Record>,
    entries: RemoteCollection<TimetableEntry>,
    selection: Option<Selection>,
    form: Form,
}

impl Default for TimetableScreen {
    fn default() -> Self {
        Self {
            classes: RemoteCollection::new("classes", "/classes"),
            sections: RemoteCollection::new("sections", "/sections"),
            subjects: RemoteCollection::new("subjects", "/subjects"),
            teachers: RemoteCollection::new("teachers", "/teachers"),
            entries: RemoteCollection::new("timetable", "/timetable"),
            selection: None,
            form: Form::new(&ENTRY_FORM),
        }
    }
}

impl TimetableScreen {
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        self.entries.items()
    }

    pub fn grid(&self) -> Vec<GridRow> {
        build_grid(self.entries.items(), self.subjects.items(), self.teachers.items())
    }

    /// Picks the class section to show and fetches its entries.
    pub async fn select(&mut self, class_id: &str, section_id: &str, api: &ApiClient, notices: &mut Notices) {
        self.selection = Some(Selection {
            class_id: class_id.to_string(),
            section_id: section_id.to_string(),
        });
        self.entries.set_query(vec![
            ("class_id".to_string(), class_id.to_string()),
            ("section_id".to_string(), section_id.to_string()),
        ]);
        self.entries.refresh(api, notices).await;
    }

    async fn refresh_entries(&mut self, api: &ApiClient, notices: &mut Notices) {
        if self.selection.is_some() {
            self.entries.refresh(api, notices).await;
        }
    }

    pub async fn delete(
        &mut self,
        entry_id: &str,
        confirmed: bool,
        api: &ApiClient,
        notices: &mut Notices,
    ) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::NeedsConfirmation;
        }
        match api.delete(&format!("/timetable/{}", entry_id)).await {
            Ok(()) => {
                tracing::info!(event = "timetable_entry_deleted", entry_id);
                notices.success("Entry deleted successfully");
                self.refresh_entries(api, notices).await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(event = "timetable_delete_failed", entry_id, error = %e);
                notices.error("Failed to delete entry");
                DeleteOutcome::Failed
            }
        }
    }
}

#[async_trait]
impl ScreenController for TimetableScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.classes.begin();
        self.sections.begin();
        self.subjects.begin();
        self.teachers.begin();
        let (classes, sections, subjects, teachers) = futures::join!(
            self.classes.load(api),
            self.sections.load(api),
            self.subjects.load(api),
            self.teachers.load(api)
        );
        self.classes.settle(classes, notices);
        self.sections.settle(sections, notices);
        self.subjects.settle(subjects, notices);
        self.teachers.settle(teachers, notices);
        self.refresh_entries(api, notices).await;
    }

    fn is_loading(&self) -> bool {
        self.classes.is_loading()
            || self.sections.is_loading()
            || self.subjects.is_loading()
            || self.teachers.is_loading()
    }

    fn view(&self) -> Value {
        let sections: Vec<&Record> = match &self.selection {
            Some(sel) => filter_by_fk(self.sections.items(), "class_id", &sel.class_id),
            None => Vec::new(),
        };
        json!({
            "loading": self.is_loading(),
            "days": DAYS,
            "slots": TIME_SLOTS,
            "selection": self.selection,
            "classes": self.classes.items(),
            "sections": sections,
            "subjects": self.subjects.items(),
            "teachers": self.teachers.items(),
            "grid": self.selection.as_ref().map(|_| self.grid()),
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "entry").then_some(&mut self.form)
    }

    async fn refresh_after(&mut self, _form: &str, api: &ApiClient, notices: &mut Notices) {
        self.refresh_entries(api, notices).await;
    }
}
