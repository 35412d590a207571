//! Screen controllers: one per management page.
//!
//! Each controller owns the remote collections its page shows, the create
//! dialogs it offers, and the joins/filters that turn raw records into the
//! view handed to the UI shell.

pub mod attendance;
pub mod classes;
pub mod dashboard;
pub mod exams;
pub mod finance;
pub mod parents;
pub mod school_years;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod timetable;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::ApiClient;
use crate::form::Form;
use crate::guard::Screen;
use crate::model::Role;
use crate::notify::Notices;

#[async_trait]
pub trait ScreenController: Send {
    /// Fetches everything the page needs, concurrently. Failures leave the
    /// affected collection empty and raise one notice each.
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices);

    fn is_loading(&self) -> bool;

    fn view(&self) -> Value;

    fn form_mut(&mut self, key: &str) -> Option<&mut Form>;

    /// Role of the signed-in user, set before every activation. Only pages
    /// whose backend endpoints are role-restricted care.
    fn set_viewer(&mut self, _role: Option<Role>) {}

    /// Re-fetch after `form` created a record.
    async fn refresh_after(&mut self, _form: &str, api: &ApiClient, notices: &mut Notices) {
        self.activate(api, notices).await;
    }

    /// Submits dialog `key`. `None` when the page has no such dialog,
    /// otherwise whether the record was created.
    async fn submit_form(&mut self, key: &str, api: &ApiClient, notices: &mut Notices) -> Option<bool> {
        let created = self.form_mut(key)?.submit(api, notices).await;
        if created {
            self.refresh_after(key, api, notices).await;
        }
        Some(created)
    }
}

#[derive(Default)]
pub struct Screens {
    pub dashboard: dashboard::DashboardScreen,
    pub school_years: school_years::SchoolYearsScreen,
    pub classes: classes::ClassesScreen,
    pub subjects: subjects::SubjectsScreen,
    pub students: students::StudentsScreen,
    pub teachers: teachers::TeachersScreen,
    pub parents: parents::ParentsScreen,
    pub timetable: timetable::TimetableScreen,
    pub attendance: attendance::AttendanceScreen,
    pub exams: exams::ExamsScreen,
    pub finance: finance::FinanceScreen,
}

impl Screens {
    /// `None` for pages without a controller (placeholders, auth pages).
    pub fn controller_mut(&mut self, screen: Screen) -> Option<&mut dyn ScreenController> {
        match screen {
            Screen::Dashboard => Some(&mut self.dashboard),
            Screen::SchoolYears => Some(&mut self.school_years),
            Screen::Classes => Some(&mut self.classes),
            Screen::Subjects => Some(&mut self.subjects),
            Screen::Students => Some(&mut self.students),
            Screen::Teachers => Some(&mut self.teachers),
            Screen::Parents => Some(&mut self.parents),
            Screen::Timetable => Some(&mut self.timetable),
            Screen::Attendance => Some(&mut self.attendance),
            Screen::Exams => Some(&mut self.exams),
            Screen::Finance => Some(&mut self.finance),
            Screen::Login
            | Screen::Register
            | Screen::Unauthorized
            | Screen::Users
            | Screen::Reports
            | Screen::Settings
            | Screen::MyClasses
            | Screen::Assignments
            | Screen::Grades
            | Screen::MyChildren => None,
        }
    }
}

/// Uploads a local photo and returns its stored URL. Any failure raises a
/// single notice and yields `None`.
pub async fn upload_photo(api: &ApiClient, path: &Path, notices: &mut Notices) -> Option<String> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(event = "photo_read_failed", path = %path.display(), error = %e);
            notices.error("Failed to upload photo");
            return None;
        }
    };
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string());
    match api.upload(&file_name, bytes).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(event = "photo_upload_failed", error = %e);
            notices.error("Failed to upload photo");
            None
        }
    }
}

/// Forms of one page, as a JSON map keyed by form key.
pub(crate) fn forms_view<'a>(forms: impl IntoIterator<Item = &'a Form>) -> Value {
    let map: serde_json::Map<String, Value> = forms
        .into_iter()
        .map(|f| (f.spec().key.to_string(), f.view()))
        .collect();
    Value::Object(map)
}
