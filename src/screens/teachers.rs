use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{forms_view, upload_photo, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{search, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub const SEARCH_FIELDS: &[&str] = &["name", "employee_id", "email"];

pub static TEACHER_FORM: FormSpec = FormSpec {
    key: "teacher",
    success: "Teacher created successfully",
    failure: "Failed to create teacher",
    endpoint: "/teachers",
    fields: &[
        FieldSpec::text("employee_id").required(),
        FieldSpec::text("name").required(),
        FieldSpec::text("email").required(),
        FieldSpec::text("phone").required(),
        FieldSpec::text("qualification").required(),
        FieldSpec::text("specialization"),
        FieldSpec::new("date_of_joining", FieldKind::Date).required(),
        FieldSpec::new("subject_ids", FieldKind::List),
        FieldSpec::text("photo_url"),
    ],
    write_roles: &[Role::Admin],
};

pub struct TeachersScreen {
    teachers: RemoteCollection<Record>,
    subjects: RemoteCollection<Record>,
    search_term: String,
    photo: Option<PathBuf>,
    form: Form,
}

impl Default for TeachersScreen {
    fn default() -> Self {
        Self {
            teachers: RemoteCollection::new("teachers", "/teachers"),
            subjects: RemoteCollection::new("subjects", "/subjects"),
            search_term: String::new(),
            photo: None,
            form: Form::new(&TEACHER_FORM),
        }
    }
}

impl TeachersScreen {
    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn set_photo(&mut self, path: Option<PathBuf>) {
        self.photo = path;
    }

    pub fn filtered(&self) -> Vec<&Record> {
        search(self.teachers.items(), &self.search_term, SEARCH_FIELDS)
    }

    /// Subjects taught by `teacher`; ids without a matching subject are dropped.
    pub fn subjects_of(&self, teacher: &Record) -> Vec<&Record> {
        let ids = teacher.id_list("subject_ids");
        self.subjects
            .items()
            .iter()
            .filter(|s| ids.contains(&s.id()))
            .collect()
    }
}

#[async_trait]
impl ScreenController for TeachersScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.teachers.begin();
        self.subjects.begin();
        let (teachers, subjects) = futures::join!(self.teachers.load(api), self.subjects.load(api));
        self.teachers.settle(teachers, notices);
        self.subjects.settle(subjects, notices);
    }

    fn is_loading(&self) -> bool {
        self.teachers.is_loading() || self.subjects.is_loading()
    }

    fn view(&self) -> Value {
        let rows: Vec<Value> = self
            .filtered()
            .into_iter()
            .map(|t| {
                let names: Vec<&str> = self
                    .subjects_of(t)
                    .into_iter()
                    .filter_map(|s| s.text("name"))
                    .collect();
                t.with_fields([("subjectNames", json!(names))])
            })
            .collect();
        json!({
            "loading": self.is_loading(),
            "search": self.search_term,
            "teachers": rows,
            "total": self.teachers.items().len(),
            "subjects": self.subjects.items(),
            "photoPending": self.photo.is_some(),
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "teacher").then_some(&mut self.form)
    }

    async fn submit_form(&mut self, key: &str, api: &ApiClient, notices: &mut Notices) -> Option<bool> {
        if key != "teacher" {
            return None;
        }
        let mut extra = Map::new();
        if let Some(path) = self.photo.clone() {
            let Some(url) = upload_photo(api, &path, notices).await else {
                return Some(false);
            };
            extra.insert("photo_url".to_string(), Value::String(url));
        }
        let created = self.form.submit_with(api, notices, extra).await;
        if created {
            self.photo = None;
            self.activate(api, notices).await;
        }
        Some(created)
    }
}
