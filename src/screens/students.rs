use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{forms_view, upload_photo, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, FieldValue, Form, FormSpec};
use crate::model::{find_by_id, lookup_text, search, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub const SEARCH_FIELDS: &[&str] = &["name", "admission_number", "email"];

pub static STUDENT_FORM: FormSpec = FormSpec {
    key: "student",
    success: "Student created successfully",
    failure: "Failed to create student",
    endpoint: "/students",
    fields: &[
        FieldSpec::text("admission_number").required(),
        FieldSpec::text("name").required(),
        FieldSpec::text("email").required(),
        FieldSpec::text("phone"),
        FieldSpec::new("date_of_birth", FieldKind::Date).required(),
        FieldSpec::text("gender"),
        FieldSpec::text("address"),
        FieldSpec::text("class_id"),
        FieldSpec::text("section_id"),
        FieldSpec::new("parent_ids", FieldKind::List),
        FieldSpec::text("photo_url"),
    ],
    write_roles: &[Role::Admin],
};

pub struct StudentsScreen {
    students: RemoteCollection<Record>,
    classes: RemoteCollection<Record>,
    sections: RemoteCollection<Record>,
    parents: RemoteCollection<Record>,
    search_term: String,
    photo: Option<PathBuf>,
    form: Form,
}

impl Default for StudentsScreen {
    fn default() -> Self {
        Self {
            students: RemoteCollection::new("students", "/students"),
            classes: RemoteCollection::new("classes", "/classes"),
            sections: RemoteCollection::new("sections", "/sections"),
            parents: RemoteCollection::new("parents", "/parents"),
            search_term: String::new(),
            photo: None,
            form: Form::new(&STUDENT_FORM),
        }
    }
}

impl StudentsScreen {
    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn filtered(&self) -> Vec<&Record> {
        search(self.students.items(), &self.search_term, SEARCH_FIELDS)
    }

    /// Local file to upload as the photo on the next submit.
    pub fn set_photo(&mut self, path: Option<PathBuf>) {
        self.photo = path;
    }

    fn row(&self, s: &Record) -> Value {
        let parent_names: Vec<String> = s
            .id_list("parent_ids")
            .into_iter()
            .map(|id| lookup_text(self.parents.items(), id, "name"))
            .collect();
        s.with_fields([
            (
                "className",
                json!(lookup_text(self.classes.items(), s.text("class_id").unwrap_or(""), "name")),
            ),
            (
                "sectionName",
                json!(lookup_text(self.sections.items(), s.text("section_id").unwrap_or(""), "name")),
            ),
            ("parentNames", json!(parent_names)),
        ])
    }
}

#[async_trait]
impl ScreenController for StudentsScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.students.begin();
        self.classes.begin();
        self.sections.begin();
        self.parents.begin();
        let (students, classes, sections, parents) = futures::join!(
            self.students.load(api),
            self.classes.load(api),
            self.sections.load(api),
            self.parents.load(api)
        );
        self.students.settle(students, notices);
        self.classes.settle(classes, notices);
        self.sections.settle(sections, notices);
        self.parents.settle(parents, notices);
    }

    fn is_loading(&self) -> bool {
        self.students.is_loading()
            || self.classes.is_loading()
            || self.sections.is_loading()
            || self.parents.is_loading()
    }

    fn view(&self) -> Value {
        let rows: Vec<Value> = self.filtered().into_iter().map(|s| self.row(s)).collect();
        let selected_class = match self.form.value("class_id") {
            Some(FieldValue::Text(id)) => find_by_id(self.classes.items(), id),
            _ => None,
        };
        // Section picker follows the class chosen in the dialog.
        let section_options: Vec<&Record> = match selected_class {
            Some(c) => self
                .sections
                .items()
                .iter()
                .filter(|s| s.text("class_id") == Some(c.id()))
                .collect(),
            None => self.sections.items().iter().collect(),
        };
        json!({
            "loading": self.is_loading(),
            "search": self.search_term,
            "students": rows,
            "total": self.students.items().len(),
            "classes": self.classes.items(),
            "sectionOptions": section_options,
            "parents": self.parents.items(),
            "photoPending": self.photo.is_some(),
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "student").then_some(&mut self.form)
    }

    async fn submit_form(&mut self, key: &str, api: &ApiClient, notices: &mut Notices) -> Option<bool> {
        if key != "student" {
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
