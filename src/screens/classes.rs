use async_trait::async_trait;
use serde_json::{json, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{filter_by_fk, lookup_text, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub static CLASS_FORM: FormSpec = FormSpec {
    key: "class",
    success: "Class created successfully",
    failure: "Failed to create class",
    endpoint: "/classes",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::new("grade_level", FieldKind::Int).required(),
    ],
    write_roles: &[Role::Admin],
};

pub static SECTION_FORM: FormSpec = FormSpec {
    key: "section",
    success: "Section created successfully",
    failure: "Failed to create section",
    endpoint: "/sections",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("class_id").required(),
        FieldSpec::new("capacity", FieldKind::Int).required(),
    ],
    write_roles: &[Role::Admin],
};

pub struct ClassesScreen {
    classes: RemoteCollection<Record>,
    sections: RemoteCollection<Record>,
    class_form: Form,
    section_form: Form,
}

impl Default for ClassesScreen {
    fn default() -> Self {
        Self {
            classes: RemoteCollection::new("classes", "/classes"),
            sections: RemoteCollection::new("sections", "/sections"),
            class_form: Form::new(&CLASS_FORM),
            section_form: Form::new(&SECTION_FORM),
        }
    }
}

impl ClassesScreen {
    pub fn classes(&self) -> &[Record] {
        self.classes.items()
    }

    pub fn sections(&self) -> &[Record] {
        self.sections.items()
    }

    pub fn sections_for(&self, class_id: &str) -> Vec<&Record> {
        filter_by_fk(self.sections.items(), "class_id", class_id)
    }
}

#[async_trait]
impl ScreenController for ClassesScreen {
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
        let classes: Vec<Value> = self
            .classes
            .items()
            .iter()
            .map(|c| {
                let names: Vec<&str> = self
                    .sections_for(c.id())
                    .into_iter()
                    .filter_map(|s| s.text("name"))
                    .collect();
                c.with_fields([("sectionNames", json!(names))])
            })
            .collect();
        let sections: Vec<Value> = self
            .sections
            .items()
            .iter()
            .map(|s| {
                let class_name = lookup_text(self.classes.items(), s.text("class_id").unwrap_or(""), "name");
                s.with_fields([("className", json!(class_name))])
            })
            .collect();
        json!({
            "loading": self.is_loading(),
            "classes": classes,
            "sections": sections,
            "forms": forms_view([&self.class_form, &self.section_form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        match key {
            "class" => Some(&mut self.class_form),
            "section" => Some(&mut self.section_form),
            _ => None,
        }
    }
}
