use async_trait::async_trait;
use serde_json::{json, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub static SUBJECT_FORM: FormSpec = FormSpec {
    key: "subject",
    success: "Subject created successfully",
    failure: "Failed to create subject",
    endpoint: "/subjects",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("code").required(),
        FieldSpec::text("description"),
        FieldSpec::new("credit_hours", FieldKind::Int).required(),
    ],
    write_roles: &[Role::Admin, Role::Teacher],
};

pub struct SubjectsScreen {
    subjects: RemoteCollection<Record>,
    form: Form,
}

impl Default for SubjectsScreen {
    fn default() -> Self {
        Self {
            subjects: RemoteCollection::new("subjects", "/subjects"),
            form: Form::new(&SUBJECT_FORM),
        }
    }
}

impl SubjectsScreen {
    pub fn subjects(&self) -> &[Record] {
        self.subjects.items()
    }
}

#[async_trait]
impl ScreenController for SubjectsScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.subjects.refresh(api, notices).await;
    }

    fn is_loading(&self) -> bool {
        self.subjects.is_loading()
    }

    fn view(&self) -> Value {
        json!({
            "loading": self.is_loading(),
            "subjects": self.subjects.items(),
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "subject").then_some(&mut self.form)
    }
}
