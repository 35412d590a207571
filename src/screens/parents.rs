use async_trait::async_trait;
use serde_json::{json, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{lookup_text, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub static PARENT_FORM: FormSpec = FormSpec {
    key: "parent",
    success: "Parent created successfully",
    failure: "Failed to create parent",
    endpoint: "/parents",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("phone").required(),
        FieldSpec::text("email"),
        FieldSpec::text("address"),
        FieldSpec::text("occupation"),
        FieldSpec::new("student_ids", FieldKind::List),
    ],
    write_roles: &[Role::Admin],
};

pub struct ParentsScreen {
    parents: RemoteCollection<Record>,
    students: RemoteCollection<Record>,
    form: Form,
}

impl Default for ParentsScreen {
    fn default() -> Self {
        Self {
            parents: RemoteCollection::new("parents", "/parents"),
            students: RemoteCollection::new("students", "/students"),
            form: Form::new(&PARENT_FORM),
        }
    }
}

#[async_trait]
impl ScreenController for ParentsScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.parents.begin();
        self.students.begin();
        let (parents, students) = futures::join!(self.parents.load(api), self.students.load(api));
        self.parents.settle(parents, notices);
        self.students.settle(students, notices);
    }

    fn is_loading(&self) -> bool {
        self.parents.is_loading() || self.students.is_loading()
    }

    fn view(&self) -> Value {
        let rows: Vec<Value> = self
            .parents
            .items()
            .iter()
            .map(|p| {
                let children: Vec<String> = p
                    .id_list("student_ids")
                    .into_iter()
                    .map(|id| lookup_text(self.students.items(), id, "name"))
                    .collect();
                p.with_fields([("childrenNames", json!(children))])
            })
            .collect();
        json!({
            "loading": self.is_loading(),
            "parents": rows,
            "students": self.students.items(),
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "parent").then_some(&mut self.form)
    }
}
