use async_trait::async_trait;
use serde_json::{json, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub static SCHOOL_YEAR_FORM: FormSpec = FormSpec {
    key: "schoolYear",
    success: "School year created successfully",
    failure: "Failed to create school year",
    endpoint: "/school-years",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::new("start_date", FieldKind::Date).required(),
        FieldSpec::new("end_date", FieldKind::Date).required(),
        FieldSpec::new("is_current", FieldKind::Bool),
    ],
    write_roles: &[Role::Admin],
};

pub struct SchoolYearsScreen {
    years: RemoteCollection<Record>,
    form: Form,
}

impl Default for SchoolYearsScreen {
    fn default() -> Self {
        Self {
            years: RemoteCollection::new("school years", "/school-years"),
            form: Form::new(&SCHOOL_YEAR_FORM),
        }
    }
}

#[async_trait]
impl ScreenController for SchoolYearsScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        self.years.refresh(api, notices).await;
    }

    fn is_loading(&self) -> bool {
        self.years.is_loading()
    }

    fn view(&self) -> Value {
        let current = self
            .years
            .items()
            .iter()
            .find(|y| y.get("is_current").and_then(|v| v.as_bool()) == Some(true))
            .map(|y| y.id().to_string());
        json!({
            "loading": self.is_loading(),
            "schoolYears": self.years.items(),
            "currentId": current,
            "forms": forms_view([&self.form]),
        })
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        (key == "schoolYear").then_some(&mut self.form)
    }
}
