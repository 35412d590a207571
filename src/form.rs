//! Create dialogs: a draft record edited field by field, validated and
//! serialized only when submitted.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::api::ApiClient;
use crate::model::Role;
use crate::notify::Notices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
    /// `YYYY-MM-DD`, sent as a string.
    Date,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initial {
    Empty,
    Fixed(&'static str),
    Today,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Initial,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: Initial::Empty,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_to(mut self, default: Initial) -> Self {
        self.default = default;
        self
    }

    fn empty_value(&self) -> FieldValue {
        match (self.kind, self.default) {
            (FieldKind::List, _) => FieldValue::List(Vec::new()),
            (FieldKind::Bool, Initial::Empty) => FieldValue::Text("false".to_string()),
            (_, Initial::Empty) => FieldValue::Text(String::new()),
            (_, Initial::Fixed(v)) => FieldValue::Text(v.to_string()),
            (_, Initial::Today) => {
                FieldValue::Text(Local::now().date_naive().format("%Y-%m-%d").to_string())
            }
        }
    }
}

/// Static description of one create dialog.
#[derive(Debug)]
pub struct FormSpec {
    pub key: &'static str,
    /// Toast text after a successful create.
    pub success: &'static str,
    /// Fallback toast text when the backend sends no `detail`.
    pub failure: &'static str,
    pub endpoint: &'static str,
    pub fields: &'static [FieldSpec],
    /// Roles allowed to submit; mirrors the backend's own check.
    pub write_roles: &'static [Role],
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn allows(&self, role: Option<Role>) -> bool {
        role.map(|r| self.write_roles.contains(&r)).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => json!(items),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
    #[error("{field} must be a date (YYYY-MM-DD)")]
    NotADate { field: &'static str },
    #[error("{field} has an unsupported value")]
    BadValue { field: &'static str },
}

/// A dialog's draft plus its open/closed state.
#[derive(Debug)]
pub struct Form {
    spec: &'static FormSpec,
    draft: BTreeMap<&'static str, FieldValue>,
    open: bool,
}

impl Form {
    pub fn new(spec: &'static FormSpec) -> Self {
        let mut form = Self {
            spec,
            draft: BTreeMap::new(),
            open: false,
        };
        form.reset();
        form
    }

    pub fn spec(&self) -> &'static FormSpec {
        self.spec
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Back to the empty shape, defaults included.
    pub fn reset(&mut self) {
        self.draft = self
            .spec
            .fields
            .iter()
            .map(|f| (f.name, f.empty_value()))
            .collect();
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.draft.get(field)
    }

    /// Stores raw input. No parsing happens here; numbers stay text until submit.
    pub fn set(&mut self, field: &str, raw: &Value) -> Result<(), FormError> {
        let spec = self
            .spec
            .field(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        let value = match (spec.kind, raw) {
            (FieldKind::List, Value::Array(items)) => FieldValue::List(
                items
                    .iter()
                    .map(|v| scalar_text(v).ok_or(FormError::BadValue { field: spec.name }))
                    .collect::<Result<_, _>>()?,
            ),
            (FieldKind::List, Value::Null) => FieldValue::List(Vec::new()),
            (FieldKind::List, v) => FieldValue::List(vec![
                scalar_text(v).ok_or(FormError::BadValue { field: spec.name })?
            ]),
            (_, Value::Null) => FieldValue::Text(String::new()),
            (_, v) => FieldValue::Text(scalar_text(v).ok_or(FormError::BadValue { field: spec.name })?),
        };
        self.draft.insert(spec.name, value);
        Ok(())
    }

    pub fn set_text(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        self.set(field, &Value::String(raw.to_string()))
    }

    /// Validates required fields and converts the draft to the create body.
    pub fn payload(&self) -> Result<Value, FormError> {
        let mut out = Map::new();
        for spec in self.spec.fields {
            let value = self
                .draft
                .get(spec.name)
                .cloned()
                .unwrap_or_else(|| spec.empty_value());
            if spec.required && value.is_blank() {
                return Err(FormError::Missing(spec.name));
            }
            out.insert(spec.name.to_string(), convert(spec, &value)?);
        }
        Ok(Value::Object(out))
    }

    pub fn view(&self) -> Value {
        let values: Map<String, Value> = self
            .draft
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        json!({
            "key": self.spec.key,
            "open": self.open,
            "values": values,
        })
    }

    pub async fn submit(&mut self, api: &ApiClient, notices: &mut Notices) -> bool {
        self.submit_with(api, notices, Map::new()).await
    }

    /// Submits the draft with `extra` fields merged over it (e.g. an uploaded
    /// photo URL). On success the dialog closes and the draft resets; on
    /// failure it stays open untouched.
    pub async fn submit_with(
        &mut self,
        api: &ApiClient,
        notices: &mut Notices,
        extra: Map<String, Value>,
    ) -> bool {
        let mut body = match self.payload() {
            Ok(v) => v,
            Err(e) => {
                notices.error(capitalize(&e.to_string()));
                return false;
            }
        };
        if let Value::Object(map) = &mut body {
            map.extend(extra);
        }

        match api.post_json(self.spec.endpoint, body).await {
            Ok(_) => {
                tracing::info!(event = "record_created", form = self.spec.key, endpoint = self.spec.endpoint);
                notices.success(self.spec.success);
                self.close();
                self.reset();
                true
            }
            Err(e) => {
                notices.error(e.user_message(self.spec.failure));
                false
            }
        }
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert(spec: &FieldSpec, value: &FieldValue) -> Result<Value, FormError> {
    let text = match value {
        FieldValue::List(items) => return Ok(json!(items)),
        FieldValue::Text(s) => s.trim(),
    };
    match spec.kind {
        FieldKind::Text | FieldKind::List => Ok(Value::String(text.to_string())),
        _ if text.is_empty() => Ok(Value::Null),
        FieldKind::Int => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| FormError::NotANumber { field: spec.name }),
        FieldKind::Float => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or(FormError::NotANumber { field: spec.name }),
        FieldKind::Bool => match text {
            "true" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(FormError::BadValue { field: spec.name }),
        },
        FieldKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| FormError::NotADate { field: spec.name }),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
