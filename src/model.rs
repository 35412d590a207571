use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered in place of any foreign key that does not resolve.
pub const PLACEHOLDER: &str = "-";

/// A backend-owned entity, kept verbatim. The client only reads `id` and
/// foreign-key fields out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn id(&self) -> &str {
        self.text("id").unwrap_or("")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// String-valued ids held in a list field (`subject_ids`, `student_ids`).
    pub fn id_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// Copy of the record with extra derived fields merged in, for views.
    pub fn with_fields(&self, extra: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
        let mut map = self.0.clone();
        for (k, v) in extra {
            map.insert(k.to_string(), v);
        }
        Value::Object(map)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

pub fn find_by_id<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    if id.is_empty() {
        return None;
    }
    records.iter().find(|r| r.id() == id)
}

/// `field` of the record with `id`, or the placeholder.
pub fn lookup_text(records: &[Record], id: &str, field: &str) -> String {
    find_by_id(records, id)
        .and_then(|r| r.text(field))
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

/// Records whose `fk` field equals `id`.
pub fn filter_by_fk<'a>(records: &'a [Record], fk: &str, id: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| r.text(fk) == Some(id)).collect()
}

/// Case-insensitive substring match over `fields`; a blank term matches all.
pub fn search<'a>(records: &'a [Record], term: &str, fields: &[&str]) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            fields.iter().any(|f| {
                r.text(f)
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }
}

/// The signed-in account. `role` stays a string because the backend knows
/// more roles (accountant, librarian, ...) than the console has menus for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub section_id: String,
    #[serde(alias = "day")]
    pub day_of_week: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub subject_id: String,
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<AttendanceStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

/// Two-decimal rendering used for money and percentages.
pub fn format_amount(v: f64) -> String {
    format!("{:.2}", v)
}
