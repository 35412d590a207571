//! Exam types, schedules, marks, grade rules and per-student report cards.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec};
use crate::model::{find_by_id, format_amount, lookup_text, Record, Role, PLACEHOLDER};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

pub static EXAM_TYPE_FORM: FormSpec = FormSpec {
    key: "examType",
    success: "Exam type created successfully",
    failure: "Failed to create exam type",
    endpoint: "/exam-types",
    fields: &[FieldSpec::text("name").required(), FieldSpec::text("description")],
    write_roles: &[Role::Admin],
};

pub static EXAM_SCHEDULE_FORM: FormSpec = FormSpec {
    key: "examSchedule",
    success: "Exam scheduled successfully",
    failure: "Failed to schedule exam",
    endpoint: "/exam-schedules",
    fields: &[
        FieldSpec::text("exam_type_id").required(),
        FieldSpec::text("class_id").required(),
        FieldSpec::text("subject_id").required(),
        FieldSpec::new("exam_date", FieldKind::Date).required(),
        FieldSpec::text("start_time").required(),
        FieldSpec::text("end_time").required(),
        FieldSpec::new("total_marks", FieldKind::Float).required(),
        FieldSpec::new("passing_marks", FieldKind::Float).required(),
    ],
    write_roles: &[Role::Admin],
};

pub static MARKS_FORM: FormSpec = FormSpec {
    key: "marks",
    success: "Marks entered successfully",
    failure: "Failed to enter marks",
    endpoint: "/marks",
    fields: &[
        FieldSpec::text("exam_schedule_id").required(),
        FieldSpec::text("student_id").required(),
        FieldSpec::new("marks_obtained", FieldKind::Float).required(),
    ],
    write_roles: &[Role::Admin, Role::Teacher],
};

pub static GRADE_RULE_FORM: FormSpec = FormSpec {
    key: "gradeRule",
    success: "Grade rule created successfully",
    failure: "Failed to create grade rule",
    endpoint: "/grade-rules",
    fields: &[
        FieldSpec::text("grade").required(),
        FieldSpec::new("min_percentage", FieldKind::Float).required(),
        FieldSpec::new("max_percentage", FieldKind::Float).required(),
        FieldSpec::text("description"),
    ],
    write_roles: &[Role::Admin],
};

/// Server-computed report card plus display strings. The raw body is kept
/// as-is; both the `results`/`grade` and `marks`/`overall_grade` shapes are read.
pub fn render_report_card(raw: &Value, classes: &[Record]) -> Value {
    let student = raw.get("student").cloned().unwrap_or(Value::Null);
    let class_name = student
        .get("class_id")
        .and_then(|v| v.as_str())
        .map(|id| lookup_text(classes, id, "name"));
    let rows: Vec<Value> = raw
        .get("results")
        .or_else(|| raw.get("marks"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|row| {
                    let mut row = row.as_object().cloned().unwrap_or_default();
                    if let Some(p) = row.get("percentage").and_then(|v| v.as_f64()) {
                        row.insert("percentageText".to_string(), json!(format!("{}%", format_amount(p))));
                    }
                    Value::Object(row)
                })
                .collect()
        })
        .unwrap_or_default();
    let overall = raw.get("overall_percentage").and_then(|v| v.as_f64());
    let grade = raw
        .get("overall_grade")
        .or_else(|| raw.get("grade"))
        .cloned()
        .unwrap_or(Value::Null);
    json!({
        "raw": raw,
        "student": student,
        "className": class_name,
        "rows": rows,
        "overallPercentage": overall.map(|p| format!("{}%", format_amount(p))),
        "grade": grade,
    })
}

pub struct ExamsScreen {
    exam_types: RemoteCollection<Record>,
    schedules: RemoteCollection<Record>,
    marks: RemoteCollection<Record>,
    grade_rules: RemoteCollection<Record>,
    classes: RemoteCollection<Record>,
    subjects: RemoteCollection<Record>,
    students: RemoteCollection<Record>,
    exam_type_form: Form,
    schedule_form: Form,
    marks_form: Form,
    grade_rule_form: Form,
    report_card: Option<Value>,
}

impl Default for ExamsScreen {
    fn default() -> Self {
        Self {
            exam_types: RemoteCollection::new("exam types", "/exam-types"),
            schedules: RemoteCollection::new("exam schedules", "/exam-schedules"),
            marks: RemoteCollection::new("marks", "/marks"),
            grade_rules: RemoteCollection::new("grade rules", "/grade-rules"),
            classes: RemoteCollection::new("classes", "/classes"),
            subjects: RemoteCollection::new("subjects", "/subjects"),
            students: RemoteCollection::new("students", "/students"),
            exam_type_form: Form::new(&EXAM_TYPE_FORM),
            schedule_form: Form::new(&EXAM_SCHEDULE_FORM),
            marks_form: Form::new(&MARKS_FORM),
            grade_rule_form: Form::new(&GRADE_RULE_FORM),
            report_card: None,
        }
    }
}

impl ExamsScreen {
    pub fn report_card(&self) -> Option<&Value> {
        self.report_card.as_ref()
    }

    /// Fetches and renders the report card of `student_id`, optionally
    /// restricted to one exam type. Returns whether one is now shown.
    pub async fn load_report_card(
        &mut self,
        student_id: &str,
        exam_type_id: Option<&str>,
        api: &ApiClient,
        notices: &mut Notices,
    ) -> bool {
        if student_id.trim().is_empty() {
            notices.error("Please select a student");
            return false;
        }
        let query: Vec<(String, String)> = exam_type_id
            .filter(|id| !id.is_empty())
            .map(|id| vec![("exam_type_id".to_string(), id.to_string())])
            .unwrap_or_default();
        match api.get_json(&format!("/report-card/{}", student_id), &query).await {
            Ok(raw) => {
                self.report_card = Some(render_report_card(&raw, self.classes.items()));
                true
            }
            Err(e) => {
                tracing::warn!(event = "report_card_failed", student_id, error = %e);
                notices.error("Failed to fetch report card");
                false
            }
        }
    }

    pub fn close_report_card(&mut self) {
        self.report_card = None;
    }

    fn schedule_row(&self, s: &Record) -> Value {
        let fk = |field: &str| s.text(field).unwrap_or("").to_string();
        s.with_fields([
            ("examTypeName", json!(lookup_text(self.exam_types.items(), &fk("exam_type_id"), "name"))),
            ("className", json!(lookup_text(self.classes.items(), &fk("class_id"), "name"))),
            ("subjectName", json!(lookup_text(self.subjects.items(), &fk("subject_id"), "name"))),
        ])
    }

    fn mark_row(&self, m: &Record) -> Value {
        let schedule = find_by_id(self.schedules.items(), m.text("exam_schedule_id").unwrap_or(""));
        // Subject and exam type hang off the schedule, not the mark.
        let via_schedule = |fk: &str, records: &[Record]| {
            schedule
                .and_then(|s| s.text(fk))
                .map(|id| lookup_text(records, id, "name"))
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };
        m.with_fields([
            (
                "studentName",
                json!(lookup_text(self.students.items(), m.text("student_id").unwrap_or(""), "name")),
            ),
            ("subjectName", json!(via_schedule("subject_id", self.subjects.items()))),
            ("examTypeName", json!(via_schedule("exam_type_id", self.exam_types.items()))),
        ])
    }
}

#[async_trait]
impl ScreenController for ExamsScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        for c in [
            &mut self.exam_types,
            &mut self.schedules,
            &mut self.marks,
            &mut self.grade_rules,
            &mut self.classes,
            &mut self.subjects,
            &mut self.students,
        ] {
            c.begin();
        }
        let (exam_types, schedules, marks, grade_rules, classes, subjects, students) = futures::join!(
            self.exam_types.load(api),
            self.schedules.load(api),
            self.marks.load(api),
            self.grade_rules.load(api),
            self.classes.load(api),
            self.subjects.load(api),
            self.students.load(api)
        );
        self.exam_types.settle(exam_types, notices);
        self.schedules.settle(schedules, notices);
        self.marks.settle(marks, notices);
        self.grade_rules.settle(grade_rules, notices);
        self.classes.settle(classes, notices);
        self.subjects.settle(subjects, notices);
        self.students.settle(students, notices);
    }

    fn is_loading(&self) -> bool {
        self.exam_types.is_loading()
            || self.schedules.is_loading()
            || self.marks.is_loading()
            || self.grade_rules.is_loading()
            || self.classes.is_loading()
            || self.subjects.is_loading()
            || self.students.is_loading()
    }

    fn view(&self) -> Value {
        let schedules: Vec<Value> = self.schedules.items().iter().map(|s| self.schedule_row(s)).collect();
        let marks: Vec<Value> = self.marks.items().iter().map(|m| self.mark_row(m)).collect();
        let mut out = Map::new();
        out.insert("loading".into(), json!(self.is_loading()));
        out.insert("examTypes".into(), json!(self.exam_types.items()));
        out.insert("schedules".into(), json!(schedules));
        out.insert("marks".into(), json!(marks));
        out.insert("gradeRules".into(), json!(self.grade_rules.items()));
        out.insert("classes".into(), json!(self.classes.items()));
        out.insert("subjects".into(), json!(self.subjects.items()));
        out.insert("students".into(), json!(self.students.items()));
        out.insert("reportCard".into(), json!(self.report_card));
        out.insert(
            "forms".into(),
            forms_view([
                &self.exam_type_form,
                &self.schedule_form,
                &self.marks_form,
                &self.grade_rule_form,
            ]),
        );
        Value::Object(out)
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        match key {
            "examType" => Some(&mut self.exam_type_form),
            "examSchedule" => Some(&mut self.schedule_form),
            "marks" => Some(&mut self.marks_form),
            "gradeRule" => Some(&mut self.grade_rule_form),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_card_reads_either_response_shape() {
        let classes: Vec<Record> = serde_json::from_value(json!([{"id": "c1", "name": "Grade 10"}])).expect("classes");
        let backend = json!({
            "student": {"id": "s1", "name": "Ada", "class_id": "c1"},
            "results": [{"subject_name": "Maths", "percentage": 87.5}],
            "overall_percentage": 87.456,
            "grade": "A",
        });
        let card = render_report_card(&backend, &classes);
        assert_eq!(card["className"], json!("Grade 10"));
        assert_eq!(card["rows"][0]["percentageText"], json!("87.50%"));
        assert_eq!(card["overallPercentage"], json!("87.46%"));
        assert_eq!(card["grade"], json!("A"));
        assert_eq!(card["raw"], backend);

        let legacy = json!({"student": {}, "marks": [], "overall_grade": "B"});
        let card = render_report_card(&legacy, &classes);
        assert_eq!(card["grade"], json!("B"));
        assert_eq!(card["className"], Value::Null);
    }

    fn records(v: Value) -> Vec<Record> {
        serde_json::from_value(v).expect("records")
    }

    #[test]
    fn mark_rows_join_through_the_schedule_without_computing_scores() {
        let mut notices = Notices::default();
        let mut screen = ExamsScreen::default();
        screen.exam_types.settle(Ok(records(json!([{"id": "et1", "name": "Midterm"}]))), &mut notices);
        screen.subjects.settle(Ok(records(json!([{"id": "sub1", "name": "Physics"}]))), &mut notices);
        screen.students.settle(Ok(records(json!([{"id": "s1", "name": "Ada"}]))), &mut notices);
        screen.schedules.settle(
            Ok(records(json!([
                {"id": "sch1", "exam_type_id": "et1", "subject_id": "sub1", "total_marks": 80},
                {"id": "sch2", "exam_type_id": "gone", "subject_id": "gone", "total_marks": 50}
            ]))),
            &mut notices,
        );
        screen.marks.settle(
            Ok(records(json!([
                {"id": "m1", "exam_schedule_id": "sch1", "student_id": "s1", "marks_obtained": 60},
                {"id": "m2", "exam_schedule_id": "sch2", "student_id": "s9", "marks_obtained": 40},
                {"id": "m3", "exam_schedule_id": "nope", "student_id": "s1", "marks_obtained": 10}
            ]))),
            &mut notices,
        );
        assert!(notices.is_empty());

        let view = screen.view();
        let rows = view["marks"].as_array().expect("marks rows");
        assert_eq!(rows[0]["examTypeName"], json!("Midterm"));
        assert_eq!(rows[0]["subjectName"], json!("Physics"));
        assert_eq!(rows[0]["studentName"], json!("Ada"));
        assert_eq!(rows[0]["marks_obtained"], json!(60));
        assert!(rows[0].get("percentageText").is_none());
        assert_eq!(rows[1]["examTypeName"], json!(PLACEHOLDER));
        assert_eq!(rows[1]["studentName"], json!(PLACEHOLDER));
        assert_eq!(rows[2]["subjectName"], json!(PLACEHOLDER));
        assert_eq!(rows[2]["examTypeName"], json!(PLACEHOLDER));
    }
}
