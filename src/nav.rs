use serde::Serialize;

use crate::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Home,
    Users,
    AcademicCap,
    BookOpen,
    ClipboardDocumentCheck,
    Calendar,
    CurrencyDollar,
    ChartBar,
    Cog6Tooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: Icon,
}

const fn item(label: &'static str, path: &'static str, icon: Icon) -> MenuItem {
    MenuItem { label, path, icon }
}

const COMMON: &[MenuItem] = &[item("Dashboard", "/dashboard", Icon::Home)];

const ADMIN: &[MenuItem] = &[
    item("Users", "/users", Icon::Users),
    item("School Years", "/school-years", Icon::Calendar),
    item("Classes", "/classes", Icon::BookOpen),
    item("Subjects", "/subjects", Icon::BookOpen),
    item("Teachers", "/teachers", Icon::AcademicCap),
    item("Students", "/students", Icon::Users),
    item("Parents", "/parents", Icon::Users),
    item("Timetable", "/timetable", Icon::Calendar),
    item("Attendance", "/attendance", Icon::ClipboardDocumentCheck),
    item("Exams", "/exams", Icon::Calendar),
    item("Finance", "/finance", Icon::CurrencyDollar),
    item("Reports", "/reports", Icon::ChartBar),
    item("Settings", "/settings", Icon::Cog6Tooth),
];

const TEACHER: &[MenuItem] = &[
    item("My Classes", "/my-classes", Icon::BookOpen),
    item("Students", "/students", Icon::Users),
    item("Timetable", "/timetable", Icon::Calendar),
    item("Attendance", "/attendance", Icon::ClipboardDocumentCheck),
    item("Exams", "/exams", Icon::Calendar),
    item("Assignments", "/assignments", Icon::BookOpen),
];

const STUDENT: &[MenuItem] = &[
    item("My Classes", "/my-classes", Icon::BookOpen),
    item("Attendance", "/attendance", Icon::ClipboardDocumentCheck),
    item("Exams", "/exams", Icon::Calendar),
    item("Assignments", "/assignments", Icon::BookOpen),
    item("Grades", "/grades", Icon::ChartBar),
];

const PARENT: &[MenuItem] = &[
    item("My Children", "/my-children", Icon::Users),
    item("Attendance", "/attendance", Icon::ClipboardDocumentCheck),
    item("Exams", "/exams", Icon::Calendar),
    item("Grades", "/grades", Icon::ChartBar),
    item("Finance", "/finance", Icon::CurrencyDollar),
];

fn role_items(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Admin => ADMIN,
        Role::Teacher => TEACHER,
        Role::Student => STUDENT,
        Role::Parent => PARENT,
    }
}

/// Sidebar entries for `role`; roles outside the console's set get the
/// common entries only.
pub fn menu_for(role: Option<Role>) -> Vec<MenuItem> {
    let extra = role.map(role_items).unwrap_or(&[]);
    COMMON.iter().chain(extra.iter()).copied().collect()
}
