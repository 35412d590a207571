//! Path → screen table and the navigation guard.

use serde::Serialize;

use crate::model::{Role, User};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Login,
    Register,
    Unauthorized,
    Dashboard,
    Users,
    SchoolYears,
    Classes,
    Subjects,
    Teachers,
    Students,
    Parents,
    Timetable,
    Attendance,
    Exams,
    Finance,
    Reports,
    Settings,
    MyClasses,
    Assignments,
    Grades,
    MyChildren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in user, whatever their role.
    Authenticated,
    Roles(&'static [Role]),
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub screen: Screen,
    pub title: &'static str,
    pub access: Access,
}

const ADMIN: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Admin, Role::Teacher];
const EVERYONE: &[Role] = &[Role::Admin, Role::Teacher, Role::Student, Role::Parent];

pub const ROUTES: &[Route] = &[
    Route { path: "/login", screen: Screen::Login, title: "Login", access: Access::Public },
    Route { path: "/register", screen: Screen::Register, title: "Register", access: Access::Public },
    Route { path: "/unauthorized", screen: Screen::Unauthorized, title: "Unauthorized", access: Access::Public },
    Route { path: "/dashboard", screen: Screen::Dashboard, title: "Dashboard", access: Access::Authenticated },
    Route { path: "/users", screen: Screen::Users, title: "Users Management", access: Access::Roles(ADMIN) },
    Route { path: "/school-years", screen: Screen::SchoolYears, title: "School Years", access: Access::Roles(ADMIN) },
    Route { path: "/classes", screen: Screen::Classes, title: "Classes & Sections", access: Access::Roles(ADMIN) },
    Route { path: "/subjects", screen: Screen::Subjects, title: "Subjects", access: Access::Roles(ADMIN) },
    Route { path: "/teachers", screen: Screen::Teachers, title: "Teachers", access: Access::Roles(ADMIN) },
    Route { path: "/students", screen: Screen::Students, title: "Students", access: Access::Roles(STAFF) },
    Route { path: "/parents", screen: Screen::Parents, title: "Parents", access: Access::Roles(ADMIN) },
    Route { path: "/timetable", screen: Screen::Timetable, title: "Timetable", access: Access::Roles(STAFF) },
    Route { path: "/attendance", screen: Screen::Attendance, title: "Attendance", access: Access::Roles(EVERYONE) },
    Route { path: "/exams", screen: Screen::Exams, title: "Exams", access: Access::Roles(EVERYONE) },
    Route { path: "/finance", screen: Screen::Finance, title: "Finance", access: Access::Roles(&[Role::Admin, Role::Parent]) },
    Route { path: "/reports", screen: Screen::Reports, title: "Reports", access: Access::Roles(STAFF) },
    Route { path: "/settings", screen: Screen::Settings, title: "Settings", access: Access::Roles(ADMIN) },
    Route { path: "/my-classes", screen: Screen::MyClasses, title: "My Classes", access: Access::Roles(&[Role::Teacher, Role::Student]) },
    Route { path: "/assignments", screen: Screen::Assignments, title: "Assignments", access: Access::Roles(&[Role::Teacher, Role::Student]) },
    Route { path: "/grades", screen: Screen::Grades, title: "Grades", access: Access::Roles(&[Role::Student, Role::Parent]) },
    Route { path: "/my-children", screen: Screen::MyChildren, title: "My Children", access: Access::Roles(&[Role::Parent]) },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(Screen),
    Redirect(&'static str),
}

/// Drops any query/fragment and trailing slash: `/classes/?x=1` → `/classes`.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let p = path[..end].trim();
    if p.len() > 1 {
        p.trim_end_matches('/')
    } else {
        p
    }
}

pub fn route_for(path: &str) -> Option<&'static Route> {
    let p = normalize_path(path);
    ROUTES.iter().find(|r| r.path == p)
}

pub fn route_of(screen: Screen) -> &'static Route {
    ROUTES
        .iter()
        .find(|r| r.screen == screen)
        .unwrap_or(&ROUTES[3])
}

impl Access {
    /// Whether a signed-in user with `role` may enter.
    pub fn admits(self, role: Option<Role>) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::Roles(roles) => role.map(|r| roles.contains(&r)).unwrap_or(false),
        }
    }
}

pub fn resolve(path: &str, user: Option<&User>) -> Resolution {
    let p = normalize_path(path);
    if p.is_empty() || p == "/" {
        return Resolution::Redirect(LOGIN_PATH);
    }
    let Some(route) = route_for(p) else {
        return Resolution::Redirect(DASHBOARD_PATH);
    };

    match (route.access, user) {
        (Access::Public, Some(_)) if matches!(route.screen, Screen::Login | Screen::Register) => {
            Resolution::Redirect(DASHBOARD_PATH)
        }
        (Access::Public, _) => Resolution::Render(route.screen),
        (_, None) => Resolution::Redirect(LOGIN_PATH),
        (access, Some(u)) if access.admits(u.role()) => Resolution::Render(route.screen),
        (_, Some(_)) => Resolution::Redirect(UNAUTHORIZED_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: "u1".to_string(),
            username: "u".to_string(),
            name: "U".to_string(),
            email: None,
            role: role.to_string(),
        }
    }

    #[test]
    fn normalize_strips_query_and_trailing_slash() {
        assert_eq!(normalize_path("/classes/?tab=1"), "/classes");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/exams#top"), "/exams");
    }

    #[test]
    fn signed_in_users_skip_the_login_page() {
        let admin = user("admin");
        assert_eq!(resolve("/login", Some(&admin)), Resolution::Redirect(DASHBOARD_PATH));
        assert_eq!(resolve("/login", None), Resolution::Render(Screen::Login));
        assert_eq!(resolve("/", Some(&admin)), Resolution::Redirect(LOGIN_PATH));
    }

    #[test]
    fn unrecognized_roles_reach_only_open_routes() {
        let accountant = user("accountant");
        assert_eq!(
            resolve("/dashboard", Some(&accountant)),
            Resolution::Render(Screen::Dashboard)
        );
        assert_eq!(
            resolve("/finance", Some(&accountant)),
            Resolution::Redirect(UNAUTHORIZED_PATH)
        );
    }

    #[test]
    fn every_screen_has_exactly_one_route() {
        for r in ROUTES {
            assert_eq!(route_of(r.screen).path, r.path);
        }
    }
}
