pub mod attendance;
pub mod auth;
pub mod classes;
pub mod core;
pub mod exams;
pub mod finance;
pub mod forms;
pub mod nav;
pub mod screens;
pub mod students;
pub mod timetable;
pub mod upload;
