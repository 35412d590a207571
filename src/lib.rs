pub mod api;
pub mod config;
pub mod db;
pub mod form;
pub mod guard;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod nav;
pub mod notify;
pub mod remote;
pub mod screens;
pub mod session;
