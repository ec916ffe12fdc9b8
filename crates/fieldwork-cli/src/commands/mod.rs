pub mod auth_cmd;
pub mod calendar;
pub mod common;
pub mod completions;
pub mod config;
pub mod form;
pub mod list;
pub mod note;
pub mod pdf;
pub mod photo;
pub mod show;
pub mod strokes;
