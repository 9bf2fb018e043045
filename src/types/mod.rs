// ABOUTME: Domain newtypes shared across the crate.
// ABOUTME: Validation happens at construction so the rest of the code can trust the values.

mod app_name;

pub use app_name::{AppName, AppNameError};
