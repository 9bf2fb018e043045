// ABOUTME: Library root for caravel - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod platform;
pub mod prompt;
pub mod random;
pub mod template;
pub mod types;
