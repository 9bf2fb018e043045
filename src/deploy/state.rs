// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid rollout transitions at compile time.

/// Initial state: the service is declared in the template, nothing exists on
/// the platform yet. Available actions: `register()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Declared;

/// The application shell exists and is ready.
/// Available actions: `configure()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Registered;

/// Volumes, environment, and exposure are applied.
/// Available actions: `release()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Configured;

/// Terminal state: the build was deployed, readiness reached, and the build
/// verified as not failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Released;
