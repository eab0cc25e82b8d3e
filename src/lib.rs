pub mod agentic;
pub mod analyses;
pub mod api;
pub mod config;
pub mod keymap;
pub mod notify;
pub mod tui;

/// Build version: `version-<git hash>` in CI and local git checkouts, `dev`
/// otherwise.
pub const VERSION: &str = env!("TRIAGIST_VERSION");
