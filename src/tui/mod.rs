mod app;
mod event;
pub mod keymap;
pub mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;

use crate::api::{AssistantApi, SessionId};
use crate::config::Config;

/// Run the dashboard until the user quits. Must be called from within a
/// tokio runtime; network calls are spawned onto it.
pub fn run(config: &Config, api: Arc<dyn AssistantApi>, session: Option<SessionId>) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut app = app::App::new(config, api, session);
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
