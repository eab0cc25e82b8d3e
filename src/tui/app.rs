use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::agentic::{AgenticController, AgenticPhase};
use crate::analyses::AnalysisStore;
use crate::api::{AssistantApi, CachedAnalysisItem, SessionId};
use crate::config::Config;
use crate::keymap::{Dispatch, KeyRegistry, KeyScope, KeyTarget};
use crate::notify::{Notice, NoticeLevel, Notifier};

use super::event::{self, AppEvent};
use super::keymap::{self as bindings, Action};
use super::theme::Theme;
use super::ui;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
    ConfirmDelete,
    EditSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Info,
    Success,
    Error,
}

impl From<NoticeLevel> for ToastStyle {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Info => ToastStyle::Info,
            NoticeLevel::Success => ToastStyle::Success,
            NoticeLevel::Error => ToastStyle::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub style: ToastStyle,
    expires_at: Instant,
}

impl Toast {
    fn new(notice: Notice) -> Self {
        Toast {
            message: notice.message,
            style: notice.level.into(),
            expires_at: Instant::now() + TOAST_TTL,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct App {
    pub theme: Theme,
    pub should_quit: bool,
    pub input_mode: InputMode,

    api: Arc<dyn AssistantApi>,
    notifier: Notifier,
    notices: UnboundedReceiver<Notice>,

    pub agentic: AgenticController,
    /// Cached analyses of the mounted session, rebuilt on every switch.
    pub analyses: Option<AnalysisStore>,

    pub keys: KeyRegistry<Action>,
    _global_keys: KeyScope<Action>,
    analyses_keys: Option<KeyScope<Action>>,
    overrides: HashMap<String, String>,

    // Cached analyses panel
    pub selected: usize,
    pub opened: Option<CachedAnalysisItem>,

    // Input buffer for the session prompt
    pub input_buffer: String,

    // Issue URL awaiting delete confirmation
    pub confirm_target: Option<String>,

    pub toast: Option<Toast>,

    poll_interval: Duration,
    last_status_poll: Instant,
}

impl App {
    /// Build the dashboard and mount `session` if one is known. Must be
    /// called inside a tokio runtime.
    pub fn new(config: &Config, api: Arc<dyn AssistantApi>, session: Option<SessionId>) -> Self {
        let (notifier, notices) = Notifier::channel();
        let agentic = AgenticController::new(api.clone(), notifier.clone());

        let keys = KeyRegistry::new();
        let mut global = bindings::global_bindings();
        bindings::apply_overrides(&mut global, &config.keybindings);
        let global_keys = keys.register(global);

        let mut app = App {
            theme: config.theme.build(),
            should_quit: false,
            input_mode: InputMode::Normal,
            api,
            notifier,
            notices,
            agentic,
            analyses: None,
            keys,
            _global_keys: global_keys,
            analyses_keys: None,
            overrides: config.keybindings.clone(),
            selected: 0,
            opened: None,
            input_buffer: String::new(),
            confirm_target: None,
            toast: None,
            poll_interval: config.backend.status_poll_interval(),
            last_status_poll: Instant::now(),
        };

        if let Some(session) = session {
            app.mount_session(session);
        }
        app
    }

    /// Point every panel at `session`. The previous analyses bindings are
    /// released before the new ones are registered.
    pub fn mount_session(&mut self, session: SessionId) {
        info!(%session, "mounting session");
        self.analyses_keys = None;

        self.agentic.set_session(session.clone());
        self.analyses = Some(AnalysisStore::new(
            self.api.clone(),
            self.notifier.clone(),
            session,
        ));

        let mut analyses = bindings::analyses_bindings();
        bindings::apply_overrides(&mut analyses, &self.overrides);
        self.analyses_keys = Some(self.keys.register(analyses));

        self.selected = 0;
        self.opened = None;
        self.confirm_target = None;
        self.refresh();
    }

    pub fn items(&self) -> Vec<CachedAnalysisItem> {
        self.analyses
            .as_ref()
            .map(AnalysisStore::items)
            .unwrap_or_default()
    }

    pub fn selected_item(&self) -> Option<CachedAnalysisItem> {
        self.items().into_iter().nth(self.selected)
    }

    /// Label of the first chord bound to `action`, for footer hints.
    pub fn hint(&self, action: Action) -> Option<String> {
        self.keys.chord_for(&action).map(|c| c.to_string())
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if let AppEvent::Key(key) = event::poll(tick_rate)? {
                self.handle_key(key);
            }
            self.tick(Instant::now());

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => {
                self.dispatch(&key, KeyTarget::Other);
            }
            InputMode::Help => self.handle_help_key(key.code),
            InputMode::ConfirmDelete => self.handle_confirm_delete_key(key.code),
            InputMode::EditSession => self.handle_session_input_key(&key),
        }
    }

    /// Offer a key to the registry, running the bound action on a match.
    fn dispatch(&mut self, key: &KeyEvent, target: KeyTarget) -> Dispatch {
        let Some(event) = event::to_key_event(key, target) else {
            return Dispatch::PassThrough;
        };
        let Some(action) = self.keys.resolve(&event).map(|b| b.action) else {
            return Dispatch::PassThrough;
        };
        debug!(action = action.name(), "key action");
        self.execute(action);
        Dispatch::Handled
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ShowHelp => self.input_mode = InputMode::Help,
            Action::EditSession => {
                self.input_buffer = self
                    .agentic
                    .session()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                self.input_mode = InputMode::EditSession;
            }
            Action::Refresh => {
                if self.require_session() {
                    self.refresh();
                }
            }
            Action::EnableAgentic => {
                if self.require_session() {
                    let agentic = self.agentic.clone();
                    tokio::spawn(async move {
                        if let Err(e) = agentic.enable().await {
                            debug!(error = %e, "enable did not complete");
                        }
                    });
                }
            }
            Action::ResetMemory => {
                if self.require_session() {
                    let agentic = self.agentic.clone();
                    tokio::spawn(async move {
                        if let Err(e) = agentic.reset_memory().await {
                            debug!(error = %e, "memory reset did not complete");
                        }
                    });
                }
            }
            Action::MoveDown => {
                let len = self.analyses.as_ref().map_or(0, AnalysisStore::len);
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            Action::MoveUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::OpenAnalysis => {
                let (Some(store), Some(item)) = (&self.analyses, self.selected_item()) else {
                    return;
                };
                let already_open = self
                    .opened
                    .as_ref()
                    .is_some_and(|o| o.issue_url == item.issue_url);
                self.opened = if already_open {
                    None
                } else {
                    store.select(&item.issue_url)
                };
            }
            Action::DeleteAnalysis => {
                if let Some(item) = self.selected_item() {
                    self.confirm_target = Some(item.issue_url);
                    self.input_mode = InputMode::ConfirmDelete;
                }
            }
        }
    }

    fn require_session(&self) -> bool {
        let mounted = self.agentic.session().is_some();
        if !mounted {
            let hint = self.hint(Action::EditSession).unwrap_or_else(|| "s".into());
            self.notifier
                .info(format!("No session selected (press {hint} to choose one)"));
        }
        mounted
    }

    /// Re-read the status and the cached analyses of the mounted session.
    fn refresh(&mut self) {
        self.spawn_status_fetch();
        if let Some(store) = self.analyses.clone() {
            tokio::spawn(async move {
                // Failures are already surfaced as notices.
                let _ = store.list().await;
            });
        }
    }

    fn spawn_status_fetch(&mut self) {
        self.last_status_poll = Instant::now();
        let agentic = self.agentic.clone();
        tokio::spawn(async move {
            if let Err(e) = agentic.fetch_status().await {
                debug!(error = %e, "status fetch did not complete");
            }
        });
    }

    fn handle_help_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?' | 'q')) {
            self.input_mode = InputMode::Normal;
        }
    }

    fn handle_confirm_delete_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let (Some(url), Some(store)) = (self.confirm_target.take(), self.analyses.clone())
                {
                    if self.opened.as_ref().is_some_and(|o| o.issue_url == url) {
                        self.opened = None;
                    }
                    tokio::spawn(async move {
                        let _ = store.delete(&url).await;
                    });
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.confirm_target = None;
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_session_input_key(&mut self, key: &KeyEvent) {
        // The prompt is a text input: global bindings must not fire here.
        if self.dispatch(key, KeyTarget::TextInput) == Dispatch::Handled {
            return;
        }

        match key.code {
            KeyCode::Enter => {
                let session = std::mem::take(&mut self.input_buffer);
                let session = session.trim();
                self.input_mode = InputMode::Normal;
                if !session.is_empty() {
                    self.mount_session(SessionId::new(session));
                }
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    /// Housekeeping run after every event: surface notices, expire the
    /// toast, keep the selection in range, and poll the status while the
    /// backend is still initializing its tools.
    fn tick(&mut self, now: Instant) {
        while let Ok(notice) = self.notices.try_recv() {
            self.toast = Some(Toast::new(notice));
        }
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }

        let len = self.analyses.as_ref().map_or(0, AnalysisStore::len);
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }

        if self.agentic.phase() == (AgenticPhase::Enabled { initialized: false })
            && now.duration_since(self.last_status_poll) >= self.poll_interval
        {
            debug!("polling agentic status while tools initialize");
            self.spawn_status_fetch();
        }
    }
}
