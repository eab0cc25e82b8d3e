use std::collections::HashMap;

use crate::keymap::{KeyBinding, KeyChord, NamedKey};

// ── Actions ──────────────────────────────────────────────────────────

/// Every discrete action the dashboard performs in response to a key press.
///
/// Actions are context-free identifiers; the *execution* code in `App`
/// decides what actually happens based on the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,
    EditSession,
    Refresh,

    // Agentic mode
    EnableAgentic,
    ResetMemory,

    // Cached analyses
    MoveUp,
    MoveDown,
    OpenAnalysis,
    DeleteAnalysis,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Quit,
        Self::ShowHelp,
        Self::EditSession,
        Self::Refresh,
        Self::EnableAgentic,
        Self::ResetMemory,
        Self::MoveUp,
        Self::MoveDown,
        Self::OpenAnalysis,
        Self::DeleteAnalysis,
    ];

    /// Name used for `[keybindings]` overrides in `config.toml`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::ShowHelp => "show_help",
            Self::EditSession => "edit_session",
            Self::Refresh => "refresh",
            Self::EnableAgentic => "enable_agentic",
            Self::ResetMemory => "reset_memory",
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::OpenAnalysis => "open_analysis",
            Self::DeleteAnalysis => "delete_analysis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }
}

// ── Help categories ──────────────────────────────────────────────────

pub const GENERAL: &str = "General";
pub const AGENTIC: &str = "Agentic Mode";
pub const ANALYSES: &str = "Cached Analyses";

// ── Default bindings ─────────────────────────────────────────────────

/// Bindings active for the whole lifetime of the dashboard.
#[allow(clippy::enum_glob_use)]
pub fn global_bindings() -> Vec<KeyBinding<Action>> {
    use Action::*;

    vec![
        KeyBinding::new(KeyChord::plain('q'), Quit).help(GENERAL, "Quit"),
        KeyBinding::new(KeyChord::ctrl('c'), Quit).help(GENERAL, "Quit"),
        KeyBinding::new(KeyChord::plain('?'), ShowHelp).help(GENERAL, "This help screen"),
        KeyBinding::new(KeyChord::plain('s'), EditSession).help(GENERAL, "Switch session"),
        KeyBinding::new(KeyChord::plain('r'), Refresh).help(GENERAL, "Refresh status and analyses"),
        KeyBinding::new(KeyChord::plain('e'), EnableAgentic).help(AGENTIC, "Enable agentic mode"),
        KeyBinding::new(KeyChord::ctrl('r'), ResetMemory).help(AGENTIC, "Reset agentic memory"),
    ]
}

/// Bindings of the cached-analyses panel, registered while a session is
/// mounted.
#[allow(clippy::enum_glob_use)]
pub fn analyses_bindings() -> Vec<KeyBinding<Action>> {
    use Action::*;

    vec![
        KeyBinding::new(KeyChord::plain('j'), MoveDown).help(ANALYSES, "Move down"),
        KeyBinding::new(KeyChord::named(NamedKey::Down), MoveDown).help(ANALYSES, "Move down"),
        KeyBinding::new(KeyChord::plain('k'), MoveUp).help(ANALYSES, "Move up"),
        KeyBinding::new(KeyChord::named(NamedKey::Up), MoveUp).help(ANALYSES, "Move up"),
        KeyBinding::new(KeyChord::named(NamedKey::Enter), OpenAnalysis)
            .help(ANALYSES, "Open analysis"),
        KeyBinding::new(KeyChord::plain('d'), DeleteAnalysis).help(ANALYSES, "Delete analysis"),
    ]
}

/// Apply `[keybindings]` overrides (action name → chord) before the
/// bindings are registered. The first binding of each named action is
/// rebound; invalid entries are logged and skipped.
pub fn apply_overrides(bindings: &mut [KeyBinding<Action>], overrides: &HashMap<String, String>) {
    for (name, chord) in overrides {
        let Some(action) = Action::from_name(name) else {
            tracing::warn!(action = %name, "unknown action in [keybindings]");
            continue;
        };
        let chord: KeyChord = match chord.parse() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(action = %name, error = %e, "invalid key chord in [keybindings]");
                continue;
            }
        };
        if let Some(binding) = bindings.iter_mut().find(|b| b.action == action) {
            binding.chord = chord;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
