use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::agentic::AgenticPhase;
use crate::api::AnalysisStatus;

use super::app::ToastStyle;

/// Semantic colour theme for the entire TUI.
///
/// Every colour used by the renderer is stored here so the user can
/// override any of them via `[theme]` in `config.toml`.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Borders ───────────────────────────────────────────────
    pub border_focused: Color,
    pub border_unfocused: Color,

    // ── Text ──────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_accent: Color,

    // ── Agentic phase ─────────────────────────────────────────
    pub phase_unknown: Color,
    pub phase_loading: Color,
    pub phase_disabled: Color,
    pub phase_initializing: Color,
    pub phase_enabled: Color,

    // ── Analysis status ───────────────────────────────────────
    pub analysis_completed: Color,
    pub analysis_failed: Color,
    pub analysis_other: Color,

    // ── Toast ─────────────────────────────────────────────────
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_error: Color,

    // ── Misc ──────────────────────────────────────────────────
    pub selection_indicator: Color,
    pub spinner: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            text_accent: Color::Cyan,

            phase_unknown: Color::DarkGray,
            phase_loading: Color::Yellow,
            phase_disabled: Color::Gray,
            phase_initializing: Color::Yellow,
            phase_enabled: Color::Green,

            analysis_completed: Color::Green,
            analysis_failed: Color::Red,
            analysis_other: Color::Yellow,

            toast_info: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,

            selection_indicator: Color::Cyan,
            spinner: Color::Yellow,
        }
    }
}

impl Theme {
    /// Style for a focused panel border.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Style for an unfocused panel border.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn phase_style(&self, phase: AgenticPhase) -> Style {
        let color = match phase {
            AgenticPhase::Unknown => self.phase_unknown,
            AgenticPhase::Loading => self.phase_loading,
            AgenticPhase::Disabled => self.phase_disabled,
            AgenticPhase::Initializing | AgenticPhase::Enabled { initialized: false } => {
                self.phase_initializing
            }
            AgenticPhase::Enabled { initialized: true } => self.phase_enabled,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn analysis_status_style(&self, status: &AnalysisStatus) -> Style {
        let color = match status {
            AnalysisStatus::Completed => self.analysis_completed,
            AnalysisStatus::Failed => self.analysis_failed,
            AnalysisStatus::Other(_) => self.analysis_other,
        };
        Style::default().fg(color)
    }

    /// Style for a toast notification.
    pub fn toast_style(&self, style: ToastStyle) -> Style {
        let color = match style {
            ToastStyle::Info => self.toast_info,
            ToastStyle::Success => self.toast_success,
            ToastStyle::Error => self.toast_error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selection_indicator)
            .add_modifier(Modifier::BOLD)
    }
}

// ── Config deserialization ────────────────────────────────────────────

/// All-optional mirror of [`Theme`] for `config.toml` `[theme]` section.
///
/// Only `Some` fields override the default; everything else keeps its default.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub border_focused: Option<String>,
    pub border_unfocused: Option<String>,

    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub text_accent: Option<String>,

    pub phase_unknown: Option<String>,
    pub phase_loading: Option<String>,
    pub phase_disabled: Option<String>,
    pub phase_initializing: Option<String>,
    pub phase_enabled: Option<String>,

    pub analysis_completed: Option<String>,
    pub analysis_failed: Option<String>,
    pub analysis_other: Option<String>,

    pub toast_info: Option<String>,
    pub toast_success: Option<String>,
    pub toast_error: Option<String>,

    pub selection_indicator: Option<String>,
    pub spinner: Option<String>,
}

/// Parse a colour from config: `rgb(R,G,B)`, or anything ratatui's own
/// parser accepts (`"cyan"`, `"dark_gray"`, `"#ff8800"`, `"42"`).
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        return match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Some(Color::Rgb(r, g, b)),
            _ => None,
        };
    }
    s.parse().ok()
}

/// Apply an optional config field: if the string parses to a valid colour,
/// overwrite `target`.
fn apply(target: &mut Color, source: Option<&String>) {
    if let Some(s) = source {
        match parse_color(s) {
            Some(color) => *target = color,
            None => tracing::warn!(value = %s, "ignoring invalid theme colour"),
        }
    }
}

impl ThemeConfig {
    /// Build a `Theme` starting from defaults, overriding any fields that were
    /// set in the config file.
    pub fn build(&self) -> Theme {
        let mut t = Theme::default();

        apply(&mut t.border_focused, self.border_focused.as_ref());
        apply(&mut t.border_unfocused, self.border_unfocused.as_ref());
        apply(&mut t.text_primary, self.text_primary.as_ref());
        apply(&mut t.text_secondary, self.text_secondary.as_ref());
        apply(&mut t.text_accent, self.text_accent.as_ref());
        apply(&mut t.phase_unknown, self.phase_unknown.as_ref());
        apply(&mut t.phase_loading, self.phase_loading.as_ref());
        apply(&mut t.phase_disabled, self.phase_disabled.as_ref());
        apply(&mut t.phase_initializing, self.phase_initializing.as_ref());
        apply(&mut t.phase_enabled, self.phase_enabled.as_ref());
        apply(&mut t.analysis_completed, self.analysis_completed.as_ref());
        apply(&mut t.analysis_failed, self.analysis_failed.as_ref());
        apply(&mut t.analysis_other, self.analysis_other.as_ref());
        apply(&mut t.toast_info, self.toast_info.as_ref());
        apply(&mut t.toast_success, self.toast_success.as_ref());
        apply(&mut t.toast_error, self.toast_error.as_ref());
        apply(
            &mut t.selection_indicator,
            self.selection_indicator.as_ref(),
        );
        apply(&mut t.spinner, self.spinner.as_ref());

        t
    }
}
