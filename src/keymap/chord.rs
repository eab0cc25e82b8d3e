use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl NamedKey {
    fn label(self) -> String {
        match self {
            NamedKey::Enter => "Enter".into(),
            NamedKey::Escape => "Esc".into(),
            NamedKey::Tab => "Tab".into(),
            NamedKey::Backspace => "Backspace".into(),
            NamedKey::Delete => "Del".into(),
            NamedKey::Insert => "Ins".into(),
            NamedKey::Up => "Up".into(),
            NamedKey::Down => "Down".into(),
            NamedKey::Left => "Left".into(),
            NamedKey::Right => "Right".into(),
            NamedKey::Home => "Home".into(),
            NamedKey::End => "End".into(),
            NamedKey::PageUp => "PgUp".into(),
            NamedKey::PageDown => "PgDn".into(),
            NamedKey::F(n) => format!("F{n}"),
        }
    }
}

/// A single character or a named key. Characters compare
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

impl Key {
    /// Character key, stored lowercase.
    pub fn char(c: char) -> Self {
        Key::Char(fold(c))
    }

    pub fn matches(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => fold(a) == fold(b),
            (Key::Named(a), Key::Named(b)) => a == b,
            _ => false,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ChordParseError> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::char(c));
        }

        let lower = s.trim().to_ascii_lowercase();
        let named = match lower.as_str() {
            "" => return Err(ChordParseError::Empty),
            "space" => return Ok(Key::Char(' ')),
            "enter" | "return" => NamedKey::Enter,
            "esc" | "escape" => NamedKey::Escape,
            "tab" => NamedKey::Tab,
            "backspace" => NamedKey::Backspace,
            "del" | "delete" => NamedKey::Delete,
            "ins" | "insert" => NamedKey::Insert,
            "up" => NamedKey::Up,
            "down" => NamedKey::Down,
            "left" => NamedKey::Left,
            "right" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pgup" | "pageup" => NamedKey::PageUp,
            "pgdn" | "pagedown" => NamedKey::PageDown,
            other => {
                let n = other
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=24).contains(n))
                    .ok_or_else(|| ChordParseError::UnknownKey(s.to_string()))?;
                NamedKey::F(n)
            }
        };
        Ok(Key::Named(named))
    }
}

/// Modifier flags. Bindings match them exactly: a flag absent from a
/// binding must be absent from the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Modifiers {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };
    pub const CTRL: Self = Modifiers {
        ctrl: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Modifiers {
        shift: true,
        ..Self::NONE
    };
    pub const ALT: Self = Modifiers {
        alt: true,
        ..Self::NONE
    };
    pub const META: Self = Modifiers {
        meta: true,
        ..Self::NONE
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(c: char) -> Self {
        Self::new(Key::char(c), Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::char(c), Modifiers::CTRL)
    }

    pub fn named(key: NamedKey) -> Self {
        Self::new(Key::Named(key), Modifiers::NONE)
    }

    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key.matches(key) && self.modifiers == modifiers
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        let has_mods = m.ctrl || m.alt || m.shift || m.meta;
        for (on, name) in [
            (m.ctrl, "Ctrl+"),
            (m.alt, "Alt+"),
            (m.shift, "Shift+"),
            (m.meta, "Meta+"),
        ] {
            if on {
                f.write_str(name)?;
            }
        }
        match self.key {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) if has_mods => write!(f, "{}", c.to_uppercase()),
            Key::Char(c) => write!(f, "{c}"),
            Key::Named(n) => f.write_str(&n.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    #[error("empty key chord")]
    Empty,

    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),

    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// `"q"`, `"ctrl+r"`, `"Ctrl+Shift+K"`, `"esc"`, `"ctrl++"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let (mods_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };

        let mut modifiers = Modifiers::NONE;
        for part in mods_part.split('+').filter(|p| !p.is_empty()) {
            match part.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(ChordParseError::UnknownModifier(part.to_string())),
            }
        }

        Ok(KeyChord::new(Key::parse(key_part)?, modifiers))
    }
}
