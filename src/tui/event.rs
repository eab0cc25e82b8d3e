use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::keymap::{self, Key, KeyTarget, Modifiers, NamedKey};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub fn poll(tick_rate: Duration) -> Result<AppEvent> {
    if event::poll(tick_rate)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(AppEvent::Key(key));
    }
    Ok(AppEvent::Tick)
}

/// Translate a terminal key press into a dispatcher event.
///
/// Uppercase letters imply Shift. Shift is dropped for other characters
/// since the shifted symbol (`?`, `+`) is already the key.
pub fn to_key_event(key: &KeyEvent, target: KeyTarget) -> Option<keymap::KeyEvent> {
    let mut modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        meta: key
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };

    let key = match key.code {
        KeyCode::Char(c) => {
            if c.is_uppercase() {
                modifiers.shift = true;
            } else if !c.is_alphabetic() {
                modifiers.shift = false;
            }
            Key::char(c)
        }
        KeyCode::BackTab => {
            modifiers.shift = true;
            Key::Named(NamedKey::Tab)
        }
        KeyCode::Enter => Key::Named(NamedKey::Enter),
        KeyCode::Esc => Key::Named(NamedKey::Escape),
        KeyCode::Tab => Key::Named(NamedKey::Tab),
        KeyCode::Backspace => Key::Named(NamedKey::Backspace),
        KeyCode::Delete => Key::Named(NamedKey::Delete),
        KeyCode::Insert => Key::Named(NamedKey::Insert),
        KeyCode::Up => Key::Named(NamedKey::Up),
        KeyCode::Down => Key::Named(NamedKey::Down),
        KeyCode::Left => Key::Named(NamedKey::Left),
        KeyCode::Right => Key::Named(NamedKey::Right),
        KeyCode::Home => Key::Named(NamedKey::Home),
        KeyCode::End => Key::Named(NamedKey::End),
        KeyCode::PageUp => Key::Named(NamedKey::PageUp),
        KeyCode::PageDown => Key::Named(NamedKey::PageDown),
        KeyCode::F(n) => Key::Named(NamedKey::F(n)),
        _ => return None,
    };

    Some(keymap::KeyEvent::new(key, modifiers).with_target(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(code: KeyCode, modifiers: KeyModifiers) -> keymap::KeyEvent {
        to_key_event(&KeyEvent::new(code, modifiers), KeyTarget::Other).unwrap()
    }

    #[test]
    fn ctrl_letter() {
        let ev = convert(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(ev.key, Key::char('r'));
        assert_eq!(ev.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn uppercase_implies_shift() {
        let ev = convert(KeyCode::Char('K'), KeyModifiers::NONE);
        assert_eq!(ev.key, Key::char('k'));
        assert_eq!(ev.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn shifted_symbols_drop_shift() {
        let ev = convert(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(ev.key, Key::Char('?'));
        assert_eq!(ev.modifiers, Modifiers::NONE);
    }

    #[test]
    fn backtab_is_shift_tab() {
        let ev = convert(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(ev.key, Key::Named(NamedKey::Tab));
        assert_eq!(ev.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn super_maps_to_meta() {
        let ev = convert(KeyCode::Enter, KeyModifiers::SUPER);
        assert_eq!(ev.modifiers, Modifiers::META);
    }

    #[test]
    fn target_is_carried() {
        let ev = to_key_event(
            &KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE),
            KeyTarget::TextInput,
        )
        .unwrap();
        assert!(ev.target.is_text_editable());
    }

    #[test]
    fn unsupported_keys_are_skipped() {
        assert!(
            to_key_event(
                &KeyEvent::new(KeyCode::CapsLock, KeyModifiers::NONE),
                KeyTarget::Other
            )
            .is_none()
        );
    }
}
