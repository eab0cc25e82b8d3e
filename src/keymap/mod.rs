//! Key-event dispatch against scoped binding registrations.
//!
//! A [`KeyRegistry`] is owned by the UI and handed to each view, which
//! registers its bindings and keeps the returned [`KeyScope`] for as long
//! as it is mounted. Dropping the scope removes exactly those bindings.
//!
//! Dispatch rules, in order:
//! 1. events aimed at a text-editable target are never consumed;
//! 2. bindings are scanned in registration order and match on the key
//!    (case-insensitive) plus all four modifier flags exactly;
//! 3. the first match fires and the event is consumed.

mod chord;

pub use chord::{ChordParseError, Key, KeyChord, Modifiers, NamedKey};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

// ── Events ───────────────────────────────────────────────────────────

/// What kind of element had focus when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    TextInput,
    TextArea,
    ContentEditable,
    #[default]
    Other,
}

impl KeyTarget {
    pub fn is_text_editable(self) -> bool {
        matches!(
            self,
            KeyTarget::TextInput | KeyTarget::TextArea | KeyTarget::ContentEditable
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub target: KeyTarget,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            target: KeyTarget::Other,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: KeyTarget) -> Self {
        self.target = target;
        self
    }
}

/// Result of offering an event to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A binding fired; the focused widget must not handle the key.
    Handled,
    /// Nothing matched; the event continues to the focused widget.
    PassThrough,
}

// ── Bindings ─────────────────────────────────────────────────────────

pub struct KeyBinding<A> {
    pub chord: KeyChord,
    pub action: A,
    /// Shown in the help overlay; empty hides the binding from help.
    pub description: &'static str,
    pub category: Option<&'static str>,
}

impl<A> KeyBinding<A> {
    pub fn new(chord: KeyChord, action: A) -> Self {
        Self {
            chord,
            action,
            description: "",
            category: None,
        }
    }

    #[must_use]
    pub fn help(mut self, category: &'static str, description: &'static str) -> Self {
        self.category = Some(category);
        self.description = description;
        self
    }
}

impl<A> fmt::Debug for KeyBinding<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("chord", &self.chord.to_string())
            .field("description", &self.description)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// A single row in the help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub label: String,
    pub description: &'static str,
}

// ── Registry ─────────────────────────────────────────────────────────

struct Entry<A> {
    scope: u64,
    binding: Rc<KeyBinding<A>>,
}

struct Registry<A> {
    next_scope: u64,
    entries: Vec<Entry<A>>,
}

pub struct KeyRegistry<A> {
    inner: Rc<RefCell<Registry<A>>>,
}

impl<A> Default for KeyRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> KeyRegistry<A> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_scope: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a batch of bindings behind the existing ones. They stay
    /// active until the returned scope is dropped.
    pub fn register(&self, bindings: Vec<KeyBinding<A>>) -> KeyScope<A> {
        let mut reg = self.inner.borrow_mut();
        let id = reg.next_scope;
        reg.next_scope += 1;
        let len = bindings.len();
        reg.entries.extend(bindings.into_iter().map(|b| Entry {
            scope: id,
            binding: Rc::new(b),
        }));
        tracing::debug!(scope = id, bindings = len, "registered key scope");
        KeyScope {
            registry: Rc::downgrade(&self.inner),
            id,
            len,
        }
    }

    /// The binding that would fire for `event`, if any.
    pub fn resolve(&self, event: &KeyEvent) -> Option<Rc<KeyBinding<A>>> {
        if event.target.is_text_editable() {
            return None;
        }
        self.inner
            .borrow()
            .entries
            .iter()
            .find(|e| e.binding.chord.matches(event.key, event.modifiers))
            .map(|e| Rc::clone(&e.binding))
    }

    /// Chord of the first active binding for `action`.
    pub fn chord_for(&self, action: &A) -> Option<KeyChord>
    where
        A: PartialEq,
    {
        self.inner
            .borrow()
            .entries
            .iter()
            .find(|e| e.binding.action == *action)
            .map(|e| e.binding.chord)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Help rows grouped by category in first-registered order. Bindings
    /// sharing a description are folded into one row (`j/Down`).
    pub fn help_entries(&self) -> Vec<(&'static str, Vec<HelpEntry>)> {
        let reg = self.inner.borrow();
        let mut out: Vec<(&'static str, Vec<HelpEntry>)> = Vec::new();

        for entry in &reg.entries {
            let binding = &entry.binding;
            let Some(category) = binding.category else {
                continue;
            };
            if binding.description.is_empty() {
                continue;
            }

            let idx = if let Some(idx) = out.iter().position(|(c, _)| *c == category) {
                idx
            } else {
                out.push((category, Vec::new()));
                out.len() - 1
            };
            let rows = &mut out[idx].1;

            let label = binding.chord.to_string();
            if let Some(row) = rows
                .iter_mut()
                .find(|r| r.description == binding.description)
            {
                if !row.label.split('/').any(|l| l == label) {
                    row.label.push('/');
                    row.label.push_str(&label);
                }
            } else {
                rows.push(HelpEntry {
                    label,
                    description: binding.description,
                });
            }
        }

        out
    }
}

impl<A: Fn()> KeyRegistry<A> {
    /// Fire the first matching binding's action.
    pub fn dispatch(&self, event: &KeyEvent) -> Dispatch {
        // The registry borrow ends inside `resolve`, so actions may
        // register or drop scopes.
        match self.resolve(event) {
            Some(binding) => {
                (binding.action)();
                Dispatch::Handled
            }
            None => Dispatch::PassThrough,
        }
    }
}

/// Registration handle. Dropping it unregisters the bindings it added.
#[must_use = "dropping a KeyScope unregisters its bindings immediately"]
pub struct KeyScope<A> {
    registry: Weak<RefCell<Registry<A>>>,
    id: u64,
    len: usize,
}

impl<A> Drop for KeyScope<A> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .entries
                .retain(|e| e.scope != self.id);
            tracing::debug!(scope = self.id, "released key scope");
        }
    }
}

impl<A> fmt::Debug for KeyScope<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyScope")
            .field("id", &self.id)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
