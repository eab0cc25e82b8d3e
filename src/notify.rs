//! Transient, non-blocking user notifications.
//!
//! Components never propagate failures across their boundary; they raise a
//! [`Notice`] and return. The dashboard renders notices as toasts, the CLI
//! prints them to stderr.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sending half of the notice channel. Cheap to clone; a notifier whose
/// receiver is gone only logs.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx: Some(tx) }, rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Error, message.into());
    }

    fn send(&self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Error => tracing::warn!(notice = %message),
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(notice = %message),
        }
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is rendering notices anymore.
            let _ = tx.send(Notice { level, message });
        }
    }
}
