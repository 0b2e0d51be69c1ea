//! Transient user notifications
//!
//! Screens get a [`Notifier`] handed to them and push [`Notification`]s into
//! it; whoever owns the receiving end decides how to show them.

use std::time::Duration;

use serde::Serialize;
use strum::Display;
use tokio::sync::mpsc;

use crate::core::error::ClassifiedError;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
    /// The request was rejected for missing or bad credentials
    Auth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub duration: Duration,
}

impl Notification {
    pub fn info(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Info,
            duration,
        }
    }

    pub fn from_error(error: &ClassifiedError, duration: Duration) -> Self {
        let kind = if error.is_auth_failure {
            NotificationKind::Auth
        } else {
            NotificationKind::Error
        };
        Self {
            message: error.message.clone(),
            kind,
            duration,
        }
    }
}

/// Sending half of a screen's notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notification>,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, duration }, receiver)
    }

    pub fn notify(&self, notification: Notification) {
        if let Err(e) = self.sender.send(notification) {
            log::debug!("Notification dropped, no receiver: {}", e.0.message);
        }
    }

    pub fn notify_error(&self, error: &ClassifiedError) {
        self.notify(Notification::from_error(error, self.duration));
    }

    pub fn notify_info(&self, message: impl Into<String>) {
        self.notify(Notification::info(message, self.duration));
    }
}

impl Default for Notifier {
    /// A notifier whose notifications go nowhere
    fn default() -> Self {
        Self::new(DEFAULT_DURATION).0
    }
}
