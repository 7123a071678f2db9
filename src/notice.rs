//! User-facing notices
//!
//! Most failures are only logged. The few the user must act on (switching
//! networks) are pushed through a [`Notifier`].

use std::sync::Mutex;

/// Sink for messages the user has to see
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Prints notices to stderr
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("! {}", message);
    }
}

/// Keeps notices in memory, for hosts that render them later
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify("first");
        notifier.notify("second");
        assert_eq!(notifier.messages(), vec!["first", "second"]);
    }
}
