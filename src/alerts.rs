use std::sync::Mutex;

use tracing::warn;

/// Blocking user-facing notices (the PDF and dispatch flows raise these).
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Prints to stderr and logs.
pub struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn alert(&self, message: &str) {
        warn!("{}", message);
        eprintln!("{}", message);
    }
}

/// Keeps every alert in memory.
#[derive(Default)]
pub struct CollectedAlerts {
    messages: Mutex<Vec<String>>,
}

impl CollectedAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl AlertSink for CollectedAlerts {
    fn alert(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
