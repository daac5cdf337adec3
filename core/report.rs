//! Reporting seam for the selection engine.
//!
//! Traversal, matching and rendering never talk to the global logger
//! directly. They take a `&dyn Reporter`, which the binary backs with
//! [`LogReporter`] and tests back with [`CollectingReporter`].

use log::Level;
use std::sync::Mutex;

pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }

    fn trace(&self, message: &str) {
        self.report(Level::Trace, message);
    }
}

/// Forwards every report to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(target: "aicc", level, "{}", message);
    }
}

/// Keeps reports in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages reported at `level` or more severe.
    pub fn messages_at_least(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l <= level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, level: Level, message: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, message.to_string()));
        }
    }
}
