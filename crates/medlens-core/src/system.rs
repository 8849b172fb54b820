//! Host implementations of `Clock` and `Navigator`.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::traits::{Clock, Navigator};

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a settable instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|g| *g).unwrap_or_else(|e| *e.into_inner())
    }
}

/// A navigator without a browser: it records every redirect and treats the
/// last one as the current page.
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Start on `path` without recording it as a redirect.
    pub fn starting_at(path: impl Into<String>) -> Self {
        let nav = Self::default();
        if let Ok(mut history) = nav.history.lock() {
            history.push(path.into());
        }
        nav
    }

    /// Every location visited, starting page first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// The most recent redirect. `None` while still on the starting page.
    pub fn last_redirect(&self) -> Option<String> {
        self.history
            .lock()
            .ok()
            .filter(|h| h.len() > 1)
            .and_then(|h| h.last().cloned())
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
            .unwrap_or_default()
    }

    fn redirect(&self, path: &str) {
        info!(path = %path, "navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
