//! Tracks metadata for a rendering session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::log;

/// Metadata for a rendering session.
///
/// A `Session` is created along with each [`Document`](crate::document::Document) and is
/// shared by everything that renders or hit-tests it.  For now it only knows whether
/// diagnostics should be logged.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    log_enabled: AtomicBool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session whose logging state comes from the `SVGSCENE_LOG` environment variable.
    pub fn new() -> Self {
        Self::new_with_logging(log::log_enabled())
    }

    pub fn new_for_test_suite() -> Self {
        Self::new_with_logging(false)
    }

    pub fn new_with_logging(log_enabled: bool) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                log_enabled: AtomicBool::new(log_enabled),
            }),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.inner.log_enabled.load(Ordering::Relaxed)
    }

    pub fn set_log_enabled(&self, enabled: bool) {
        self.inner.log_enabled.store(enabled, Ordering::Relaxed);
    }
}
