//! Load-phase tracking for the observed document.
//!
//! A document starts out loading and becomes ready exactly once, when the
//! host signals load completion. The phase only modifies labels; it never
//! decides whether a record is classified.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

#[derive(Debug)]
pub struct DocumentLifecycle {
    loading: AtomicBool,
}

impl DocumentLifecycle {
    pub fn new() -> Self {
        Self {
            loading: AtomicBool::new(true),
        }
    }

    /// A lifecycle that has already passed its load phase.
    pub fn ready() -> Self {
        Self {
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Ends the load phase. Returns `true` only for the call that made the
    /// transition; later calls are no-ops.
    pub fn mark_ready(&self) -> bool {
        let transitioned = self.loading.swap(false, Ordering::AcqRel);
        if transitioned {
            debug!(target: "docwatch.lifecycle", "document ready");
        }
        transitioned
    }
}

impl Default for DocumentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
