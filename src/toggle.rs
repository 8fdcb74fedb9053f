// The one piece of state shared between the UI and the pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cartoon on/off switch. Clones share the same flag, so a UI thread can flip it
/// while the frame loop reads it; the pipeline samples it once per frame.
#[derive(Clone, Debug, Default)]
pub struct StyleToggle {
    enabled: Arc<AtomicBool>,
}

impl StyleToggle {
    pub fn new(enabled: bool) -> Self {
        Self { enabled: Arc::new(AtomicBool::new(enabled)) }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Flip the flag; returns the new value.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::AcqRel)
    }
}
