//! Push-to-talk control
//!
//! Holding the primary control opens the listening channel directly;
//! releasing it closes the channel again. While held, the shared override
//! flag tells the hands-free controller to keep its automatic logic out of
//! the way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::session::DeviceSession;

/// Push-to-talk press/release handler.
///
/// Owns the manual-override flag; the hands-free controller holds a clone
/// of the handle and reads it on every tick.
pub struct PushToTalk {
    session: Arc<dyn DeviceSession>,
    active: Arc<AtomicBool>,
}

impl PushToTalk {
    /// Creates a handler around the given session.
    pub fn new(session: Arc<dyn DeviceSession>) -> Self {
        Self {
            session,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle to the override flag, true exactly while the control is held.
    pub fn active_handle(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    /// Whether the control is currently held.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The control was pressed down. Duplicate presses are ignored.
    pub fn press(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("push-to-talk pressed, opening listening channel");
        self.session.start_listening();
    }

    /// The control was released. A release without a press is ignored.
    pub fn release(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::info!("push-to-talk released, closing listening channel");
        self.session.stop_listening();
    }
}
