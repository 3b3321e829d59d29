//! Periodic tick loop for the hands-free controller
//!
//! Drives [`HandsFreeController::tick`] from a dedicated thread on a fixed
//! interval. Stopping the loop is the only cancellation mechanism; each tick
//! is bounded, non-blocking work, so no in-flight tick ever needs
//! cooperative cancellation.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Sender};
use parking_lot::Mutex;

use super::controller::HandsFreeController;

/// Handle owning the tick thread.
///
/// Dropping the runner stops the loop and joins the thread.
pub struct HandsFreeRunner {
    shutdown: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl HandsFreeRunner {
    /// Spawns the tick loop at the given interval.
    pub fn spawn(controller: Arc<Mutex<HandsFreeController>>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let thread = std::thread::spawn(move || {
            let ticker = crossbeam_channel::tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => controller.lock().tick(),
                    recv(shutdown_rx) -> _ => break,
                }
            }
            tracing::debug!("hands-free tick thread exiting");
        });

        tracing::info!(interval_ms = interval.as_millis() as u64, "hands-free tick loop started");

        Self {
            shutdown: shutdown_tx,
            thread: Some(thread),
        }
    }

    /// Stops the loop and joins the tick thread.
    pub fn stop(&mut self) {
        // A full buffer or a disconnected receiver both mean the thread is
        // already on its way out.
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HandsFreeRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handsfree::controller::HandsfreeConfig;
    use crate::session::test_support::RecordingSession;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_runner_ticks_and_stops() {
        let session = Arc::new(RecordingSession::idle());
        let controller = Arc::new(Mutex::new(HandsFreeController::new(
            HandsfreeConfig::default(),
            session.clone(),
            Arc::new(AtomicBool::new(false)),
        )));

        let mut runner = HandsFreeRunner::spawn(controller, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(100));
        runner.stop();

        // At least one tick reached the controller: idle with no cooldown
        // armed reopens exactly once.
        assert_eq!(session.toggle_count(), 1);

        // No further ticks arrive after stop.
        let after = session.toggle_count();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(session.toggle_count(), after);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let session = Arc::new(RecordingSession::idle());
        let controller = Arc::new(Mutex::new(HandsFreeController::new(
            HandsfreeConfig::default(),
            session,
            Arc::new(AtomicBool::new(false)),
        )));

        let mut runner = HandsFreeRunner::spawn(controller, Duration::from_millis(10));
        runner.stop();
        runner.stop();
    }
}
