//! Device session collaborator interface
//!
//! The hands-free controller and the physical controls never own session
//! state; they read it from, and command it through, the [`DeviceSession`]
//! trait implemented by the host device runtime.

use serde::{Deserialize, Serialize};

/// High-level device session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Device is booting; the session is not yet armed.
    #[default]
    Starting,
    /// No listening channel is open.
    Idle,
    /// The listening channel is open.
    Listening,
    /// The device is playing its own reply.
    Speaking,
}

/// External device-session collaborator.
///
/// All queries are read-only snapshots. `toggle_channel` is the only
/// channel-affecting command the hands-free controller issues; its effect is
/// asynchronous and depends on the state the session is in when it lands, so
/// callers re-read `state()` on the next tick rather than assume the outcome.
pub trait DeviceSession: Send + Sync {
    /// Current high-level session state.
    fn state(&self) -> DeviceState;

    /// Whether local audio output has fully drained.
    fn is_audio_idle(&self) -> bool;

    /// Whether voice is currently detected on the microphone path.
    fn is_voice_detected(&self) -> bool;

    /// Request an Idle <-> Listening flip.
    fn toggle_channel(&self);

    /// Turn wake-word detection on or off.
    fn set_wake_word_detection(&self, enabled: bool);

    /// Open the listening channel for a push-to-talk hold.
    fn start_listening(&self);

    /// Close the listening channel when a push-to-talk hold ends.
    fn stop_listening(&self);

    /// Show a transient user-facing message. Side effect only; never
    /// state-affecting.
    fn show_notification(&self, message: &str);
}
