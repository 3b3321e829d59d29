//! Per-tick decision rules for the hands-free controller
//!
//! The controller's branch cascade is an ordered rule evaluator: [`decide`]
//! takes a read-only snapshot of everything a tick may consider and returns
//! the first matching [`TickDecision`]. Precedence is fixed:
//! disabled > manual override > audio busy > activity > idle timeout >
//! reopen > fallback. Keeping the rules pure makes each one independently
//! testable and keeps the precedence auditable in one place.

use std::time::{Duration, Instant};

use crate::session::DeviceState;

/// Everything one tick is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    /// Monotonic time of this tick.
    pub now: Instant,
    /// User-level hands-free on/off toggle.
    pub enabled: bool,
    /// Session state as read at the start of the tick.
    pub state: DeviceState,
    /// Whether the push-to-talk control is physically held.
    pub manual_override: bool,
    /// Whether local audio output has drained.
    pub audio_idle: bool,
    /// Whether voice is currently detected.
    pub voice_detected: bool,
    /// Whether automatic reopening is gated on an external wake event.
    pub wait_for_wake_word: bool,
    /// When the last automatic open/close was requested. `None` means no
    /// cooldown is armed.
    pub last_trigger: Option<Instant>,
    /// When voice activity was last observed or refreshed.
    pub last_voice_activity: Instant,
    /// Idle timeout while listening.
    pub idle_timeout: Duration,
    /// Cooldown between automatic reopens.
    pub retry_cooldown: Duration,
}

/// First matching rule for one tick, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Hands-free is off: force wake-word detection off, and close the
    /// channel if it is open without a manual hold.
    Disabled {
        /// Whether the open channel should be closed this tick.
        close_channel: bool,
    },
    /// Push-to-talk is held: refresh activity, clear the wake gate, and
    /// leave the channel alone.
    ManualOverride,
    /// Local audio is still playing: refresh activity only.
    AudioBusy,
    /// The user or device is actively talking: refresh activity and clear
    /// the wake gate.
    Activity,
    /// Listening with recent voice activity: leave the channel open.
    Stay,
    /// Listening with no voice for the idle timeout: close the channel.
    IdleTimeout,
    /// Idle with the wake gate armed: stay closed until the wake event.
    WaitingForWakeWord,
    /// Idle, but the reopen cooldown has not elapsed: stay closed.
    RetryCooldown,
    /// Idle, ungated, cooldown elapsed: reopen the channel.
    Reopen,
    /// Any other state: defensively clear the wake gate so a stale gate
    /// cannot persist across unrelated states.
    ClearWakeGate,
}

/// Evaluates the rules in precedence order and returns the first match.
pub fn decide(inputs: &TickInputs) -> TickDecision {
    if !inputs.enabled {
        return TickDecision::Disabled {
            close_channel: inputs.state == DeviceState::Listening && !inputs.manual_override,
        };
    }

    if inputs.manual_override {
        return TickDecision::ManualOverride;
    }

    if !inputs.audio_idle {
        return TickDecision::AudioBusy;
    }

    if inputs.state == DeviceState::Speaking || inputs.voice_detected {
        return TickDecision::Activity;
    }

    match inputs.state {
        DeviceState::Listening => {
            if inputs.now.duration_since(inputs.last_voice_activity) >= inputs.idle_timeout {
                TickDecision::IdleTimeout
            } else {
                TickDecision::Stay
            }
        }
        DeviceState::Idle => {
            if inputs.wait_for_wake_word {
                TickDecision::WaitingForWakeWord
            } else if let Some(last) = inputs.last_trigger {
                if inputs.now.duration_since(last) < inputs.retry_cooldown {
                    TickDecision::RetryCooldown
                } else {
                    TickDecision::Reopen
                }
            } else {
                TickDecision::Reopen
            }
        }
        // Speaking is unreachable here (handled by the activity rule);
        // Starting falls through to the defensive gate reset.
        _ => TickDecision::ClearWakeGate,
    }
}
