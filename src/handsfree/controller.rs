//! Hands-free session controller
//!
//! Runs on a coarse periodic tick and reconciles the manual-override flag,
//! the session state, the audio-idle flag, the voice-detected flag and the
//! wake-word-wait gate into a single stay/open/close decision per tick.
//! Decisions are evaluated by [`decision::decide`] and applied here through
//! the [`DeviceSession`] handle; the controller never assumes the outcome of
//! a toggle and re-reads session state on the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::decision::{self, TickDecision, TickInputs};
use crate::session::{DeviceSession, DeviceState};

/// Configuration for the hands-free controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsfreeConfig {
    /// Whether hands-free mode starts enabled.
    pub enabled: bool,

    /// Tick interval for the periodic controller loop, in milliseconds.
    pub tick_interval_ms: u64,

    /// Close the listening channel after this long without voice activity,
    /// in milliseconds.
    pub idle_timeout_ms: u64,

    /// Minimum delay between automatic reopens, in milliseconds.
    pub retry_cooldown_ms: u64,

    /// Whether a wake-word subsystem is present on this device.
    ///
    /// Runtime capability flag: when false the idle-timeout branch never
    /// arms the wake-word-wait gate, so the channel reopens on the retry
    /// cooldown alone.
    pub wake_word_available: bool,

    /// Phrase shown in the standby hint after an idle timeout.
    pub wake_word_hint: String,
}

impl Default for HandsfreeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_ms: 500,
            idle_timeout_ms: 25_000,
            retry_cooldown_ms: 3_000,
            wake_word_available: true,
            wake_word_hint: "Hi Hark".to_string(),
        }
    }
}

impl HandsfreeConfig {
    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Periodic hands-free controller.
///
/// Owned state is deliberately small: the enabled flag, the wake-word-wait
/// gate, and two monotonic timestamps. The manual-override flag is shared
/// with the push-to-talk handler through an `Arc<AtomicBool>`; everything
/// else is read fresh from the session on every tick, which is also the
/// recovery mechanism for any transient inconsistency.
pub struct HandsFreeController {
    session: Arc<dyn DeviceSession>,
    config: HandsfreeConfig,
    manual_override: Arc<AtomicBool>,
    enabled: bool,
    /// Latch preventing automatic reopening until an external wake event.
    /// Starts clear; the initial value is an explicit condition here, not
    /// something inferred from the fallback branch.
    wait_for_wake_word: bool,
    last_trigger: Option<Instant>,
    last_voice_activity: Instant,
}

impl HandsFreeController {
    /// Creates a controller around the given session handle.
    ///
    /// `manual_override` is the flag owned by the push-to-talk handler; it
    /// reads true exactly while the control is physically held.
    pub fn new(
        config: HandsfreeConfig,
        session: Arc<dyn DeviceSession>,
        manual_override: Arc<AtomicBool>,
    ) -> Self {
        let enabled = config.enabled;
        Self {
            session,
            config,
            manual_override,
            enabled,
            wait_for_wake_word: false,
            last_trigger: None,
            last_voice_activity: Instant::now(),
        }
    }

    /// Whether hands-free mode is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether automatic reopening is gated on a wake event.
    pub fn is_waiting_for_wake_word(&self) -> bool {
        self.wait_for_wake_word
    }

    /// Clears the wake-word-wait gate after an external wake event.
    ///
    /// Called by the host when its wake-word subsystem fires; also counts
    /// as voice activity so the freshly opened channel does not time out
    /// immediately.
    pub fn on_wake_word(&mut self) {
        tracing::debug!("wake event received, clearing wake-word wait gate");
        self.wait_for_wake_word = false;
        self.last_voice_activity = Instant::now();
    }

    /// Runs one tick at the current time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Runs one tick at an explicit time.
    ///
    /// Split out from [`tick`](Self::tick) so tests can drive simulated
    /// clocks through the timeout and cooldown rules.
    pub fn tick_at(&mut self, now: Instant) {
        let inputs = TickInputs {
            now,
            enabled: self.enabled,
            state: self.session.state(),
            manual_override: self.manual_override.load(Ordering::SeqCst),
            audio_idle: self.session.is_audio_idle(),
            voice_detected: self.session.is_voice_detected(),
            wait_for_wake_word: self.wait_for_wake_word,
            last_trigger: self.last_trigger,
            last_voice_activity: self.last_voice_activity,
            idle_timeout: Duration::from_millis(self.config.idle_timeout_ms),
            retry_cooldown: Duration::from_millis(self.config.retry_cooldown_ms),
        };
        let decision = decision::decide(&inputs);
        tracing::trace!(?decision, state = ?inputs.state, "hands-free tick");
        self.apply(decision, now);
    }

    /// Applies the effects of one tick decision.
    fn apply(&mut self, decision: TickDecision, now: Instant) {
        match decision {
            TickDecision::Disabled { close_channel } => {
                // OFF means truly off: wake-word detection stays disabled
                // and a channel left open without a manual hold is closed.
                self.session.set_wake_word_detection(false);
                if close_channel {
                    tracing::info!("hands-free disabled, closing listening channel");
                    self.session.toggle_channel();
                }
            }
            TickDecision::ManualOverride => {
                self.last_voice_activity = now;
                self.wait_for_wake_word = false;
            }
            TickDecision::AudioBusy => {
                self.last_voice_activity = now;
            }
            TickDecision::Activity => {
                self.last_voice_activity = now;
                self.wait_for_wake_word = false;
            }
            TickDecision::Stay
            | TickDecision::WaitingForWakeWord
            | TickDecision::RetryCooldown => {}
            TickDecision::IdleTimeout => {
                tracing::info!(
                    timeout_ms = self.config.idle_timeout_ms,
                    "hands-free idle timeout, entering standby"
                );
                self.session.toggle_channel();
                if self.config.wake_word_available {
                    self.wait_for_wake_word = true;
                    self.session.show_notification(&format!(
                        "Standby, say: {}",
                        self.config.wake_word_hint
                    ));
                } else {
                    self.wait_for_wake_word = false;
                }
                self.last_trigger = Some(now);
                self.last_voice_activity = now;
            }
            TickDecision::Reopen => {
                tracing::debug!("hands-free reopening listening channel");
                self.last_trigger = Some(now);
                self.session.toggle_channel();
                self.last_voice_activity = now;
            }
            TickDecision::ClearWakeGate => {
                self.wait_for_wake_word = false;
            }
        }
    }

    /// User-invoked hands-free on/off toggle.
    ///
    /// On enable the channel opens immediately when idle, and the idle
    /// timeout takes over from there. On disable an open channel is closed
    /// right away; if the device is mid-reply the disabled tick branch will
    /// close the channel once it returns to listening.
    pub fn toggle_hands_free_mode(&mut self) {
        self.enabled = !self.enabled;
        if self.enabled {
            tracing::info!("hands-free mode enabled");
            self.session.show_notification("Hands-free ON");
            self.last_trigger = None;
            self.last_voice_activity = Instant::now();
            self.wait_for_wake_word = false;
            self.session.set_wake_word_detection(true);
            if self.session.state() == DeviceState::Idle {
                self.session.toggle_channel();
            }
        } else {
            tracing::info!("hands-free mode disabled");
            self.session.show_notification("Hands-free OFF");
            self.wait_for_wake_word = false;
            self.session.set_wake_word_detection(false);
            if self.session.state() == DeviceState::Listening {
                self.session.toggle_channel();
            }
        }
    }
}
