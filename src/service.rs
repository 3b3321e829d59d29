//! Front-end composition
//!
//! Builds the classifier, hands-free controller, push-to-talk handler and
//! control bindings from one [`Config`] plus host-injected session and
//! credential-store handles, and owns the periodic tick loop. Everything is
//! dependency-injected here once at startup; no component reaches for
//! process-wide state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::audio::VoiceActivityClassifier;
use crate::config::Config;
use crate::controls::BoardControls;
use crate::credentials::CredentialStore;
use crate::handsfree::{HandsFreeController, HandsFreeRunner};
use crate::ptt::PushToTalk;
use crate::session::DeviceSession;

/// The assembled voice-interaction front end.
///
/// The host feeds microphone frames into [`classifier_mut`] from its audio
/// context, routes button events into [`controls`], and calls [`start`] once
/// the session is ready to be driven. The classifier's sinks are wired by
/// the host: the data sink feeds the downstream pipeline, the activity sink
/// feeds the session's voice-detected flag.
///
/// [`classifier_mut`]: Self::classifier_mut
/// [`controls`]: Self::controls
/// [`start`]: Self::start
pub struct VoiceFrontend {
    classifier: VoiceActivityClassifier,
    controller: Arc<Mutex<HandsFreeController>>,
    controls: BoardControls,
    config: Config,
    runner: Option<HandsFreeRunner>,
}

impl VoiceFrontend {
    /// Wires up all components. Nothing starts running until [`start`] is
    /// called.
    ///
    /// [`start`]: Self::start
    pub fn new(
        config: Config,
        session: Arc<dyn DeviceSession>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let classifier = VoiceActivityClassifier::new(
            config.vad.clone(),
            config.audio.sample_rate,
            config.audio.channels,
        );

        let ptt = PushToTalk::new(session.clone());
        let controller = Arc::new(Mutex::new(HandsFreeController::new(
            config.handsfree.clone(),
            session.clone(),
            ptt.active_handle(),
        )));
        let controls = BoardControls::new(ptt, controller.clone(), credentials, session);

        Self {
            classifier,
            controller,
            controls,
            config,
            runner: None,
        }
    }

    /// The voice activity classifier, for sink registration and frame
    /// feeding from the host's audio context.
    pub fn classifier_mut(&mut self) -> &mut VoiceActivityClassifier {
        &mut self.classifier
    }

    /// The physical control bindings.
    pub fn controls(&self) -> &BoardControls {
        &self.controls
    }

    /// Shared handle to the hands-free controller, for wake events and
    /// host-driven mode toggles.
    pub fn controller(&self) -> Arc<Mutex<HandsFreeController>> {
        self.controller.clone()
    }

    /// Starts the classifier and the periodic hands-free tick loop.
    pub fn start(&mut self) {
        self.classifier.start();

        if self.runner.is_none() {
            let hf = &self.config.handsfree;
            tracing::info!(
                interval_ms = hf.tick_interval_ms,
                retry_ms = hf.retry_cooldown_ms,
                idle_timeout_ms = hf.idle_timeout_ms,
                "hands-free mode armed"
            );
            if !hf.wake_word_available {
                tracing::warn!(
                    "wake-word capability absent; standby wake by voice is unavailable"
                );
            }
            self.runner = Some(HandsFreeRunner::spawn(
                self.controller.clone(),
                hf.tick_interval(),
            ));
        }
    }

    /// Stops the tick loop and the classifier. A stopped front end can be
    /// started again.
    pub fn shutdown(&mut self) {
        if let Some(mut runner) = self.runner.take() {
            runner.stop();
        }
        self.classifier.stop();
    }
}

impl Drop for VoiceFrontend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
