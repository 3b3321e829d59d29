//! Physical control bindings
//!
//! Maps already-debounced button events onto the voice front end: the
//! primary control is push-to-talk, the secondary control toggles
//! hands-free mode on a click and resets stored credentials on a long
//! press. Debouncing and long-press timing are the host button driver's
//! job; this module only consumes its events.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::credentials::{self, CredentialError, CredentialStore};
use crate::handsfree::HandsFreeController;
use crate::ptt::PushToTalk;
use crate::session::DeviceSession;

/// Debounced event from a physical control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// The control went down.
    PressDown,
    /// The control came back up.
    PressUp,
    /// A short press completed.
    Click,
    /// The control was held past the long-press threshold.
    LongPress,
}

/// Bindings from the two physical controls to front-end actions.
pub struct BoardControls {
    ptt: PushToTalk,
    controller: Arc<Mutex<HandsFreeController>>,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<dyn DeviceSession>,
}

impl BoardControls {
    pub fn new(
        ptt: PushToTalk,
        controller: Arc<Mutex<HandsFreeController>>,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn DeviceSession>,
    ) -> Self {
        Self {
            ptt,
            controller,
            credentials,
            session,
        }
    }

    /// The push-to-talk handler, for hosts that need direct access.
    pub fn push_to_talk(&self) -> &PushToTalk {
        &self.ptt
    }

    /// Primary control: hold to talk.
    pub fn handle_primary(&self, event: ButtonEvent) {
        match event {
            ButtonEvent::PressDown => self.ptt.press(),
            ButtonEvent::PressUp => self.ptt.release(),
            ButtonEvent::Click | ButtonEvent::LongPress => {}
        }
    }

    /// Secondary control: click toggles hands-free mode, long press resets
    /// stored credentials.
    ///
    /// `Ok(())` after a [`ButtonEvent::LongPress`] means the credentials
    /// were cleared and the host should restart the device.
    pub fn handle_secondary(&self, event: ButtonEvent) -> Result<(), CredentialError> {
        match event {
            ButtonEvent::Click => {
                self.controller.lock().toggle_hands_free_mode();
                Ok(())
            }
            ButtonEvent::LongPress => {
                tracing::warn!("credential reset requested via long press");
                credentials::run_credential_reset(self.credentials.as_ref(), self.session.as_ref())
            }
            ButtonEvent::PressDown | ButtonEvent::PressUp => Ok(()),
        }
    }
}
