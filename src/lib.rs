//! Hark: voice-interaction front end for a hands-free conversational
//! device.
//!
//! Two small real-time control loops: a debounced voice-activity classifier
//! over the microphone frame stream, and a hands-free controller that
//! decides on a coarse periodic tick whether the listening channel should be
//! open at all. The device runtime is an external collaborator reached
//! through the [`session::DeviceSession`] trait; hardware bring-up, display
//! rendering and the codec's I/O transport all live in the host.

pub mod audio;
pub mod config;
pub mod controls;
pub mod credentials;
pub mod handsfree;
pub mod ptt;
pub mod service;
pub mod session;

pub use audio::{VadConfig, VoiceActivityClassifier};
pub use config::Config;
pub use controls::{BoardControls, ButtonEvent};
pub use credentials::{CredentialError, CredentialStore};
pub use handsfree::{HandsFreeController, HandsfreeConfig};
pub use ptt::PushToTalk;
pub use service::VoiceFrontend;
pub use session::{DeviceSession, DeviceState};
