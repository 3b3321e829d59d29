//! Audio subsystem
//!
//! Voice activity classification and the level measurement it builds on.
//! Frame capture and the codec's I/O transport live in the host; frames
//! arrive here already sliced to the classifier's required length.

pub mod metering;
pub mod vad;

pub use vad::{VadConfig, VoiceActivityClassifier};
