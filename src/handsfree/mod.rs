//! Hands-free session control
//!
//! Decides, on a coarse periodic tick, whether the device should be
//! listening at all. Split into the pure per-tick decision rules, the
//! controller that applies them through the device session, and the thread
//! that delivers the ticks.

pub mod controller;
pub mod decision;
pub mod runner;

pub use controller::{HandsFreeController, HandsfreeConfig};
pub use decision::{decide, TickDecision, TickInputs};
pub use runner::HandsFreeRunner;
