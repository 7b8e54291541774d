//! Heuristics module.
//!
//! This module exports the approximate selection-and-routing algorithms.

pub mod streaming;
pub mod subset_mst;
pub mod ratio;
pub mod ratio_spread;

pub use streaming::{StepRecord, StreamOutcome};
pub use subset_mst::*;
pub use ratio::*;
pub use ratio_spread::*;
