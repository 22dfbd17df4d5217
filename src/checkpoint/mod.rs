//! Checkpoint Module
//!
//! Blocking human-approval gates in front of sensitive continuations, and the
//! sanitizer that keeps gate copy free of financial framing.

pub mod gate;
pub mod sanitizer;

pub use gate::{Checkpoint, CheckpointGate, CheckpointOutcome, CheckpointResolution, RaiseCheckpoint};
pub use sanitizer::{sanitize, ForbiddenPattern, SanitizedMessage};
