//! Governed Execution Pipeline
//!
//! Every intent travels the same six phases:
//!
//! 1. **THINK**: a human captures and submits the intent
//! 2. **WORK**: an agent executes inside a disposable sandbox
//! 3. **ASSIST**: the output waits as an unreviewed candidate
//! 4. **STAGING**: the candidate is queued for a human
//! 5. **REVIEW**: a human accepts, rejects, modifies or defers
//! 6. **VERSION**: only an accepted item becomes an immutable version

pub mod core_loop;
pub mod phase;
pub mod sandbox;
pub mod staging;
pub mod state;
pub mod types;

// Re-export main types for convenient access
pub use core_loop::CoreLoop;
pub use phase::Phase;
pub use sandbox::{SandboxContext, WorkExecutor, WorkOutput};
pub use staging::StagingStore;
pub use state::{BlockedPhase, Pause, PipelineState};
pub use types::*;
