//! Policy Module
//!
//! Restricts what autonomous agents may do or say:
//! - a closed set of forbidden actions and a communication matrix
//! - a suggestion-language linter
//! - an append-only violation log and the compliance report derived from it
//! - sensitivity classification feeding the checkpoint gate

pub mod compliance;
pub mod failsafe;
pub mod guard;
pub mod sensitivity;
pub mod suggestion;
pub mod types;

pub use compliance::ComplianceReport;
pub use failsafe::FailSafeResponse;
pub use guard::PolicyGuard;
pub use sensitivity::{classify_actions, PendingAction};
pub use suggestion::{is_valid_suggestion, SuggestionVerdict};
pub use types::{ForbiddenAction, Participant, PolicyViolation, Sensitivity, Severity, ViolationType};
