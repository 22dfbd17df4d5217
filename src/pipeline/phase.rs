//! Phase state machine
//!
//! THINK → WORK → ASSIST → STAGING → REVIEW → VERSION → THINK. The
//! transition table is the only source of truth for which moves exist.

use crate::error::{GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Think,
    Work,
    Assist,
    Staging,
    Review,
    Version,
}

/// (from, to) pairs. Everything else is rejected.
const TRANSITIONS: [(Phase, Phase); 6] = [
    (Phase::Think, Phase::Work),
    (Phase::Work, Phase::Assist),
    (Phase::Assist, Phase::Staging),
    (Phase::Staging, Phase::Review),
    (Phase::Review, Phase::Version),
    (Phase::Version, Phase::Think),
];

impl Phase {
    pub const CYCLE: [Phase; 6] = [
        Phase::Think,
        Phase::Work,
        Phase::Assist,
        Phase::Staging,
        Phase::Review,
        Phase::Version,
    ];

    pub fn next(self) -> Phase {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(Phase::Think)
    }

    /// Phases strictly after `self` up to and including VERSION
    pub fn later_phases(self) -> Vec<Phase> {
        Self::CYCLE
            .iter()
            .copied()
            .skip_while(|p| *p != self)
            .skip(1)
            .collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Think => "THINK",
            Phase::Work => "WORK",
            Phase::Assist => "ASSIST",
            Phase::Staging => "STAGING",
            Phase::Review => "REVIEW",
            Phase::Version => "VERSION",
        };
        write!(f, "{}", name)
    }
}

pub fn is_allowed(from: Phase, to: Phase) -> bool {
    TRANSITIONS.contains(&(from, to))
}

/// Look a move up in the table
pub fn check_transition(from: Phase, to: Phase) -> GovernanceResult<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(GovernanceError::Validation(format!(
            "Transition {} -> {} is not allowed",
            from, to
        )))
    }
}
