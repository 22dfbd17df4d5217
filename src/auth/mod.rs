//! Authentication and authorization module
//!
//! Identifies the human actor behind each mutating request and checks their
//! role. Agents never hold tokens.

mod jwt;
mod middleware;

pub use jwt::{create_token, decode_token, Claims, ACCESS_TOKEN_EXPIRATION_MINUTES};
pub use middleware::{auth_middleware, require_role};

use serde::{Deserialize, Serialize};

/// Human roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access to phases, checkpoints and the ledger
    #[default]
    Observer,
    /// Can capture, submit, cancel and drive intents
    Operator,
    /// Can additionally review staged content and resolve checkpoints
    Reviewer,
}

impl Role {
    pub fn can_operate(&self) -> bool {
        matches!(self, Role::Operator | Role::Reviewer)
    }

    pub fn can_review(&self) -> bool {
        matches!(self, Role::Reviewer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Observer => write!(f, "observer"),
            Role::Operator => write!(f, "operator"),
            Role::Reviewer => write!(f, "reviewer"),
        }
    }
}
