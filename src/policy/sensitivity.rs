//! Sensitivity classification of pending action bundles
//!
//! Decides how dangerous a continuation is before it runs. The checkpoint gate
//! compares the result against its configured threshold.

use crate::policy::types::{ForbiddenAction, Sensitivity};
use serde::{Deserialize, Serialize};

/// An action waiting behind a potential checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Cannot be undone once executed
    #[serde(default)]
    pub irreversible: bool,
    /// Touches something outside the workspace
    #[serde(default)]
    pub external: bool,
}

impl PendingAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            irreversible: false,
            external: false,
        }
    }

    pub fn irreversible(mut self) -> Self {
        self.irreversible = true;
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    fn sensitivity(&self) -> Sensitivity {
        if ForbiddenAction::from_name(&self.name).is_some() {
            Sensitivity::Critical
        } else if self.irreversible {
            Sensitivity::High
        } else if self.external {
            Sensitivity::Medium
        } else {
            Sensitivity::Low
        }
    }
}

/// The bundle is as sensitive as its most sensitive action
pub fn classify_actions(actions: &[PendingAction]) -> Sensitivity {
    actions
        .iter()
        .map(PendingAction::sensitivity)
        .max()
        .unwrap_or(Sensitivity::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle_is_low() {
        assert_eq!(classify_actions(&[]), Sensitivity::Low);
    }

    #[test]
    fn test_bundle_takes_the_maximum() {
        let actions = vec![
            PendingAction::new("summarize", "summarize notes"),
            PendingAction::new("send_email", "notify the team").external(),
            PendingAction::new("archive_folder", "archive the folder").irreversible(),
        ];
        assert_eq!(classify_actions(&actions), Sensitivity::High);
    }

    #[test]
    fn test_forbidden_action_is_critical() {
        let actions = vec![PendingAction::new("finalize_decision", "close the matter")];
        assert_eq!(classify_actions(&actions), Sensitivity::Critical);
    }
}
