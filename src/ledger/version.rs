//! Version records
//!
//! A Version is an immutable, hash-chained snapshot of approved content.
//! Fields are only reachable through getters; nothing outside the ledger can
//! construct or alter one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub(super) id: Uuid,
    pub(super) partition: String,
    pub(super) version_number: u64,
    pub(super) parent_version_id: Option<Uuid>,
    pub(super) intent_id: Uuid,
    pub(super) review_id: Uuid,
    pub(super) approved_by: String,
    pub(super) content: serde_json::Value,
    pub(super) checksum: String,
    pub(super) chain_hash: String,
    pub(super) created_at: DateTime<Utc>,
}

impl Version {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn version_number(&self) -> u64 {
        self.version_number
    }

    pub fn parent_version_id(&self) -> Option<Uuid> {
        self.parent_version_id
    }

    pub fn intent_id(&self) -> Uuid {
        self.intent_id
    }

    pub fn review_id(&self) -> Uuid {
        self.review_id
    }

    pub fn approved_by(&self) -> &str {
        &self.approved_by
    }

    pub fn content(&self) -> &serde_json::Value {
        &self.content
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn chain_hash(&self) -> &str {
        &self.chain_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Always true. Versions are superseded, never edited.
    pub fn is_immutable(&self) -> bool {
        true
    }
}

/// Input for minting the next version of a partition
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub partition: String,
    pub intent_id: Uuid,
    pub review_id: Uuid,
    pub approved_by: String,
    pub content: serde_json::Value,
}

/// SHA-256 over the canonical JSON encoding of the content.
///
/// `serde_json::Value` objects keep their keys sorted, so equal content always
/// hashes to the same digest regardless of insertion order.
pub fn compute_checksum(content: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Links a version to its parent: H(parent chain hash | partition | number | checksum)
pub fn compute_chain_hash(
    parent_chain_hash: Option<&str>,
    partition: &str,
    version_number: u64,
    checksum: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parent_chain_hash.unwrap_or("genesis").as_bytes());
    hasher.update(b"|");
    hasher.update(partition.as_bytes());
    hasher.update(b"|");
    hasher.update(version_number.to_be_bytes());
    hasher.update(b"|");
    hasher.update(checksum.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_ignores_key_order() {
        let a = json!({"title": "Q4 report", "sections": 3});
        let b: serde_json::Value =
            serde_json::from_str(r#"{"sections": 3, "title": "Q4 report"}"#).unwrap();
        assert_eq!(compute_checksum(&a), compute_checksum(&b));
    }

    #[test]
    fn test_checksum_changes_with_content() {
        assert_ne!(
            compute_checksum(&json!({"title": "draft"})),
            compute_checksum(&json!({"title": "final"}))
        );
    }

    #[test]
    fn test_chain_hash_depends_on_parent() {
        let genesis = compute_chain_hash(None, "business", 1, "abc");
        let child_a = compute_chain_hash(Some(&genesis), "business", 2, "def");
        let child_b = compute_chain_hash(Some("other"), "business", 2, "def");
        assert_ne!(child_a, child_b);
    }
}
