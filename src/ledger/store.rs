//! Version Ledger Store
//!
//! Append-only chains of versions, one per partition. Think of this as the
//! commit history of approved work: each version names its parent, and the
//! chain hash makes silent edits detectable.

use crate::error::{GovernanceError, GovernanceResult};
use crate::ledger::version::{compute_chain_hash, compute_checksum, NewVersion, Version};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Store for the per-partition version chains
pub struct VersionLedger {
    /// Partition -> versions ordered by version number
    chains: RwLock<HashMap<String, Vec<Version>>>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Mint the next version of a partition.
    ///
    /// The version number is `1 + max(existing)` and the parent is the current
    /// head. A number that is already taken is an integrity failure.
    pub async fn append(&self, new: NewVersion) -> GovernanceResult<Version> {
        let mut chains = self.chains.write().await;
        let chain = chains.entry(new.partition.clone()).or_default();

        let head = chain.iter().max_by_key(|v| v.version_number);
        let next_number = head.map(|v| v.version_number).unwrap_or(0) + 1;
        let parent_version_id = head.map(|v| v.id);
        let parent_chain_hash = head.map(|v| v.chain_hash.clone());

        let checksum = compute_checksum(&new.content);
        let chain_hash = compute_chain_hash(
            parent_chain_hash.as_deref(),
            &new.partition,
            next_number,
            &checksum,
        );

        let version = Version {
            id: Uuid::new_v4(),
            partition: new.partition,
            version_number: next_number,
            parent_version_id,
            intent_id: new.intent_id,
            review_id: new.review_id,
            approved_by: new.approved_by,
            content: new.content,
            checksum,
            chain_hash,
            created_at: Utc::now(),
        };

        Self::claim(chain, version.clone())?;

        info!(
            "Minted version v{} for partition '{}' (review {})",
            version.version_number, version.partition, version.review_id
        );
        Ok(version)
    }

    /// Push a version onto its chain, refusing a number that is already taken.
    fn claim(chain: &mut Vec<Version>, version: Version) -> GovernanceResult<()> {
        if chain.iter().any(|v| v.version_number == version.version_number) {
            error!(
                "Version number collision: v{} already exists in partition '{}'",
                version.version_number, version.partition
            );
            return Err(GovernanceError::Integrity(format!(
                "version {} already exists in partition '{}'",
                version.version_number, version.partition
            )));
        }
        chain.push(version);
        Ok(())
    }

    /// Get a version by id
    pub async fn get(&self, version_id: Uuid) -> Option<Version> {
        let chains = self.chains.read().await;
        chains
            .values()
            .flat_map(|chain| chain.iter())
            .find(|v| v.id == version_id)
            .cloned()
    }

    /// Head of a partition's chain
    pub async fn latest(&self, partition: &str) -> Option<Version> {
        let chains = self.chains.read().await;
        chains
            .get(partition)?
            .iter()
            .max_by_key(|v| v.version_number)
            .cloned()
    }

    /// Full history of a partition, oldest first
    pub async fn history(&self, partition: &str) -> Vec<Version> {
        let chains = self.chains.read().await;
        let mut list = chains.get(partition).cloned().unwrap_or_default();
        list.sort_by_key(|v| v.version_number);
        list
    }

    /// Recompute every checksum and chain link of a partition.
    pub async fn verify_partition(&self, partition: &str) -> GovernanceResult<usize> {
        let history = self.history(partition).await;
        let mut parent: Option<&Version> = None;

        for (index, version) in history.iter().enumerate() {
            let expected_number = index as u64 + 1;
            if version.version_number != expected_number {
                return Err(GovernanceError::Integrity(format!(
                    "partition '{}' has v{} where v{} was expected",
                    partition, version.version_number, expected_number
                )));
            }

            if compute_checksum(&version.content) != version.checksum {
                error!("Checksum mismatch on {} v{}", partition, version.version_number);
                return Err(GovernanceError::Integrity(format!(
                    "checksum mismatch on version {} of partition '{}'",
                    version.version_number, partition
                )));
            }

            if version.parent_version_id != parent.map(|p| p.id) {
                return Err(GovernanceError::Integrity(format!(
                    "version {} of partition '{}' has a broken parent link",
                    version.version_number, partition
                )));
            }

            let expected_chain = compute_chain_hash(
                parent.map(|p| p.chain_hash.as_str()),
                partition,
                version.version_number,
                &version.checksum,
            );
            if expected_chain != version.chain_hash {
                return Err(GovernanceError::Integrity(format!(
                    "chain hash mismatch on version {} of partition '{}'",
                    version.version_number, partition
                )));
            }

            parent = Some(version);
        }

        Ok(history.len())
    }

    /// Number of versions across all partitions
    pub async fn count(&self) -> usize {
        let chains = self.chains.read().await;
        chains.values().map(Vec::len).sum()
    }
}

impl Default for VersionLedger {
    fn default() -> Self {
        Self::new()
    }
}
