//! Version Ledger Module
//!
//! Immutable, hash-chained history of human-approved content, scoped per
//! partition. There is no update or delete path: "undo" is always a new
//! version that supersedes the old one.

pub mod store;
pub mod version;

pub use store::VersionLedger;
pub use version::{NewVersion, Version};
