//! Governed Execution Pipeline
//!
//! A workflow engine where autonomous agents may only propose and humans
//! decide. Agent output is staged, reviewed by a named human and only then
//! minted into an immutable, hash-chained version history. A policy guard
//! keeps agents away from forbidden actions and prescriptive language, and
//! a checkpoint gate stops sensitive continuations until a human signs off.

pub mod audit;
pub mod auth;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod idempotency;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod routes;
pub mod state;

pub use error::{GovernanceError, GovernanceResult};
