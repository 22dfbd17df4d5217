//! Idempotency keys for human actions
//!
//! A retried review or checkpoint resolution carrying the same
//! `Idempotency-Key` gets the original response back instead of a second
//! decision. Reusing a key for a different request is a conflict.

use crate::error::{conflict_error, GovernanceResult};
use axum::http::HeaderMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

#[derive(Debug, Clone)]
struct StoredResponse {
    fingerprint: String,
    body: serde_json::Value,
}

pub struct IdempotencyStore {
    /// (scope, key) -> stored response
    entries: RwLock<HashMap<(String, String), StoredResponse>>,
}

/// Read the key header, ignoring blank values
pub fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Stable hash of a request body
pub fn fingerprint<T: Serialize>(request: &T) -> String {
    let bytes = serde_json::to_vec(request).unwrap_or_default();
    format!("{:x}", Sha256::digest(&bytes))
}

impl IdempotencyStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Previously stored response for this key, if the request matches
    pub async fn lookup(
        &self,
        scope: &str,
        key: &str,
        fingerprint: &str,
    ) -> GovernanceResult<Option<serde_json::Value>> {
        let entries = self.entries.read().await;
        match entries.get(&(scope.to_string(), key.to_string())) {
            Some(stored) if stored.fingerprint == fingerprint => {
                debug!(scope, key, "Replaying idempotent response");
                Ok(Some(stored.body.clone()))
            }
            Some(_) => Err(conflict_error(format!(
                "Idempotency key '{}' was already used for a different request",
                key
            ))),
            None => Ok(None),
        }
    }

    /// Remember a response. The first stored response for a key wins.
    pub async fn store(&self, scope: &str, key: &str, fingerprint: String, body: serde_json::Value) {
        let mut entries = self.entries.write().await;
        entries
            .entry((scope.to_string(), key.to_string()))
            .or_insert(StoredResponse { fingerprint, body });
    }
}

impl Default for IdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[tokio::test]
    async fn test_replay_same_request() {
        let store = IdempotencyStore::new();
        let print = fingerprint(&json!({ "decision": "accept" }));

        assert_eq!(store.lookup("review", "k1", &print).await.unwrap(), None);
        store.store("review", "k1", print.clone(), json!({ "id": 1 })).await;

        assert_eq!(
            store.lookup("review", "k1", &print).await.unwrap(),
            Some(json!({ "id": 1 }))
        );
    }

    #[tokio::test]
    async fn test_key_reuse_with_different_request() {
        let store = IdempotencyStore::new();
        store
            .store("review", "k1", fingerprint(&json!({ "decision": "accept" })), json!({}))
            .await;

        let other = fingerprint(&json!({ "decision": "reject" }));
        let result = store.lookup("review", "k1", &other).await;
        assert!(matches!(result, Err(GovernanceError::Conflict(_))));
        // Scopes are independent
        assert_eq!(store.lookup("checkpoint", "k1", &other).await.unwrap(), None);
    }

    #[test]
    fn test_blank_header_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(idempotency_key(&headers), None);
        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static("  "));
        assert_eq!(idempotency_key(&headers), None);
        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(idempotency_key(&headers), Some("abc".to_string()));
    }
}
