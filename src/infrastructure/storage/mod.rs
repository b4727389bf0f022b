//! In-memory authorization storage

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::traits::AuthStore;

/// Process-lifetime set of authorized identities guarded by a shared secret
pub struct MemoryAuthStore {
    secret: String,
    authorized: Arc<RwLock<HashSet<String>>>,
}

impl MemoryAuthStore {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            authorized: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Number of authorized identities
    pub async fn len(&self) -> usize {
        self.authorized.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.authorized.read().await.is_empty()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn is_authorized(&self, identity: &str) -> bool {
        let authorized = self.authorized.read().await;
        authorized.contains(identity)
    }

    async fn authorize(&self, identity: &str, secret: &str) -> bool {
        if secret != self.secret {
            return false;
        }
        let mut authorized = self.authorized.write().await;
        authorized.insert(identity.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wrong_secret_leaves_set_unchanged() {
        let store = MemoryAuthStore::new("plant123");
        assert!(!store.authorize("1", "nope").await);
        assert!(!store.is_authorized("1").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn correct_secret_admits_once() {
        let store = MemoryAuthStore::new("plant123");
        assert!(store.authorize("1", "plant123").await);
        assert!(store.authorize("1", "plant123").await);
        assert!(store.is_authorized("1").await);
        assert!(!store.is_authorized("2").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_authorizations_are_all_recorded() {
        let store = Arc::new(MemoryAuthStore::new("plant123"));
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.authorize(&i.to_string(), "plant123").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(store.len().await, 32);
    }
}
