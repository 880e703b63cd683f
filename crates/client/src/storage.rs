//! Token storage backends.

use std::sync::Arc;

use async_trait::async_trait;
use encore_primitives::api::{AuthToken, TokenStore};
use tokio::sync::RwLock;

/// Keeps the bearer token in memory for the lifetime of the process.
///
/// Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token))),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<AuthToken> {
        self.token.read().await.clone()
    }

    async fn store(&self, token: AuthToken) {
        *self.token.write().await = Some(token);
    }

    async fn clear(&self) {
        *self.token.write().await = None;
    }
}
