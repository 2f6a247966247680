// Operator session - login state with injected persistence
use crate::application::monitoring_api::MonitoringApi;
use crate::domain::admin::{Credentials, User};
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Token and user persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredSession>>;

    async fn save(&self, session: &StoredSession) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

pub struct Session {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<StoredSession>>,
}

impl Session {
    /// Restore whatever the store holds from a previous run.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Result<Self> {
        let current = store.load().await?;
        if let Some(s) = &current {
            tracing::info!(username = %s.user.username, "restored operator session");
        }
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    pub async fn login(
        &self,
        api: &dyn MonitoringApi,
        username: &str,
        password: &str,
    ) -> Result<User> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = api.login(&credentials).await?;

        let session = StoredSession {
            token: response.token,
            user: User {
                username: response.username,
                role: response.role,
            },
        };
        self.store.save(&session).await?;

        let user = session.user.clone();
        *self.current.write().await = Some(session);
        tracing::info!(username = %user.username, role = %user.role, "operator logged in");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        let previous = self.current.write().await.take();
        self.store.clear().await?;
        if let Some(s) = previous {
            tracing::info!(username = %s.user.username, "operator logged out");
        }
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn require_token(&self) -> Result<String> {
        self.token().await.ok_or(MonitorError::Unauthorized)
    }
}
