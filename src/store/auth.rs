//! Store for the authenticated session

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::authentication::{self, AuthToken, Session};
use crate::requests::Requests;

/// Holds the verified session for the running application
pub struct AuthStore {
    requests: Arc<dyn Requests>,
    session: RwLock<Option<Session>>,
}

impl AuthStore {
    pub fn new(requests: Arc<dyn Requests>) -> Self {
        Self {
            requests,
            session: RwLock::new(None),
        }
    }

    /// Exchange credentials for a token. The session is established by a
    /// subsequent [`AuthStore::verify`] once the transport carries the token.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken> {
        let token = authentication::login(self.requests.as_ref(), username, password)
            .await
            .with_context(|| format!("Login failed for '{}'", username))?;
        info!("Obtained session token for '{}'", username);
        Ok(token)
    }

    /// Validate the current token and hold the session it belongs to
    pub async fn verify(&self) -> Result<Session> {
        let session = authentication::verify(self.requests.as_ref())
            .await
            .context("Session verification failed")?;

        let mut held = self.session.write().await;
        *held = Some(session.clone());
        Ok(session)
    }

    /// Invalidate the session on the backend and drop it locally
    pub async fn logout(&self) -> Result<()> {
        authentication::logout(self.requests.as_ref())
            .await
            .context("Logout failed")?;

        let mut held = self.session.write().await;
        *held = None;
        info!("Signed out");
        Ok(())
    }

    /// The held session, if verified
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Username of the authenticated user
    pub async fn username(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.username.clone())
    }

    /// Whether the authenticated user carries a role
    pub async fn has_role(&self, role: &str) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.roles.iter().any(|held| held == role))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::testing::FakeRequests;
    use serde_json::json;

    #[tokio::test]
    async fn test_verify_establishes_the_session() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(json!({"username": "vrr-prep", "roles": ["write"]}));
        let store = AuthStore::new(fake);

        assert!(store.session().await.is_none());
        store.verify().await.unwrap();

        assert_eq!(store.username().await.as_deref(), Some("vrr-prep"));
        assert!(store.has_role("write").await);
        assert!(!store.has_role("admin").await);
    }

    #[tokio::test]
    async fn test_logout_drops_the_session() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(json!({"username": "vrr-prep"}));
        fake.respond_with(json!(null));
        let store = AuthStore::new(fake);

        store.verify().await.unwrap();
        store.logout().await.unwrap();
        assert!(store.session().await.is_none());
    }

    #[tokio::test]
    async fn test_login_surfaces_backend_failures() {
        let fake = Arc::new(FakeRequests::new());
        fake.fail_with(crate::requests::RequestError::Status {
            status: "401 Unauthorized".to_string(),
            url: "/rosalution/api/auth/token".to_string(),
        });
        let store = AuthStore::new(fake);

        let error = store.login("vrr-prep", "wrong").await.unwrap_err();
        assert!(format!("{:#}", error).contains("401 Unauthorized"));
    }
}
