use super::AppState;
use crate::auth::Identity;
use std::collections::{HashMap, VecDeque};

/// Signed-in viewers by token, remembering sign-in order for eviction
#[derive(Debug, Default)]
pub struct SessionStore {
    by_token: HashMap<String, Identity>,
    order: VecDeque<String>,
}

impl SessionStore {
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<&Identity> {
        self.by_token.get(token)
    }

    /// Store the identity, dropping the oldest sessions beyond `limit`
    fn insert(&mut self, identity: Identity, limit: usize) {
        if self
            .by_token
            .insert(identity.token.clone(), identity.clone())
            .is_none()
        {
            self.order.push_back(identity.token);
        }

        while self.by_token.len() > limit.max(1) {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.by_token.remove(&oldest) {
                tracing::debug!(username = %evicted.username, "Session evicted");
            }
        }
    }
}

impl AppState {
    /// Run the credential check and remember the identity it hands back
    pub async fn sign_in(&self, username: &str) -> Option<Identity> {
        let identity = self.credentials.authorize(username).await?;
        tracing::info!(username = %identity.username, "Viewer signed in");

        self.sessions
            .write()
            .await
            .insert(identity.clone(), self.session_limit);
        Some(identity)
    }

    pub async fn identity_for_token(&self, token: &str) -> Option<Identity> {
        self.sessions.read().await.get(token).cloned()
    }
}
