//! Viewer sign-in and session checks
//!
//! Credentials are a pluggable check. The default accepts any non-empty
//! username without a password; the identity token it hands back is what
//! the WebSocket route requires.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Signed-in viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub token: String,
    pub username: String,
}

#[async_trait]
pub trait CredentialCheck: Send + Sync {
    async fn authorize(&self, username: &str) -> Option<Identity>;
}

/// Accepts any username, no password
#[derive(Debug, Clone, Default)]
pub struct PermissiveCredentials;

#[async_trait]
impl CredentialCheck for PermissiveCredentials {
    async fn authorize(&self, username: &str) -> Option<Identity> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }
        Some(Identity {
            token: ulid::Ulid::new().to_string(),
            username: username.to_string(),
        })
    }
}

pub(crate) fn query_param<'a>(request: &'a Request<Body>, key: &str) -> Option<&'a str> {
    let query = request.uri().query()?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Middleware that sends viewers without a valid session to the sign-in page
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let token = query_param(&request, "token").map(str::to_string);
    let identity = match token {
        Some(token) => state.identity_for_token(&token).await,
        None => None,
    };

    if identity.is_none() {
        tracing::info!("Unauthenticated viewer on {}, redirecting", request.uri().path());
        return Redirect::temporary("/signin").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        let req = Request::builder()
            .uri("/ws?room=AB7DEZ&token=abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(query_param(&req, "token"), Some("abc"));
        assert_eq!(query_param(&req, "room"), Some("AB7DEZ"));
        assert_eq!(query_param(&req, "missing"), None);
    }

    #[tokio::test]
    async fn test_permissive_accepts_any_username() {
        let check = PermissiveCredentials;
        let identity = check.authorize("  jsmith ").await.unwrap();
        assert_eq!(identity.username, "jsmith");
        assert!(!identity.token.is_empty());
    }

    #[tokio::test]
    async fn test_permissive_rejects_blank_username() {
        let check = PermissiveCredentials;
        assert!(check.authorize("").await.is_none());
        assert!(check.authorize("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let check = PermissiveCredentials;
        let a = check.authorize("Alice").await.unwrap();
        let b = check.authorize("Alice").await.unwrap();
        assert_ne!(a.token, b.token);
    }
}
