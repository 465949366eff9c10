//! Identity directory: maps access tokens and DIDs to users and roles.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vouch_core::{Did, Role};

use crate::error::IdentityError;

/// A directory user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub did: Did,
    #[serde(rename = "user_type")]
    pub role: Role,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(did: Did, role: Role) -> Self {
        Self {
            did,
            role,
            display_name: None,
        }
    }

    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Authentication and role lookup on behalf of a caller's access token.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// The user the token belongs to.
    async fn resolve_self(&self, token: &str) -> Result<Identity, IdentityError>;

    /// Another user, looked up with the caller's token.
    async fn resolve_by_did(&self, token: &str, did: &Did) -> Result<Identity, IdentityError>;
}

#[derive(Deserialize)]
struct UserInfoEnvelope {
    user_info: Identity,
}

/// Directory service reached over HTTP. The token travels as the
/// `access_token` cookie.
pub struct HttpIdentityDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityDirectory {
    /// `base_url` is the API root, e.g. `http://directory:8080/api/v0`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::DirectoryUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_user(&self, path: &str, token: &str) -> Result<Identity, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::COOKIE, format!("access_token={}", token))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "directory request failed");
                IdentityError::DirectoryUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(url = %url, status = status.as_u16(), "directory rejected request");
            return Err(IdentityError::Directory {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: UserInfoEnvelope = response
            .json()
            .await
            .map_err(|e| IdentityError::DirectoryResponse(e.to_string()))?;
        Ok(envelope.user_info)
    }
}

#[async_trait]
impl IdentityLookup for HttpIdentityDirectory {
    async fn resolve_self(&self, token: &str) -> Result<Identity, IdentityError> {
        self.get_user("/user/self", token).await
    }

    async fn resolve_by_did(&self, token: &str, did: &Did) -> Result<Identity, IdentityError> {
        self.get_user(&format!("/user/{}", did), token).await
    }
}

/// In-memory directory for tests and local runs.
#[derive(Default)]
pub struct StaticDirectory {
    users: DashMap<String, Identity>,
    sessions: DashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user without a session.
    pub fn add_user(&self, identity: Identity) {
        self.users.insert(identity.did.to_string(), identity);
    }

    /// Register a user and bind `token` to them.
    pub fn add_session(&self, token: impl Into<String>, identity: Identity) {
        self.sessions.insert(token.into(), identity.did.to_string());
        self.add_user(identity);
    }

    fn not_found(what: &str) -> IdentityError {
        IdentityError::Directory {
            status: 404,
            body: format!("{{\"error\":\"{} not found\"}}", what),
        }
    }
}

#[async_trait]
impl IdentityLookup for StaticDirectory {
    async fn resolve_self(&self, token: &str) -> Result<Identity, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        let did = self
            .sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| IdentityError::Directory {
                status: 401,
                body: "{\"error\":\"invalid access token\"}".into(),
            })?;
        self.users
            .get(&did)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn resolve_by_did(&self, token: &str, did: &Did) -> Result<Identity, IdentityError> {
        self.resolve_self(token).await?;
        self.users
            .get(did.uri())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Self::not_found("user"))
    }
}
