//! Admin identity: who is signing in, and what they may do.
//!
//! The identity provider only proves *who* the caller is. Whether that
//! identity may publish prompts is decided separately by an [`AccessPolicy`].

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Name shown in the admin header.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Admin")
    }
}

/// Exchanges an ID token obtained from the sign-in popup for an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn verify(&self, id_token: &str) -> Result<Identity, AuthError>;
}

/// Permissions an [`AccessPolicy`] can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PublishPrompts,
}

pub trait AccessPolicy: Send + Sync + 'static {
    fn allows(&self, identity: &Identity, capability: Capability) -> bool;
}

/// Capability sets keyed by uid.
#[derive(Debug, Clone, Default)]
pub struct AllowListPolicy {
    grants: HashMap<String, HashSet<Capability>>,
}

impl AllowListPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, uid: impl Into<String>, capability: Capability) -> Self {
        self.grants.entry(uid.into()).or_default().insert(capability);
        self
    }

    /// Grants `PublishPrompts` to every listed uid.
    pub fn publishers<I>(uids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        uids.into_iter()
            .fold(Self::new(), |policy, uid| policy.grant(uid, Capability::PublishPrompts))
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl AccessPolicy for AllowListPolicy {
    fn allows(&self, identity: &Identity, capability: Capability) -> bool {
        self.grants
            .get(&identity.uid)
            .is_some_and(|caps| caps.contains(&capability))
    }
}

/// Verifies Firebase ID tokens through the Identity Toolkit `accounts:lookup` endpoint.
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FirebaseIdentityProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn lookup_request(&self, id_token: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/v1/accounts:lookup", self.endpoint))
            .query(&[("key", &self.api_key)])
            .json(&LookupRequest { id_token })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    display_name: Option<String>,
    email: Option<String>,
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<Identity, AuthError> {
        if id_token.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty token".to_string()));
        }

        let response = self
            .lookup_request(id_token)
            .send()
            .await
            .context("Identity provider request failed")?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::warn!(%status, "Identity provider rejected token");
            return Err(AuthError::InvalidToken(body));
        }
        if !status.is_success() {
            return Err(AuthError::Backend(anyhow::anyhow!(
                "Identity provider responded with {}",
                status
            )));
        }

        let payload: LookupResponse = response
            .json()
            .await
            .context("Failed to parse identity provider response")?;
        let user = payload
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::InvalidToken("no user for token".to_string()))?;

        tracing::debug!(uid = %user.local_id, "Identity verified");
        Ok(Identity {
            uid: user.local_id,
            display_name: user.display_name.filter(|s| !s.is_empty()),
            email: user.email,
        })
    }
}
