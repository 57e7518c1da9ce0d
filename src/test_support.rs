//! Fixtures and fake collaborators shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::config::{SignInConfig, SiteConfig};
use crate::domain::PromptRepository;
use crate::errors::{AuthError, RepoError};
use crate::identity::{AccessPolicy, AllowListPolicy, Identity, IdentityProvider};
use crate::models::{NewPrompt, Prompt};
use crate::repositories::InMemoryPromptRepository;
use crate::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_UID: &str = "admin-uid";
pub const VISITOR_TOKEN: &str = "visitor-token";

/// A prompt created `minutes` after a fixed epoch.
pub fn prompt_at(slug: &str, category: &str, minutes: i64) -> Prompt {
    let base = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    Prompt {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Title {slug}"),
        short_description: format!("About {slug}"),
        category: category.to_string(),
        prompt_text: format!("Prompt text for {slug}"),
        blog_content: None,
        image_url: None,
        created_at: Some(base + Duration::minutes(minutes)),
    }
}

/// Three prompts `a`, `b`, `c` created in that order.
pub fn scenario_abc() -> Vec<Prompt> {
    vec![
        prompt_at("a", "Trending", 1),
        prompt_at("b", "Festival", 2),
        prompt_at("c", "Trending", 3),
    ]
}

pub fn site() -> SiteConfig {
    SiteConfig {
        base_url: "https://prompts.example.com".to_string(),
        name: "Prompt Gallery".to_string(),
    }
}

pub fn sign_in() -> SignInConfig {
    SignInConfig {
        api_key: "web-api-key".to_string(),
        auth_domain: "prompts-demo.firebaseapp.com".to_string(),
    }
}

/// Accepts two fixed tokens; everything else is rejected.
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<Identity, AuthError> {
        match id_token {
            ADMIN_TOKEN => Ok(Identity {
                uid: ADMIN_UID.to_string(),
                display_name: Some("Site Admin".to_string()),
                email: None,
            }),
            VISITOR_TOKEN => Ok(Identity {
                uid: "visitor-uid".to_string(),
                display_name: None,
                email: Some("visitor@example.com".to_string()),
            }),
            _ => Err(AuthError::InvalidToken("unknown token".to_string())),
        }
    }
}

/// Wraps a repository and counts calls per operation.
#[derive(Default)]
pub struct CountingRepository {
    pub inner: InMemoryPromptRepository,
    pub list_recent_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl CountingRepository {
    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        Self {
            inner: InMemoryPromptRepository::with_prompts(prompts),
            ..Default::default()
        }
    }

    pub fn list_recent_calls(&self) -> usize {
        self.list_recent_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptRepository for CountingRepository {
    async fn list_all(&self) -> Result<Vec<Prompt>, RepoError> {
        self.inner.list_all().await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Prompt>, RepoError> {
        self.list_recent_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_recent(limit).await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Prompt>, RepoError> {
        self.inner.list_by_category(category).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Prompt>, RepoError> {
        self.inner.find_by_slug(slug).await
    }

    async fn create(&self, new_prompt: NewPrompt) -> Result<Prompt, RepoError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(new_prompt).await
    }
}

/// Every operation fails as if the store were unreachable.
pub struct UnreachableRepository;

#[async_trait]
impl PromptRepository for UnreachableRepository {
    async fn list_all(&self) -> Result<Vec<Prompt>, RepoError> {
        Err(unreachable_store())
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<Prompt>, RepoError> {
        Err(unreachable_store())
    }

    async fn list_by_category(&self, _category: &str) -> Result<Vec<Prompt>, RepoError> {
        Err(unreachable_store())
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Prompt>, RepoError> {
        Err(unreachable_store())
    }

    async fn create(&self, _new_prompt: NewPrompt) -> Result<Prompt, RepoError> {
        Err(unreachable_store())
    }
}

fn unreachable_store() -> RepoError {
    RepoError::BackendError(anyhow::anyhow!("dispatch failure: connection refused"))
}

pub fn admin_policy() -> AllowListPolicy {
    AllowListPolicy::publishers([ADMIN_UID.to_string()])
}

pub fn app_state(repo: Arc<dyn PromptRepository>) -> Arc<AppState> {
    let policy: Arc<dyn AccessPolicy> = Arc::new(admin_policy());
    Arc::new(AppState {
        prompt_repo: repo,
        identity: Arc::new(FakeIdentityProvider),
        policy,
        site: site(),
        sign_in: sign_in(),
    })
}
