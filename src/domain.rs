use crate::errors::RepoError;
use crate::models::{NewPrompt, Prompt};
use async_trait::async_trait;

/// Trait defining operations for storing and retrieving prompt records.
///
/// Every list is ordered by `created_at`, newest first. Records without a
/// `created_at` are legacy data: `list_all` and `find_by_slug` still return
/// them, while `list_recent` and `list_by_category` skip them because they are
/// absent from the recency and category indexes.
#[async_trait]
pub trait PromptRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Lists every prompt.
    /// WARNING: reads the whole collection. Use `list_recent` for bounded views.
    async fn list_all(&self) -> Result<Vec<Prompt>, RepoError>;

    /// The `limit` most recently created prompts.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Prompt>, RepoError>;

    /// Prompts whose category equals `category` exactly (case-sensitive).
    async fn list_by_category(&self, category: &str) -> Result<Vec<Prompt>, RepoError>;

    /// Resolves a slug. Among duplicates the newest record wins; undated
    /// records lose to dated ones.
    /// Returns Ok(None) if no prompt carries the slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Prompt>, RepoError>;

    /// Assigns an id and creation timestamp and stores the prompt.
    /// Fails with `RepoError::DuplicateSlug` if the slug is taken.
    async fn create(&self, new_prompt: NewPrompt) -> Result<Prompt, RepoError>;
}
