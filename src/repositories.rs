use crate::{
    domain::PromptRepository,
    errors::RepoError,
    models::{sort_by_recency, NewPrompt, Prompt},
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoDbClient};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{self, info};
use uuid::Uuid;

/// GSI over (`feed`, `created_at`), used for bounded recency queries.
pub const RECENCY_INDEX: &str = "recency-index";
/// GSI over (`category`, `created_at`).
pub const CATEGORY_INDEX: &str = "category-index";
/// GSI over (`slug`, `created_at`).
pub const SLUG_INDEX: &str = "slug-index";
/// Constant partition value every prompt carries in the `feed` attribute.
pub const FEED_KEY: &str = "prompts";

#[derive(Debug, Clone)]
pub struct DynamoDbPromptRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbPromptRepository {
    /// Creates a new repository instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbPromptRepository");
        Self { client, table_name }
    }

    /// Queries one of the GSIs newest first, following pages until `limit`
    /// items are collected or the index is exhausted.
    async fn query_index(
        &self,
        index_name: &str,
        key_attr: &str,
        key_value: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Prompt>, RepoError> {
        let mut prompts: Vec<Prompt> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(index_name)
                .key_condition_expression("#k = :v")
                .expression_attribute_names("#k", key_attr)
                .expression_attribute_values(":v", AttributeValue::S(key_value.to_string()))
                .scan_index_forward(false)
                .set_exclusive_start_key(last_evaluated_key.take());

            if let Some(limit) = limit {
                let remaining = limit.saturating_sub(prompts.len());
                request_builder = request_builder.limit(i32::try_from(remaining).unwrap_or(i32::MAX));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!(
                    "DynamoDB: Failed to query index '{}' of table '{}'",
                    index_name, self.table_name
                ))
                .map_err(RepoError::BackendError)?;

            for item in resp.items.unwrap_or_default() {
                prompts.push(self.parse_item(&item)?);
            }

            last_evaluated_key = resp.last_evaluated_key;
            let satisfied = limit.is_some_and(|limit| prompts.len() >= limit);
            if last_evaluated_key.is_none() || satisfied {
                break;
            }
            tracing::debug!(index = %index_name, table_name = %self.table_name, "DynamoDB Query: Continuing with LastEvaluatedKey...");
        }

        if let Some(limit) = limit {
            prompts.truncate(limit);
        }
        Ok(prompts)
    }

    /// Full-table Scan for records carrying `slug`. Only reached when the
    /// slug index has no entry for it.
    async fn scan_by_slug(&self, slug: &str) -> Result<Vec<Prompt>, RepoError> {
        tracing::debug!(%slug, table_name = %self.table_name, "DynamoDB: Slug not indexed, scanning");
        let mut prompts: Vec<Prompt> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let resp = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("#s = :s")
                .expression_attribute_names("#s", "slug")
                .expression_attribute_values(":s", AttributeValue::S(slug.to_string()))
                .set_exclusive_start_key(last_evaluated_key.take())
                .send()
                .await
                .context(format!(
                    "DynamoDB: Failed to scan table '{}' for slug '{}'",
                    self.table_name, slug
                ))
                .map_err(RepoError::BackendError)?;

            for item in resp.items.unwrap_or_default() {
                prompts.push(self.parse_item(&item)?);
            }

            // A filtered page can be empty while later pages still match.
            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }
        Ok(prompts)
    }

    fn parse_item(&self, item: &HashMap<String, AttributeValue>) -> Result<Prompt, RepoError> {
        item_to_prompt(item).ok_or_else(|| {
            let item_id = item.get("id").and_then(|v| v.as_s().ok());
            tracing::error!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Failed to parse item into Prompt");
            RepoError::DataCorruption(format!(
                "Failed to parse item {:?} from table '{}'",
                item_id, self.table_name
            ))
        })
    }
}

#[async_trait]
impl PromptRepository for DynamoDbPromptRepository {
    /// Lists all prompts using DynamoDB Scan. Handles pagination, then orders by recency.
    async fn list_all(&self) -> Result<Vec<Prompt>, RepoError> {
        tracing::debug!("DynamoDB: Scanning table '{}' for all prompts", self.table_name);
        let mut prompts: Vec<Prompt> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let resp = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(last_evaluated_key.take())
                .send()
                .await
                .context(format!("DynamoDB: Failed to scan table '{}'", self.table_name))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                tracing::debug!("DynamoDB Scan (table: {}): Returned {} items", self.table_name, items.len());
                for item in items {
                    // Fail fast if data in the table is corrupt
                    prompts.push(self.parse_item(&item)?);
                }
            }

            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        sort_by_recency(&mut prompts);
        tracing::info!("DynamoDB (table: {}): Successfully listed {} prompts", self.table_name, prompts.len());
        Ok(prompts)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Prompt>, RepoError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_index(RECENCY_INDEX, "feed", FEED_KEY, Some(limit)).await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Prompt>, RepoError> {
        // Empty strings cannot be GSI key values, so nothing is indexed under "".
        if category.is_empty() {
            return Ok(Vec::new());
        }
        self.query_index(CATEGORY_INDEX, "category", category, None).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Prompt>, RepoError> {
        if slug.is_empty() {
            return Ok(None);
        }
        let mut matches = self.query_index(SLUG_INDEX, "slug", slug, Some(1)).await?;
        if let Some(prompt) = matches.pop() {
            return Ok(Some(prompt));
        }
        // Records without created_at never reach slug-index.
        let undated = self.scan_by_slug(slug).await?;
        Ok(newest(undated))
    }

    /// Stores a new prompt using PutItem. The slug check runs before the write
    /// and is not atomic with it.
    async fn create(&self, new_prompt: NewPrompt) -> Result<Prompt, RepoError> {
        if self.find_by_slug(&new_prompt.slug).await?.is_some() {
            return Err(RepoError::DuplicateSlug(new_prompt.slug));
        }

        let prompt = new_prompt.into_prompt(Uuid::new_v4(), Utc::now());
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(prompt_to_item(&prompt)))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to put prompt (id: {}, slug: {})",
                self.table_name, prompt.id, prompt.slug
            ))
            .map_err(RepoError::BackendError)?;

        tracing::info!(prompt_id = %prompt.id, slug = %prompt.slug, table_name = %self.table_name, "DynamoDB: Prompt stored");
        Ok(prompt)
    }
}

/// The most recently created of `prompts`, undated records last.
fn newest(mut prompts: Vec<Prompt>) -> Option<Prompt> {
    sort_by_recency(&mut prompts);
    prompts.into_iter().next()
}

// Helper functions converting between DynamoDB item maps and Prompt.
// Remain internal to this module.
fn prompt_to_item(prompt: &Prompt) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(prompt.id.to_string()));
    item.insert("feed".to_string(), AttributeValue::S(FEED_KEY.to_string()));
    item.insert("slug".to_string(), AttributeValue::S(prompt.slug.clone()));
    item.insert("title".to_string(), AttributeValue::S(prompt.title.clone()));
    item.insert("short_description".to_string(), AttributeValue::S(prompt.short_description.clone()));
    item.insert("prompt_text".to_string(), AttributeValue::S(prompt.prompt_text.clone()));
    // Index key attributes must be absent rather than empty.
    if !prompt.category.is_empty() {
        item.insert("category".to_string(), AttributeValue::S(prompt.category.clone()));
    }
    if let Some(blog_content) = prompt.blog_content.as_ref().filter(|s| !s.is_empty()) {
        item.insert("blog_content".to_string(), AttributeValue::S(blog_content.clone()));
    }
    if let Some(image_url) = prompt.image_url.as_ref().filter(|s| !s.is_empty()) {
        item.insert("image_url".to_string(), AttributeValue::S(image_url.clone()));
    }
    if let Some(created_at) = prompt.created_at {
        item.insert("created_at".to_string(), AttributeValue::N(created_at.timestamp_millis().to_string()));
    }
    item
}

fn item_to_prompt(item: &HashMap<String, AttributeValue>) -> Option<Prompt> {
    let id = item
        .get("id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let slug = item.get("slug")?.as_s().ok()?.to_string();
    let title = item.get("title")?.as_s().ok()?.to_string();
    let text = |key: &str| {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default()
    };
    let optional = |key: &str| {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .filter(|s| !s.is_empty())
            .cloned()
    };
    let created_at = item
        .get("created_at")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    Some(Prompt {
        id,
        slug,
        title,
        short_description: text("short_description"),
        category: text("category"),
        prompt_text: text("prompt_text"),
        blog_content: optional("blog_content"),
        image_url: optional("image_url"),
        created_at,
    })
}

/// Process-local repository. Backs tests and runs without a DynamoDB endpoint.
#[derive(Debug, Default)]
pub struct InMemoryPromptRepository {
    prompts: RwLock<Vec<Prompt>>,
}

impl InMemoryPromptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with existing records, timestamps untouched.
    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts: RwLock::new(prompts),
        }
    }

    async fn ordered(&self) -> Vec<Prompt> {
        let mut prompts = self.prompts.read().await.clone();
        sort_by_recency(&mut prompts);
        prompts
    }
}

#[async_trait]
impl PromptRepository for InMemoryPromptRepository {
    async fn list_all(&self) -> Result<Vec<Prompt>, RepoError> {
        Ok(self.ordered().await)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Prompt>, RepoError> {
        Ok(self
            .ordered()
            .await
            .into_iter()
            .filter(|p| p.created_at.is_some())
            .take(limit)
            .collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Prompt>, RepoError> {
        if category.is_empty() {
            return Ok(Vec::new());
        }
        let mut prompts = self.ordered().await;
        prompts.retain(|p| p.category == category && p.created_at.is_some());
        Ok(prompts)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Prompt>, RepoError> {
        let prompts = self.prompts.read().await;
        Ok(newest(prompts.iter().filter(|p| p.slug == slug).cloned().collect()))
    }

    async fn create(&self, new_prompt: NewPrompt) -> Result<Prompt, RepoError> {
        // Hold the write lock across the check so the slug test is atomic here.
        let mut prompts = self.prompts.write().await;
        if prompts.iter().any(|p| p.slug == new_prompt.slug) {
            return Err(RepoError::DuplicateSlug(new_prompt.slug));
        }
        let prompt = new_prompt.into_prompt(Uuid::new_v4(), Utc::now());
        prompts.push(prompt.clone());
        tracing::debug!(prompt_id = %prompt.id, slug = %prompt.slug, "In-memory: Prompt stored");
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{prompt_at, scenario_abc};

    #[tokio::test]
    async fn test_list_all_is_newest_first() {
        let repo = InMemoryPromptRepository::with_prompts(scenario_abc());
        let slugs: Vec<_> = repo.list_all().await.unwrap().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_list_recent_is_bounded() {
        let prompts = (0..8).map(|i| prompt_at(&format!("p{i}"), "Latest", i)).collect();
        let repo = InMemoryPromptRepository::with_prompts(prompts);
        let recent = repo.list_recent(5).await.unwrap();
        let slugs: Vec<_> = recent.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["p7", "p6", "p5", "p4", "p3"]);
    }

    #[tokio::test]
    async fn test_list_by_category_is_exact_match() {
        let repo = InMemoryPromptRepository::with_prompts(vec![
            prompt_at("one", "Selfie", 1),
            prompt_at("two", "selfie", 2),
            prompt_at("three", "Selfie ", 3),
            prompt_at("four", "Selfie", 4),
        ]);
        let slugs: Vec<_> = repo
            .list_by_category("Selfie")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["four", "one"]);
        assert!(repo.list_by_category("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_slug_prefers_newest_duplicate() {
        let older = prompt_at("dup", "Latest", 1);
        let newer = prompt_at("dup", "Latest", 2);
        let newer_id = newer.id;
        let repo = InMemoryPromptRepository::with_prompts(vec![older, newer]);
        let found = repo.find_by_slug("dup").await.unwrap().unwrap();
        assert_eq!(found.id, newer_id);
        assert!(repo.find_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let repo = InMemoryPromptRepository::new();
        let created = repo
            .create(NewPrompt {
                slug: "fresh".into(),
                title: "Fresh".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(created.created_at.is_some());
        assert_eq!(repo.find_by_slug("fresh").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_lookup_unchanged_by_later_insert_of_same_slug() {
        let repo = InMemoryPromptRepository::with_prompts(vec![prompt_at("x", "Latest", 1)]);
        let before = repo.find_by_slug("x").await.unwrap();

        let err = repo
            .create(NewPrompt {
                slug: "x".into(),
                title: "Another".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateSlug(ref s) if s == "x"));

        assert_eq!(repo.find_by_slug("x").await.unwrap(), before);
    }

    #[test]
    fn test_item_round_trip_omits_empty_index_keys() {
        let mut prompt = prompt_at("no-category", "", 5);
        prompt.image_url = Some("https://img.example.com/a.png".into());
        let item = prompt_to_item(&prompt);
        assert!(!item.contains_key("category"));
        assert!(!item.contains_key("blog_content"));
        assert_eq!(item.get("feed").and_then(|v| v.as_s().ok()).map(String::as_str), Some(FEED_KEY));
        assert_eq!(item_to_prompt(&item), Some(prompt));
    }

    #[test]
    fn test_item_without_created_at_parses() {
        let mut item = prompt_to_item(&prompt_at("legacy", "Festival", 1));
        item.remove("created_at");
        let prompt = item_to_prompt(&item).unwrap();
        assert!(prompt.created_at.is_none());
        assert_eq!(prompt.category, "Festival");
    }

    #[test]
    fn test_undated_item_resolves_after_dated_duplicates() {
        let mut item = prompt_to_item(&prompt_at("legacy", "Festival", 1));
        item.remove("created_at");
        let undated = item_to_prompt(&item).unwrap();
        assert_eq!(newest(vec![undated.clone()]), Some(undated.clone()));

        let dated = prompt_at("legacy", "Festival", 2);
        assert_eq!(newest(vec![undated, dated.clone()]), Some(dated));
        assert_eq!(newest(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_undated_records_resolve_by_slug_but_skip_indexed_lists() {
        let mut legacy = prompt_at("legacy", "Festival", 1);
        legacy.created_at = None;
        let repo = InMemoryPromptRepository::with_prompts(vec![legacy.clone(), prompt_at("dated", "Festival", 2)]);

        assert_eq!(repo.find_by_slug("legacy").await.unwrap(), Some(legacy));
        let slugs = |prompts: Vec<Prompt>| prompts.into_iter().map(|p| p.slug).collect::<Vec<_>>();
        assert_eq!(slugs(repo.list_all().await.unwrap()), vec!["dated", "legacy"]);
        assert_eq!(slugs(repo.list_recent(5).await.unwrap()), vec!["dated"]);
        assert_eq!(slugs(repo.list_by_category("Festival").await.unwrap()), vec!["dated"]);
    }

    #[test]
    fn test_item_with_bad_id_is_rejected() {
        let mut item = prompt_to_item(&prompt_at("broken", "Latest", 1));
        item.insert("id".into(), AttributeValue::S("not-a-uuid".into()));
        assert!(item_to_prompt(&item).is_none());
    }
}
