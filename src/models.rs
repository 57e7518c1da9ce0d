use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Categories offered in the navigation and the admin form. The store does
/// not constrain `Prompt::category` to this list.
pub const CATEGORIES: [&str; 4] = ["Trending", "Festival", "Selfie", "Latest"];

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub category: String,
    pub prompt_text: String,
    pub blog_content: Option<String>,
    pub image_url: Option<String>,
    /// Assigned by the repository on insert. Legacy records may lack it.
    pub created_at: Option<DateTime<Utc>>,
}

/// Intake payload for a new prompt. Fields are already trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPrompt {
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub category: String,
    pub prompt_text: String,
    pub blog_content: Option<String>,
    pub image_url: Option<String>,
}

impl NewPrompt {
    pub fn into_prompt(self, id: Uuid, created_at: DateTime<Utc>) -> Prompt {
        Prompt {
            id,
            slug: self.slug,
            title: self.title,
            short_description: self.short_description,
            category: self.category,
            prompt_text: self.prompt_text,
            blog_content: self.blog_content,
            image_url: self.image_url,
            created_at: Some(created_at),
        }
    }
}

/// Orders prompts newest first. Records without a timestamp go last.
pub fn sort_by_recency(prompts: &mut [Prompt]) {
    prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn prompt(slug: &str, created_at: Option<DateTime<Utc>>) -> Prompt {
        Prompt {
            id: Uuid::new_v4(),
            slug: slug.into(),
            title: slug.into(),
            short_description: String::new(),
            category: "Trending".into(),
            prompt_text: String::new(),
            blog_content: None,
            image_url: None,
            created_at,
        }
    }

    #[test]
    fn test_sort_by_recency_puts_undated_last() {
        let t1 = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap();
        let mut prompts = vec![prompt("old", Some(t1)), prompt("legacy", None), prompt("new", Some(t2))];
        sort_by_recency(&mut prompts);
        let slugs: Vec<_> = prompts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old", "legacy"]);
    }
}
