//! Home and category listings: a primary feed plus the trending sidebar.

use std::fmt::Write;

use crate::config::SiteConfig;
use crate::domain::PromptRepository;
use crate::html::{self, PageMeta};
use crate::models::Prompt;

/// Number of prompts in the trending sidebar.
pub const TRENDING_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct ListingView {
    pub feed: Vec<Prompt>,
    /// Newest prompts overall, whatever filter the feed uses.
    pub trending: Vec<Prompt>,
}

/// Home page data. Read failures degrade to an empty listing.
pub async fn load_home(repo: &dyn PromptRepository) -> ListingView {
    let feed = repo.list_all().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to list prompts, rendering empty home page");
        Vec::new()
    });
    // The home feed already is the global recency order.
    let trending = feed.iter().take(TRENDING_LIMIT).cloned().collect();
    ListingView { feed, trending }
}

/// Category page data. Both reads are independent and run concurrently.
pub async fn load_category(repo: &dyn PromptRepository, category: &str) -> ListingView {
    let (feed, trending) = tokio::join!(repo.list_by_category(category), repo.list_recent(TRENDING_LIMIT));
    let feed = feed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, %category, "Failed to list category, rendering empty feed");
        Vec::new()
    });
    let trending = trending.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to list trending prompts");
        Vec::new()
    });
    ListingView { feed, trending }
}

pub fn render_home(site: &SiteConfig, view: &ListingView) -> String {
    let mut body = String::new();
    body.push_str(
        "<header>\n<h1>Trending AI Prompts</h1>\n<p>Explore trending Gemini AI prompts crafted for creativity, fun, and inspiration.</p>\n</header>\n",
    );
    body.push_str(&html::category_links());
    body.push_str(&render_listing(
        view,
        "No prompts yet. Use the admin dashboard to add prompts.",
        "Go to the full details and use the prompt",
    ));

    let meta = PageMeta {
        title: format!("{} – Trending AI Prompts", site.name),
        description: "Discover trending AI prompts (selfie, festival, creative). Copy prompts, browse categories and get inspired.".to_string(),
        path: "/".to_string(),
        image: None,
    };
    html::layout(site, &meta, &body)
}

pub fn render_category(site: &SiteConfig, category: &str, view: &ListingView) -> String {
    let label = html::escape(category);
    let mut body = String::new();
    let _ = write!(
        body,
        "<div class=\"breadcrumb\"><a href=\"/\">Home</a> &gt; <span>{label}</span></div>\n<header>\n<h1>{label} AI Prompts</h1>\n<p>Explore curated {label} prompts crafted for Gemini AI.</p>\n</header>\n"
    );
    body.push_str(&render_listing(
        view,
        &format!("No prompts found in {category} category."),
        "Go to full details",
    ));

    let meta = PageMeta {
        title: format!("{category} AI Prompts – {}", site.name),
        description: format!("Explore {category} AI prompts to boost your creativity."),
        path: format!("/categories/{}", html::path_segment(category)),
        image: None,
    };
    html::layout(site, &meta, &body)
}

fn render_listing(view: &ListingView, empty_message: &str, cta: &str) -> String {
    let mut out = String::new();
    if view.feed.is_empty() {
        let _ = writeln!(out, r#"<p class="empty">{}</p>"#, html::escape(empty_message));
    } else {
        out.push_str("<section class=\"feed\">\n");
        for prompt in &view.feed {
            out.push_str(&render_feed_item(prompt, cta));
        }
        out.push_str("</section>\n");
    }
    if !view.trending.is_empty() {
        out.push_str(&render_trending(&view.trending));
    }
    out
}

fn render_feed_item(prompt: &Prompt, cta: &str) -> String {
    let title = html::escape(&prompt.title);
    let image = prompt
        .image_url
        .as_deref()
        .map(|src| format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">\n", html::escape(src), title))
        .unwrap_or_default();
    let description = if prompt.short_description.is_empty() {
        "Explore this AI prompt and get inspired."
    } else {
        prompt.short_description.as_str()
    };
    format!(
        "<article class=\"prompt\" data-slug=\"{slug_attr}\">\n<h2>{title}</h2>\n{image}<p>{description}</p>\n<a href=\"/prompt/{slug_path}\">{cta}</a>\n</article>\n",
        slug_attr = html::escape(&prompt.slug),
        slug_path = html::path_segment(&prompt.slug),
        description = html::escape(description),
        cta = html::escape(cta),
    )
}

/// Sidebar list of prompts, shared with the detail page.
pub fn render_trending(prompts: &[Prompt]) -> String {
    let mut out = String::from("<aside class=\"trending\">\n<h3>Trending Posts</h3>\n<ul>\n");
    for prompt in prompts {
        let _ = writeln!(
            out,
            "<li data-slug=\"{}\"><a href=\"/prompt/{}\">{}</a> <span class=\"category\">{}</span></li>",
            html::escape(&prompt.slug),
            html::path_segment(&prompt.slug),
            html::escape(&prompt.title),
            html::escape(&prompt.category),
        );
    }
    out.push_str("</ul>\n</aside>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryPromptRepository;
    use crate::test_support::{prompt_at, scenario_abc, site, UnreachableRepository};

    fn slugs(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_home_scenario_feed_and_trending() {
        let repo = InMemoryPromptRepository::with_prompts(scenario_abc());
        let view = load_home(&repo).await;
        assert_eq!(slugs(&view.feed), vec!["c", "b", "a"]);
        assert_eq!(slugs(&view.trending), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_trending_ignores_category_filter() {
        let mut prompts: Vec<Prompt> = (0..6).map(|i| prompt_at(&format!("s{i}"), "Selfie", i)).collect();
        prompts.push(prompt_at("f-old", "Festival", -10));
        prompts.push(prompt_at("f-new", "Festival", 100));
        let repo = InMemoryPromptRepository::with_prompts(prompts);

        let view = load_category(&repo, "Selfie").await;
        assert_eq!(slugs(&view.feed), vec!["s5", "s4", "s3", "s2", "s1", "s0"]);
        assert_eq!(slugs(&view.trending), vec!["f-new", "s5", "s4", "s3", "s2"]);
        assert!(view.feed.iter().all(|p| p.category == "Selfie"));
    }

    #[tokio::test]
    async fn test_category_near_matches_are_excluded() {
        let repo = InMemoryPromptRepository::with_prompts(vec![
            prompt_at("exact", "Festival", 1),
            prompt_at("lower", "festival", 2),
            prompt_at("padded", " Festival", 3),
        ]);
        let view = load_category(&repo, "Festival").await;
        assert_eq!(slugs(&view.feed), vec!["exact"]);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_empty_state() {
        let view = load_category(&UnreachableRepository, "Latest").await;
        assert!(view.feed.is_empty());
        assert!(view.trending.is_empty());

        let page = render_category(&site(), "Latest", &view);
        assert!(page.contains("No prompts found in Latest category."));
        assert!(!page.contains("class=\"feed\""));
    }

    #[test]
    fn test_empty_home_renders_message_not_container() {
        let page = render_home(&site(), &ListingView::default());
        assert!(page.contains("No prompts yet. Use the admin dashboard to add prompts."));
        assert!(!page.contains("class=\"feed\""));
        assert!(!page.contains("Trending Posts"));
    }

    #[test]
    fn test_feed_item_without_image_or_description() {
        let mut prompt = prompt_at("bare", "Latest", 1);
        prompt.short_description.clear();
        let html = render_feed_item(&prompt, "Open");
        assert!(!html.contains("<img"));
        assert!(html.contains("Explore this AI prompt and get inspired."));
        assert!(html.contains(r#"href="/prompt/bare""#));
    }

    #[test]
    fn test_category_heading_is_escaped() {
        let page = render_category(&site(), "<script>", &ListingView::default());
        assert!(page.contains("&lt;script&gt; AI Prompts"));
        assert!(!page.contains("<script>"));
    }
}
