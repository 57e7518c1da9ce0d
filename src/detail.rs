//! Prompt detail page.

use std::fmt::Write;

use crate::config::SiteConfig;
use crate::domain::PromptRepository;
use crate::html::{self, PageMeta};
use crate::listing::{render_trending, TRENDING_LIMIT};
use crate::models::Prompt;

#[derive(Debug, Clone)]
pub enum DetailView {
    Found { prompt: Prompt, related: Vec<Prompt> },
    NotFound { slug: String },
}

/// Resolves `slug` and, only when it exists, the related list.
///
/// A failed lookup renders like an unknown slug. A failed related query
/// leaves the related list empty.
pub async fn load(repo: &dyn PromptRepository, slug: &str) -> DetailView {
    let prompt = match repo.find_by_slug(slug).await {
        Ok(Some(prompt)) => prompt,
        Ok(None) => {
            tracing::debug!(%slug, "Prompt not found");
            return DetailView::NotFound { slug: slug.to_string() };
        }
        Err(e) => {
            tracing::warn!(error = %e, %slug, "Failed to look up prompt, rendering not-found state");
            return DetailView::NotFound { slug: slug.to_string() };
        }
    };

    // One extra row covers the current prompt being among the newest.
    let related = match repo.list_recent(TRENDING_LIMIT + 1).await {
        Ok(recent) => related_excluding(recent, &prompt),
        Err(e) => {
            tracing::warn!(error = %e, %slug, "Failed to list related prompts");
            Vec::new()
        }
    };

    DetailView::Found { prompt, related }
}

fn related_excluding(recent: Vec<Prompt>, current: &Prompt) -> Vec<Prompt> {
    recent
        .into_iter()
        .filter(|p| p.id != current.id)
        .take(TRENDING_LIMIT)
        .collect()
}

pub fn render(site: &SiteConfig, view: &DetailView) -> String {
    match view {
        DetailView::NotFound { slug } => {
            let meta = PageMeta {
                title: format!("Prompt not found – {}", site.name),
                description: "This prompt does not exist.".to_string(),
                path: format!("/prompt/{}", html::path_segment(slug)),
                image: None,
            };
            html::layout(site, &meta, r#"<p class="empty">Prompt not found.</p>"#)
        }
        DetailView::Found { prompt, related } => {
            let description = if prompt.short_description.is_empty() {
                format!("AI prompt from {}", site.name)
            } else {
                prompt.short_description.clone()
            };
            let meta = PageMeta {
                title: format!("{} – AI Gemini Prompt", prompt.title),
                description,
                path: format!("/prompt/{}", html::path_segment(&prompt.slug)),
                image: prompt.image_url.clone(),
            };
            html::layout(site, &meta, &render_body(prompt, related))
        }
    }
}

fn render_body(prompt: &Prompt, related: &[Prompt]) -> String {
    let title = html::escape(&prompt.title);
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<article class=\"detail\">\n<div class=\"breadcrumb\"><a href=\"/\">Home</a> &gt; <span>{title}</span></div>\n<h1>{title}</h1>\n<span class=\"category\">{}</span>",
        html::escape(&prompt.category)
    );
    if let Some(src) = &prompt.image_url {
        let _ = writeln!(body, "<img src=\"{}\" alt=\"{title}\">", html::escape(src));
    }
    let _ = writeln!(
        body,
        // The parser drops one newline right after <pre>; this one absorbs it.
        "<pre id=\"prompt-text\">\n{}</pre>",
        html::escape(&prompt.prompt_text)
    );
    if let Some(content) = &prompt.blog_content {
        let _ = writeln!(
            body,
            "<section class=\"blog\">\n<h2>Instructions &amp; Details</h2>\n<div>{}</div>\n</section>",
            html::escape(content)
        );
    }
    body.push_str(COPY_BUTTON);

    body.push_str("<section class=\"related\">\n<h3>Related Articles</h3>\n");
    if related.is_empty() {
        body.push_str("<p class=\"empty\">No related prompts yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for p in related {
            let _ = writeln!(
                body,
                "<li data-slug=\"{}\"><a href=\"/prompt/{}\">{}</a> <span class=\"category\">{}</span></li>",
                html::escape(&p.slug),
                html::path_segment(&p.slug),
                html::escape(&p.title),
                html::escape(&p.category),
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</section>\n</article>\n");

    if !related.is_empty() {
        body.push_str(&render_trending(related));
    }
    body
}

// Copies the <pre> text verbatim. No fallback when the clipboard is denied.
const COPY_BUTTON: &str = r#"<button type="button" id="copy-prompt" onclick="navigator.clipboard.writeText(document.getElementById('prompt-text').textContent).then(function(){alert('Prompt copied to clipboard!')},function(){alert('Could not copy prompt.')})">Copy Prompt</button>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryPromptRepository;
    use crate::test_support::{prompt_at, scenario_abc, site, CountingRepository, UnreachableRepository};

    fn related_slugs(view: &DetailView) -> Vec<String> {
        match view {
            DetailView::Found { related, .. } => related.iter().map(|p| p.slug.clone()).collect(),
            DetailView::NotFound { .. } => panic!("expected a found view"),
        }
    }

    #[tokio::test]
    async fn test_related_excludes_current_prompt() {
        let repo = InMemoryPromptRepository::with_prompts(scenario_abc());
        let view = load(&repo, "b").await;
        assert_eq!(related_slugs(&view), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_related_is_capped_when_current_is_newest() {
        let prompts = (0..8).map(|i| prompt_at(&format!("p{i}"), "Latest", i)).collect();
        let repo = InMemoryPromptRepository::with_prompts(prompts);
        let view = load(&repo, "p7").await;
        assert_eq!(related_slugs(&view), vec!["p6", "p5", "p4", "p3", "p2"]);
    }

    #[tokio::test]
    async fn test_related_is_capped_when_current_is_old() {
        let prompts = (0..8).map(|i| prompt_at(&format!("p{i}"), "Latest", i)).collect();
        let repo = InMemoryPromptRepository::with_prompts(prompts);
        let view = load(&repo, "p0").await;
        assert_eq!(related_slugs(&view), vec!["p7", "p6", "p5", "p4", "p3"]);
    }

    #[tokio::test]
    async fn test_unknown_slug_skips_related_query() {
        let repo = CountingRepository::with_prompts(scenario_abc());
        let view = load(&repo, "missing").await;
        assert!(matches!(view, DetailView::NotFound { ref slug } if slug == "missing"));
        assert_eq!(repo.list_recent_calls(), 0);

        let page = render(&site(), &view);
        assert!(page.contains("Prompt not found."));
        assert!(page.contains("<nav>"));
    }

    #[tokio::test]
    async fn test_lookup_failure_renders_not_found() {
        let view = load(&UnreachableRepository, "a").await;
        assert!(matches!(view, DetailView::NotFound { .. }));
    }

    #[test]
    fn test_leading_newline_survives_pre_parsing() {
        let mut prompt = prompt_at("legacy", "Latest", 1);
        prompt.prompt_text = "\nStarts on line two".into();
        let page = render(&site(), &DetailView::Found { prompt, related: Vec::new() });
        assert!(page.contains("<pre id=\"prompt-text\">\n\nStarts on line two</pre>"));
    }

    #[test]
    fn test_optional_fields_absent() {
        let prompt = prompt_at("plain", "Selfie", 1);
        let page = render(&site(), &DetailView::Found { prompt, related: Vec::new() });
        assert!(!page.contains("<img"));
        assert!(!page.contains("Instructions &amp; Details"));
        assert!(page.contains("No related prompts yet."));
        assert!(page.contains("Copy Prompt"));
    }

    #[test]
    fn test_prompt_text_is_escaped_for_verbatim_copy() {
        let mut prompt = prompt_at("markup", "Selfie", 1);
        prompt.prompt_text = "Use <b>bold</b> & \"quotes\"\nline two".into();
        prompt.blog_content = Some("Long form".into());
        prompt.image_url = Some("https://img.example.com/m.png".into());
        let page = render(&site(), &DetailView::Found { prompt, related: Vec::new() });
        assert!(page.contains(
            "<pre id=\"prompt-text\">\nUse &lt;b&gt;bold&lt;/b&gt; &amp; &quot;quotes&quot;\nline two</pre>"
        ));
        assert!(page.contains("Instructions &amp; Details"));
        assert!(page.contains(r#"<img src="https://img.example.com/m.png""#));
    }
}
