//! `sitemap.xml` generation.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::SiteConfig;
use crate::domain::PromptRepository;
use crate::html;
use crate::models::{Prompt, CATEGORIES};

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub path: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Fixed routes followed by one entry per prompt. Prompts without a
/// creation time are stamped with `now`.
pub fn entries(prompts: &[Prompt], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let fixed = |path: String, change_frequency: &'static str, priority: f32| SitemapEntry {
        path,
        last_modified: now,
        change_frequency,
        priority,
    };

    let mut entries = vec![fixed("/".to_string(), "daily", 1.0)];
    entries.extend(
        CATEGORIES
            .iter()
            .map(|c| fixed(format!("/categories/{}", html::path_segment(c)), "weekly", 0.8)),
    );
    for path in ["/contact", "/privacy-policy", "/terms-of-service"] {
        entries.push(fixed(path.to_string(), "monthly", 0.5));
    }
    entries.extend(prompts.iter().map(|p| SitemapEntry {
        path: format!("/prompt/{}", html::path_segment(&p.slug)),
        last_modified: p.created_at.unwrap_or(now),
        change_frequency: "weekly",
        priority: 0.7,
    }));
    entries
}

pub fn to_xml(site: &SiteConfig, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        let _ = writeln!(
            xml,
            "<url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{:.1}</priority></url>",
            html::escape(&site.url(&entry.path)),
            entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.change_frequency,
            entry.priority,
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Builds the sitemap. A failed read still yields the fixed routes.
pub async fn generate(repo: &dyn PromptRepository, site: &SiteConfig) -> String {
    let prompts = repo.list_all().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to list prompts for sitemap, emitting fixed routes only");
        Vec::new()
    });
    to_xml(site, &entries(&prompts, Utc::now()))
}
