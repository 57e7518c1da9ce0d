//! Static informational pages.

use serde::Deserialize;

use crate::config::SiteConfig;
use crate::html::{self, PageMeta};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn meta(site: &SiteConfig, title: &str, description: &str, path: &str) -> PageMeta {
    PageMeta {
        title: format!("{title} – {}", site.name),
        description: description.to_string(),
        path: path.to_string(),
        image: None,
    }
}

/// Contact page. After a post, `submitted` holds the sender's name; the
/// message itself is not stored anywhere.
pub fn contact(site: &SiteConfig, submitted: Option<&ContactForm>) -> String {
    let mut body = String::from("<h1>Contact Us</h1>\n");
    if let Some(form) = submitted {
        let name = form.name.trim();
        let name = if name.is_empty() { "there" } else { name };
        body.push_str(&html::notice(
            "success",
            &format!("Thanks {name}! Your message has been received."),
        ));
        body.push('\n');
    }
    body.push_str(
        r#"<form method="post" action="/contact">
<label>Name <input name="name" required></label>
<label>Email <input name="email" type="email" required></label>
<label>Message <textarea name="message" required></textarea></label>
<button type="submit">Send</button>
</form>
"#,
    );
    html::layout(site, &meta(site, "Contact Us", "Get in touch with us", "/contact"), &body)
}

pub fn privacy_policy(site: &SiteConfig) -> String {
    let body = format!(
        "<h1>Privacy Policy</h1>\n<p>{} does not require an account to browse prompts. We do not sell personal information.</p>\n<p>Messages sent through the contact form are used only to reply to you.</p>\n",
        html::escape(&site.name)
    );
    html::layout(
        site,
        &meta(site, "Privacy Policy", "How we handle your data", "/privacy-policy"),
        &body,
    )
}

pub fn terms_of_service(site: &SiteConfig) -> String {
    let body = format!(
        "<h1>Terms of Service</h1>\n<p>Prompts on {} are provided as-is for personal and creative use.</p>\n<p>Generated images remain subject to the terms of the AI service you use them with.</p>\n",
        html::escape(&site.name)
    );
    html::layout(
        site,
        &meta(site, "Terms of Service", "Terms for using this site", "/terms-of-service"),
        &body,
    )
}
