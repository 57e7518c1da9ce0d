//! Admin intake: sign-in gating and the new-prompt form.
//!
//! Nothing is kept between requests. Each submission carries the ID token
//! and goes through the full authenticate/authorize cycle again before the
//! store is touched.

use std::fmt::Write;

use serde::Deserialize;

use crate::config::{SignInConfig, SiteConfig};
use crate::domain::PromptRepository;
use crate::errors::AuthError;
use crate::html::{self, PageMeta};
use crate::identity::{AccessPolicy, Capability, Identity, IdentityProvider};
use crate::models::{NewPrompt, Prompt, CATEGORIES};

pub const LOGIN_FAILED: &str = "Login failed, please try again.";
pub const ACCESS_DENIED: &str = "Access Denied. Admin only.";
pub const FIELDS_REQUIRED: &str = "Title and slug required";
pub const UPLOADED: &str = "Prompt uploaded!";

#[derive(Debug, Clone, PartialEq)]
pub enum AdminState {
    Unauthenticated { error: Option<String> },
    Authorized(Identity),
    /// Authenticated but not allowed to publish. Gets no form.
    Denied(Identity),
}

/// A token has been presented and is awaiting verification.
#[derive(Debug)]
pub struct Authenticating<'a> {
    id_token: &'a str,
}

impl<'a> Authenticating<'a> {
    /// `None` when there is no token to verify.
    pub fn begin(id_token: &'a str) -> Option<Self> {
        let id_token = id_token.trim();
        (!id_token.is_empty()).then_some(Self { id_token })
    }

    /// Verifies the token and applies the policy.
    ///
    /// A rejected token returns to `Unauthenticated`; only transport failures
    /// of the provider surface as errors.
    pub async fn finish(
        self,
        provider: &dyn IdentityProvider,
        policy: &dyn AccessPolicy,
    ) -> Result<AdminState, AuthError> {
        match provider.verify(self.id_token).await {
            Ok(identity) if policy.allows(&identity, Capability::PublishPrompts) => {
                tracing::info!(uid = %identity.uid, "Admin authorized");
                Ok(AdminState::Authorized(identity))
            }
            Ok(identity) => {
                tracing::warn!(uid = %identity.uid, "Identity lacks publish capability, signing out");
                Ok(AdminState::Denied(identity))
            }
            Err(AuthError::InvalidToken(reason)) => {
                tracing::warn!(%reason, "Admin sign-in rejected");
                Ok(AdminState::Unauthenticated {
                    error: Some(LOGIN_FAILED.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }
}

pub async fn authenticate(
    provider: &dyn IdentityProvider,
    policy: &dyn AccessPolicy,
    id_token: &str,
) -> Result<AdminState, AuthError> {
    match Authenticating::begin(id_token) {
        Some(pending) => pending.finish(provider, policy).await,
        None => Ok(AdminState::Unauthenticated { error: None }),
    }
}

/// Raw intake form fields as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub id_token: String,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub category: String,
    pub prompt_text: String,
    pub blog_content: String,
    pub image_url: String,
}

impl IntakeForm {
    /// Trims every field. Only title and slug are required.
    pub fn to_new_prompt(&self) -> Option<NewPrompt> {
        let title = self.title.trim();
        let slug = self.slug.trim();
        if title.is_empty() || slug.is_empty() {
            return None;
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Some(NewPrompt {
            slug: slug.to_string(),
            title: title.to_string(),
            short_description: self.short_description.trim().to_string(),
            category: self.category.trim().to_string(),
            prompt_text: self.prompt_text.trim().to_string(),
            blog_content: optional(&self.blog_content),
            image_url: optional(&self.image_url),
        })
    }

    /// The fields worth carrying through a sign-in round trip.
    fn carried_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("title", &self.title),
            ("slug", &self.slug),
            ("short_description", &self.short_description),
            ("category", &self.category),
            ("prompt_text", &self.prompt_text),
            ("blog_content", &self.blog_content),
            ("image_url", &self.image_url),
        ]
    }

    /// A blank form that keeps the caller signed in.
    pub fn cleared(&self) -> Self {
        Self {
            id_token: self.id_token.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created(Prompt),
    /// Missing required fields. Nothing was written.
    Invalid,
    /// The store rejected the insert. Carries the raw error text.
    Failed(String),
}

pub async fn submit(repo: &dyn PromptRepository, form: &IntakeForm) -> SubmitOutcome {
    let Some(new_prompt) = form.to_new_prompt() else {
        return SubmitOutcome::Invalid;
    };
    match repo.create(new_prompt).await {
        Ok(prompt) => {
            tracing::info!(prompt_id = %prompt.id, slug = %prompt.slug, "Prompt created via admin form");
            SubmitOutcome::Created(prompt)
        }
        Err(e) => {
            tracing::error!(error = ?e, "Admin insert failed");
            SubmitOutcome::Failed(e.to_string())
        }
    }
}

fn admin_meta(site: &SiteConfig) -> PageMeta {
    PageMeta {
        title: format!("Admin – {}", site.name),
        description: "Admin dashboard".to_string(),
        path: "/admin".to_string(),
        image: None,
    }
}

/// Sign-in page. The popup fills `id_token` and posts it to `/admin/session`.
///
/// `carried` holds intake fields from a submission whose token was rejected;
/// they ride along as hidden inputs so the dashboard comes back filled in.
pub fn render_sign_in(
    site: &SiteConfig,
    sign_in: &SignInConfig,
    error: Option<&str>,
    carried: Option<&IntakeForm>,
) -> String {
    let mut body = String::from("<section class=\"admin\">\n");
    if let Some(error) = error {
        body.push_str(&html::notice("error", error));
        body.push('\n');
    }
    body.push_str(&auth_form_open(sign_in, "/admin/session"));
    body.push_str("<input type=\"hidden\" id=\"id_token\" name=\"id_token\" value=\"\">\n");
    for (name, value) in carried.map(IntakeForm::carried_fields).into_iter().flatten() {
        if !value.trim().is_empty() {
            let _ = writeln!(
                body,
                "<input type=\"hidden\" name=\"{name}\" value=\"{}\">",
                html::escape(value)
            );
        }
    }
    body.push_str(
        "<button type=\"button\" id=\"google-sign-in\">Login with Google</button>\n</form>\n<p>Only admin can upload prompts.</p>\n</section>\n",
    );
    body.push_str(&firebase_module(SIGN_IN_SCRIPT));
    html::layout(site, &admin_meta(site), &body)
}

pub fn render_denied(site: &SiteConfig) -> String {
    let body = format!(
        "<section class=\"admin\">\n<p class=\"denied\">{}</p>\n<p><a href=\"/admin\">Sign in with another account</a></p>\n</section>\n",
        html::escape(ACCESS_DENIED)
    );
    html::layout(site, &admin_meta(site), &body)
}

/// Dashboard with the intake form. `notice` is `(css class, message)`.
pub fn render_dashboard(
    site: &SiteConfig,
    sign_in: &SignInConfig,
    identity: &Identity,
    form: &IntakeForm,
    notice: Option<(&str, &str)>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<section class=\"admin\">\n<header>\n<h1>Admin Dashboard</h1>\n<span class=\"who\">{}</span> <button type=\"button\" id=\"logout\">Logout</button>\n</header>",
        html::escape(identity.label())
    );
    if let Some((kind, message)) = notice {
        body.push_str(&html::notice(kind, message));
        body.push('\n');
    }

    body.push_str(&auth_form_open(sign_in, "/admin/prompts"));
    let _ = writeln!(
        body,
        "<input type=\"hidden\" id=\"id_token\" name=\"id_token\" value=\"{}\">",
        html::escape(&form.id_token)
    );
    body.push_str(&input("title", "Title", &form.title));
    body.push_str(&input("slug", "Slug (unique)", &form.slug));
    body.push_str(&input("short_description", "Short Description", &form.short_description));
    body.push_str(&category_select(&form.category));
    body.push_str(&textarea("prompt_text", "Prompt Text", &form.prompt_text));
    body.push_str(&textarea(
        "blog_content",
        "Blog Content (long form helpful for SEO)",
        &form.blog_content,
    ));
    body.push_str(&input("image_url", "Image URL", &form.image_url));
    body.push_str("<button type=\"submit\">Upload Prompt</button>\n</form>\n</section>\n");
    body.push_str(&firebase_module(DASHBOARD_SCRIPT));

    html::layout(site, &admin_meta(site), &body)
}

// The browser reads the Firebase web config back from these data attributes.
fn auth_form_open(sign_in: &SignInConfig, action: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\" id=\"admin-auth\" data-api-key=\"{}\" data-auth-domain=\"{}\">\n",
        html::escape(&sign_in.api_key),
        html::escape(&sign_in.auth_domain)
    )
}

fn firebase_module(script: &str) -> String {
    format!("<script type=\"module\">\n{FIREBASE_PRELUDE}{script}</script>\n")
}

const FIREBASE_PRELUDE: &str = r#"import { initializeApp } from "https://www.gstatic.com/firebasejs/10.12.2/firebase-app.js";
import { getAuth, GoogleAuthProvider, signInWithPopup, signOut } from "https://www.gstatic.com/firebasejs/10.12.2/firebase-auth.js";
const form = document.getElementById("admin-auth");
const auth = getAuth(initializeApp({ apiKey: form.dataset.apiKey, authDomain: form.dataset.authDomain }));
"#;

const SIGN_IN_SCRIPT: &str = r#"document.getElementById("google-sign-in").addEventListener("click", async () => {
  try {
    const result = await signInWithPopup(auth, new GoogleAuthProvider());
    form.elements["id_token"].value = await result.user.getIdToken();
    form.submit();
  } catch (e) {
    alert("Login failed, please try again.");
  }
});
"#;

// Swaps in a fresh token before every upload; the one rendered into the
// page expires after an hour.
const DASHBOARD_SCRIPT: &str = r#"form.addEventListener("submit", async (event) => {
  event.preventDefault();
  await auth.authStateReady();
  if (auth.currentUser) {
    form.elements["id_token"].value = await auth.currentUser.getIdToken();
  }
  form.submit();
});
document.getElementById("logout").addEventListener("click", async () => {
  await signOut(auth);
  window.location.href = "/admin";
});
"#;

fn input(name: &str, placeholder: &str, value: &str) -> String {
    format!(
        "<input name=\"{name}\" placeholder=\"{}\" value=\"{}\">\n",
        html::escape(placeholder),
        html::escape(value)
    )
}

fn textarea(name: &str, placeholder: &str, value: &str) -> String {
    format!(
        "<textarea name=\"{name}\" placeholder=\"{}\">{}</textarea>\n",
        html::escape(placeholder),
        html::escape(value)
    )
}

fn category_select(selected: &str) -> String {
    let mut out = String::from("<select name=\"category\">\n<option value=\"\">Select Category</option>\n");
    for category in CATEGORIES {
        let marker = if category == selected { " selected" } else { "" };
        let _ = writeln!(out, "<option value=\"{category}\"{marker}>{category}</option>");
    }
    out.push_str("</select>\n");
    out
}
