use crate::{
    admin::{self, AdminState, IntakeForm, SubmitOutcome},
    detail::{self, DetailView},
    errors::AppError,
    identity::Identity,
    listing,
    pages::{self, ContactForm},
    sitemap, AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tracing;

pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = listing::load_home(state.prompt_repo.as_ref()).await;
    tracing::debug!(feed = view.feed.len(), "Rendering home page");
    Html(listing::render_home(&state.site, &view))
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Html<String> {
    let view = listing::load_category(state.prompt_repo.as_ref(), &category).await;
    tracing::debug!(%category, feed = view.feed.len(), "Rendering category page");
    Html(listing::render_category(&state.site, &category, &view))
}

pub async fn prompt_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let view = detail::load(state.prompt_repo.as_ref(), &slug).await;
    let status = match view {
        DetailView::Found { .. } => StatusCode::OK,
        DetailView::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    (status, Html(detail::render(&state.site, &view))).into_response()
}

/// GET /admin always starts signed out.
pub async fn admin_sign_in(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(admin::render_sign_in(&state.site, &state.sign_in, None, None))
}

/// POST /admin/session exchanges an ID token for the dashboard. Intake
/// fields carried over from a rejected submission are filled back in.
pub async fn admin_session(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IntakeForm>,
) -> Result<Response, AppError> {
    let admin_state = admin::authenticate(state.identity.as_ref(), state.policy.as_ref(), &form.id_token).await?;
    let identity = match require_publisher(&state, admin_state, &form) {
        Ok(identity) => identity,
        Err(response) => return Ok(response),
    };
    let form = IntakeForm {
        id_token: form.id_token.trim().to_string(),
        ..form
    };
    Ok(Html(admin::render_dashboard(&state.site, &state.sign_in, &identity, &form, None)).into_response())
}

/// POST /admin/prompts re-checks the caller, then inserts one prompt.
pub async fn admin_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IntakeForm>,
) -> Result<Response, AppError> {
    let admin_state = admin::authenticate(state.identity.as_ref(), state.policy.as_ref(), &form.id_token).await?;
    let identity = match require_publisher(&state, admin_state, &form) {
        Ok(identity) => identity,
        Err(response) => return Ok(response),
    };

    let dashboard = |form: &IntakeForm, notice: (&str, &str)| {
        admin::render_dashboard(&state.site, &state.sign_in, &identity, form, Some(notice))
    };
    let response = match admin::submit(state.prompt_repo.as_ref(), &form).await {
        SubmitOutcome::Created(prompt) => {
            tracing::info!(prompt_id = %prompt.id, uid = %identity.uid, "Prompt uploaded");
            let page = dashboard(&form.cleared(), ("success", admin::UPLOADED));
            (StatusCode::CREATED, Html(page)).into_response()
        }
        SubmitOutcome::Invalid => {
            let page = dashboard(&form, ("error", admin::FIELDS_REQUIRED));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
        }
        SubmitOutcome::Failed(message) => {
            let notice = format!("Upload failed: {}", message);
            let page = dashboard(&form, ("error", notice.as_str()));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
    };
    Ok(response)
}

// Denied and signed-out callers get their page instead of the dashboard.
// A signed-out caller keeps the fields they had entered.
fn require_publisher(state: &AppState, admin_state: AdminState, form: &IntakeForm) -> Result<Identity, Response> {
    match admin_state {
        AdminState::Authorized(identity) => Ok(identity),
        AdminState::Denied(_) => Err((StatusCode::FORBIDDEN, Html(admin::render_denied(&state.site))).into_response()),
        AdminState::Unauthenticated { error } => Err((
            StatusCode::UNAUTHORIZED,
            Html(admin::render_sign_in(&state.site, &state.sign_in, error.as_deref(), Some(form))),
        )
            .into_response()),
    }
}

pub async fn contact(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::contact(&state.site, None))
}

pub async fn contact_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ContactForm>,
) -> Html<String> {
    tracing::info!(email = %form.email, "Contact message received");
    Html(pages::contact(&state.site, Some(&form)))
}

pub async fn privacy_policy(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::privacy_policy(&state.site))
}

pub async fn terms_of_service(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::terms_of_service(&state.site))
}

pub async fn sitemap_xml(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let xml = sitemap::generate(state.prompt_repo.as_ref(), &state.site).await;
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}
