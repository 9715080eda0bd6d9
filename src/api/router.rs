use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    auth, billing, conversation, dashboard, file, health, integration, member, pages, signup, tag,
};
use crate::domain::services::routes::{DASHBOARD_ROUTES, PUBLIC_ROUTES};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut public = Router::new();
    for path in PUBLIC_ROUTES {
        public = public.route(path, get(pages::public_page));
    }

    let mut dashboard_pages = Router::new();
    for path in DASHBOARD_ROUTES.iter().filter(|p| **p != "/dashboard/oauth/callback") {
        dashboard_pages = dashboard_pages.route(path, get(pages::dashboard_page));
    }
    let dashboard_pages = dashboard_pages
        .route("/dashboard/oauth/callback", get(pages::oauth_callback))
        .route("/dashboard/{*rest}", get(pages::not_found))
        .route_layer(middleware::from_fn_with_state(state.clone(), pages::require_session));

    Router::new()
        .route("/health", get(health::health_check))

        // Session
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/session", get(auth::get_session))
        .route("/api/session/reload", post(auth::reload_session))

        // Signup wizard
        .route("/api/signup", get(signup::get_draft).delete(signup::abandon))
        .route("/api/signup/step", put(signup::save_step))
        .route("/api/signup/complete", post(signup::complete))

        // Dashboard
        .route("/api/dashboard", get(dashboard::overview))

        // Integrations
        .route("/api/integrations", get(integration::list_integrations))
        .route("/api/integrations/{channel}", get(integration::get_integration).delete(integration::disconnect_integration))
        .route("/api/integrations/{channel}/configure", post(integration::configure_integration))

        // Conversations & contacts
        .route("/api/conversations", get(conversation::list_conversations))
        .route("/api/conversations/{id}", get(conversation::get_conversation).patch(conversation::update_contact))
        .route("/api/conversations/{id}/select", post(conversation::select_conversation))
        .route("/api/conversations/{id}/messages", post(conversation::send_message))
        .route("/api/conversations/{id}/pin", put(conversation::set_pinned))
        .route("/api/conversations/{id}/auto-respond", put(conversation::set_auto_respond))
        .route("/api/conversations/{id}/tags", put(conversation::set_contact_tags))

        // Tags (staged)
        .route("/api/tags", get(tag::list_tags).post(tag::stage_create))
        .route("/api/tags/save", post(tag::save_changes))
        .route("/api/tags/reset", post(tag::reset_changes))
        .route("/api/tags/{id}", patch(tag::stage_edit).delete(tag::stage_delete))
        .route("/api/tags/{id}/color", put(tag::stage_recolor))

        // Billing
        .route("/api/billing", get(billing::get_billing))
        .route("/api/billing/payment-complete", post(billing::payment_complete))

        // Knowledge base
        .route("/api/files", get(file::list_files).post(file::upload_file))
        .route("/api/files/{id}", delete(file::delete_file))

        // Team
        .route("/api/team", get(member::list_members))
        .route("/api/team/invitations", post(member::invite_member))
        .route("/api/team/{user_id}", delete(member::delete_member))
        .route("/api/invitations/{token}/accept", post(member::accept))

        .merge(public)
        .merge(dashboard_pages)
        .fallback(pages::not_found)

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        company_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
