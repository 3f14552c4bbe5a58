use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    ach, actors, auth, content, feedback, frameworks, health, library, settings, sources,
    workspaces,
};
use crate::state::AppState;

/// Build the `/api` router with tracing and the request body limit.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.request_body_limit_bytes;

    let api = Router::new()
        .route("/health", get(health::health))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/validate/{hash}", get(auth::validate))
        // Workspaces
        .route("/workspaces", get(workspaces::list).post(workspaces::create))
        .route(
            "/workspaces/{id}",
            get(workspaces::get)
                .put(workspaces::update)
                .delete(workspaces::delete),
        )
        .route(
            "/workspaces/{id}/members",
            get(workspaces::list_members).post(workspaces::add_member),
        )
        .route(
            "/workspaces/{id}/members/{hash}",
            axum::routing::delete(workspaces::remove_member),
        )
        .route("/workspaces/{id}/activity", get(workspaces::activity))
        .route(
            "/workspaces/{id}/deception-risk",
            get(workspaces::deception_risk),
        )
        // Actors and sources
        .route(
            "/workspaces/{id}/actors",
            get(actors::list).post(actors::create),
        )
        .route(
            "/actors/{id}",
            get(actors::get).put(actors::update).delete(actors::delete),
        )
        .route(
            "/workspaces/{id}/sources",
            get(sources::list).post(sources::create),
        )
        .route(
            "/sources/{id}",
            get(sources::get).put(sources::update).delete(sources::delete),
        )
        // Framework sessions
        .route(
            "/workspaces/{id}/frameworks",
            get(frameworks::list).post(frameworks::create),
        )
        .route(
            "/frameworks/{id}",
            get(frameworks::get)
                .put(frameworks::update)
                .delete(frameworks::delete),
        )
        .route("/frameworks/{id}/status", post(frameworks::transition))
        // ACH
        .route("/workspaces/{id}/ach", get(ach::list).post(ach::create))
        .route("/ach/suggest", post(ach::suggest))
        .route("/ach/templates", get(ach::templates))
        .route(
            "/ach/{id}",
            get(ach::get).put(ach::update).delete(ach::delete),
        )
        .route("/ach/{id}/status", post(ach::transition))
        .route("/ach/{id}/hypotheses", post(ach::add_hypothesis))
        .route(
            "/ach/{id}/hypotheses/{hid}",
            put(ach::update_hypothesis).delete(ach::remove_hypothesis),
        )
        .route("/ach/{id}/evidence", post(ach::add_evidence))
        .route(
            "/ach/{id}/evidence/{eid}",
            put(ach::update_evidence).delete(ach::remove_evidence),
        )
        .route("/ach/{id}/scores", put(ach::set_score))
        .route("/ach/{id}/matrix", get(ach::matrix))
        // Content intelligence
        .route(
            "/workspaces/{id}/content",
            get(content::list).post(content::analyze),
        )
        .route(
            "/content/{id}",
            get(content::get).delete(content::delete),
        )
        .route("/content/{id}/save", post(content::save))
        .route("/content/{id}/adjustments", get(content::list_adjustments))
        .route(
            "/content/{id}/claims/{index}/adjust",
            post(content::adjust_claim),
        )
        // Library, feedback, settings
        .route("/library", get(library::list).post(library::publish))
        .route("/library/{id}", get(library::get))
        .route("/library/{id}/fork", post(library::fork))
        .route("/feedback", get(feedback::list).post(feedback::submit))
        .route("/settings", get(settings::get).put(settings::put));

    Router::new()
        .nest("/api", api)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
