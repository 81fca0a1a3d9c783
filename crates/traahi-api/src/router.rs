use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use traahi_types::api::StatusResponse;

use crate::middleware::require_auth;
use crate::{AppState, auth, campaigns, payments, registrations, uploads};

/// Upload bodies carry up to five images.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Full application router: REST API under `/api`, stored uploads under `/uploads`.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/status", get(status))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/campaigns", get(campaigns::list_campaigns))
        .route("/register", post(registrations::register))
        .route("/payment/order", post(payments::create_order));

    let protected_routes = Router::new()
        .route("/upload", post(uploads::upload_cover))
        .route("/upload-gallery", post(uploads::upload_gallery))
        .route("/campaigns", post(campaigns::create_campaign))
        .route("/my-campaigns", get(campaigns::my_campaigns))
        .route(
            "/campaigns/{id}",
            put(campaigns::update_campaign).delete(campaigns::delete_campaign),
        )
        .route("/campaigns/{id}/report", put(campaigns::update_report))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Backend is running".into(),
    })
}
