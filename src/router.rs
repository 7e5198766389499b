use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{health, products, records};
use crate::models::kinds::KINDS;
use crate::state::AppState;

/// Build the full API router around an already constructed state.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(health::root_handler))
        .route("/test", get(health::diagnostics_handler))
        .route("/api/products/{slug}", get(products::get_product_handler));

    KINDS
        .iter()
        .fold(router, |router, kind| records::register(router, *kind))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}
