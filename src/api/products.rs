use axum::extract::{Path, State};
use axum::Json;
use mongodb::bson::doc;
use serde_json::Value;

use crate::db::store::DocumentStore;
use crate::error::AppError;
use crate::models::kinds::PRODUCT;
use crate::models::public::to_public;
use crate::state::AppState;

/// Core logic to look a product up by slug.
///
/// Slugs are not unique; the first match in natural order wins.
pub async fn process_get_product(
    store: &dyn DocumentStore,
    slug: &str,
) -> Result<Value, AppError> {
    let mut matches = store
        .find(PRODUCT.collection, doc! { "slug": slug }, 1)
        .await?;

    if matches.is_empty() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    Ok(to_public(matches.swap_remove(0)))
}

/// Axum handler for `GET /api/products/{slug}`.
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let product = process_get_product(state.store.as_ref(), &slug).await?;
    Ok(Json(product))
}
