use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{post, MethodRouter};
use axum::{Json, Router};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::store::DocumentStore;
use crate::error::AppError;
use crate::models::kinds::{KindDescriptor, Listing};
use crate::models::public::to_public;
use crate::models::validation::FieldError;
use crate::state::AppState;

/// Response from a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Core create logic — separated from the HTTP layer for testability.
///
/// Validates the body against the kind's record shape and inserts it into the
/// kind's collection.
pub async fn process_create(
    store: &dyn DocumentStore,
    kind: &KindDescriptor,
    body: Value,
) -> Result<CreatedResponse, AppError> {
    let document = kind.validate(body)?;
    let id = store.insert(kind.collection, document).await?;
    tracing::debug!(kind = kind.name, %id, "record created");
    Ok(CreatedResponse { id })
}

/// Resolve the requested page size against a kind's default.
pub fn resolve_limit(requested: Option<i64>, default_limit: i64) -> Result<i64, FieldError> {
    match requested {
        None => Ok(default_limit),
        Some(n) if n < 0 => Err(FieldError::new(
            "limit",
            "must be greater than or equal to 0",
        )),
        Some(n) => Ok(n),
    }
}

/// Core list logic: up to `limit` records in natural order, public shape.
pub async fn process_list(
    store: &dyn DocumentStore,
    kind: &KindDescriptor,
    limit: i64,
) -> Result<Vec<Value>, AppError> {
    // The store treats 0 as "no limit"; here it means an empty page.
    if limit == 0 {
        return Ok(Vec::new());
    }

    let documents = store.find(kind.collection, Document::new(), limit).await?;
    Ok(documents.into_iter().map(to_public).collect())
}

/// Core logic for single-record kinds: the newest record, if any.
pub async fn process_latest(
    store: &dyn DocumentStore,
    kind: &KindDescriptor,
) -> Result<Option<Value>, AppError> {
    Ok(store.find_latest(kind.collection).await?.map(to_public))
}

fn body_or_error(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn params_or_error(params: Result<Query<ListParams>, QueryRejection>) -> Result<ListParams, AppError> {
    params.map(|Query(params)| params).map_err(|_| {
        AppError::Validation(FieldError::new("limit", "expected an integer"))
    })
}

/// Register the routes of one kind on `router`.
///
/// Every kind gets `POST {path}`; `GET {path}` depends on its [`Listing`].
pub fn register(router: Router<AppState>, kind: &'static KindDescriptor) -> Router<AppState> {
    let mut routes: MethodRouter<AppState> = post(
        move |State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>| async move {
            let body = body_or_error(body)?;
            process_create(state.store.as_ref(), kind, body)
                .await
                .map(Json)
        },
    );

    match kind.listing {
        Listing::None => {}
        Listing::Page { default_limit } => {
            routes = routes.get(
                move |State(state): State<AppState>,
                      params: Result<Query<ListParams>, QueryRejection>| async move {
                    let params = params_or_error(params)?;
                    let limit = resolve_limit(params.limit, default_limit)?;
                    process_list(state.store.as_ref(), kind, limit)
                        .await
                        .map(Json)
                },
            );
        }
        Listing::Latest => {
            routes = routes.get(move |State(state): State<AppState>| async move {
                process_latest(state.store.as_ref(), kind)
                    .await
                    .map(Json)
            });
        }
    }

    router.route(kind.path, routes)
}
