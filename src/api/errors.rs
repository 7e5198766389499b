use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// API-specific error wrapper that converts AppError into HTTP responses.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": err.to_string(),
                    "field": err.field,
                }),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            AppError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": format!("Database error: {}", msg) }),
                )
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": format!("Configuration error: {}", msg) }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::FieldError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let err = AppError::from(FieldError::new("price", "must be greater than or equal to 0"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["field"], "price");
        assert_eq!(body["error"], "price: must be greater than or equal to 0");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Product not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_database_error_maps_to_500() {
        let response = AppError::Database("connection reset".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Database error: connection reset"
        );
    }
}
