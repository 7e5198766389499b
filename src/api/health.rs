use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::store::DocumentStore;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "The Chess Club — The Observatory API";

/// Maximum number of collection names reported by the diagnostics endpoint.
pub const MAX_REPORTED_COLLECTIONS: usize = 10;
const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub status: String,
}

/// Store connectivity report returned by `GET /test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn set_or_not(value: &Option<String>) -> String {
    let status = if value.is_some() { "✅ Set" } else { "❌ Not Set" };
    status.to_string()
}

/// Probe the store through the handle built at startup.
///
/// Failures are folded into the report, never returned.
pub async fn process_diagnostics(store: &dyn DocumentStore, config: &AppConfig) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: set_or_not(&config.database_url),
        database_name: set_or_not(&config.database_name),
        connection_status: "Connected".to_string(),
        collections: Vec::new(),
    };

    match store.list_collection_names().await {
        Ok(mut names) => {
            names.truncate(MAX_REPORTED_COLLECTIONS);
            report.collections = names;
            report.database = "✅ Connected & Working".to_string();
        }
        Err(e) => {
            tracing::warn!(database = store.database_name(), "Diagnostics could not reach the store: {e}");
            let detail: String = e.to_string().chars().take(MAX_ERROR_CHARS).collect();
            report.database = format!("⚠️  Connected but Error: {}", detail);
        }
    }

    report
}

/// Axum handler for `GET /`.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        name: SERVICE_NAME.to_string(),
        status: "ok".to_string(),
    })
}

/// Axum handler for `GET /test`.
pub async fn diagnostics_handler(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(process_diagnostics(state.store.as_ref(), &state.config).await)
}
