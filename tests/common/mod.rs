use std::sync::Arc;

use axum::Router;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use observatory::config::AppConfig;
use observatory::db::memory::MemoryDocumentStore;
use observatory::db::store::{DocumentStore, MongoDocumentStore};
use observatory::router::build_router;
use observatory::state::AppState;

/// Holds a running MongoDB container and the Axum router wired to it.
///
/// The container is kept alive for as long as this struct lives. When
/// dropped, it is stopped and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub store: Arc<dyn DocumentStore>,
}

impl TestEnv {
    /// Spin up MongoDB and build the full router against it.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);

        let store = MongoDocumentStore::connect(&mongo_uri, "observatory_test")
            .await
            .expect("Failed to connect to MongoDB");
        let store: Arc<dyn DocumentStore> = Arc::new(store);

        let config = test_config(Some(mongo_uri));
        let router = build_router(AppState::new(store.clone(), config));

        Self {
            _mongo: mongo_container,
            router,
            store,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}

pub fn test_config(database_url: Option<String>) -> AppConfig {
    AppConfig {
        database_url,
        database_name: Some("observatory_test".to_string()),
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

/// Build a `TestServer` backed by the in-process store (no container needed).
pub fn memory_server() -> axum_test::TestServer {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let router = build_router(AppState::new(store, test_config(None)));

    axum_test::TestServer::builder()
        .build(router)
}

/// Helper: create a record and return its id.
pub async fn create(server: &axum_test::TestServer, path: &str, body: serde_json::Value) -> String {
    let response = server.post(path).json(&body).await;
    response.assert_status_ok();
    let created: serde_json::Value = response.json();
    created["id"]
        .as_str()
        .expect("create response should carry an id")
        .to_string()
}
