use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::AppError;

/// Document store over named collections.
///
/// This trait allows swapping MongoDB for the in-process store in tests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its generated identifier as a string.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError>;

    /// Return up to `limit` documents matching `filter` exactly, in natural
    /// (insertion) order. An empty filter matches everything.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError>;

    /// Return the most recently inserted document of a collection, if any.
    async fn find_latest(&self, collection: &str) -> Result<Option<Document>, AppError>;

    /// List the collections that currently exist.
    async fn list_collection_names(&self) -> Result<Vec<String>, AppError>;

    /// Check that the store answers at all.
    async fn ping(&self) -> Result<(), AppError>;

    fn database_name(&self) -> &str;
}

/// MongoDB implementation of the DocumentStore.
///
/// Holds a single driver handle for the whole process; the driver pools
/// connections and is safe to share between requests.
pub struct MongoDocumentStore {
    db: mongodb::Database,
}

impl MongoDocumentStore {
    pub fn new(db: mongodb::Database) -> Self {
        Self { db }
    }

    /// Build a client from a connection string.
    ///
    /// Only the connection string is checked here; the driver connects lazily
    /// on first use.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let client = mongodb::Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Invalid connection string: {}", e)))?;
        Ok(Self::new(client.database(database)))
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        })
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().limit(limit).build();

        let mut cursor = self
            .collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut documents = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            documents.push(doc);
        }

        Ok(documents)
    }

    async fn find_latest(&self, collection: &str) -> Result<Option<Document>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOneOptions;

        // ObjectIds start with their creation time, so the highest `_id` is the newest.
        let options = FindOneOptions::builder().sort(doc! { "_id": -1 }).build();

        self.collection(collection)
            .find_one(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        self.db
            .list_collection_names()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    fn database_name(&self) -> &str {
        self.db.name()
    }
}
