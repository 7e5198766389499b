use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::db::store::DocumentStore;
use crate::error::AppError;

/// In-process DocumentStore.
///
/// Collections are plain vectors in insertion order, created on first insert.
/// Identifiers are real ObjectIds so responses look exactly like MongoDB's.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError> {
        let id = ObjectId::new();
        let mut stored = Document::new();
        stored.insert("_id", id);
        stored.extend(document);

        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(stored);

        Ok(id.to_hex())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        // Same convention as MongoDB: 0 means no limit, negative means |limit|.
        let take = match limit.unsigned_abs() {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };

        Ok(self
            .lock()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .take(take)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_latest(&self, collection: &str) -> Result<Option<Document>, AppError> {
        Ok(self
            .lock()?
            .get(collection)
            .and_then(|docs| docs.last().cloned()))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn database_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_generates_object_id() {
        let store = MemoryDocumentStore::new();
        let id = store.insert("product", doc! { "slug": "tee" }).await.unwrap();
        assert_eq!(id.len(), 24);

        let docs = store.find("product", doc! {}, 10).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_object_id("_id").unwrap().to_hex(), id);
        assert_eq!(docs[0].get_str("slug").unwrap(), "tee");
    }

    #[tokio::test]
    async fn test_find_filters_and_limits_in_insertion_order() {
        let store = MemoryDocumentStore::new();
        for (i, slug) in ["a", "b", "a", "a"].iter().enumerate() {
            store
                .insert("product", doc! { "slug": *slug, "n": i as i32 })
                .await
                .unwrap();
        }

        let docs = store.find("product", doc! { "slug": "a" }, 2).await.unwrap();
        let ns: Vec<i32> = docs.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![0, 2]);

        let all = store.find("product", doc! {}, 0).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_find_unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.find("nothing", doc! {}, 5).await.unwrap().is_empty());
        assert!(store.find_latest("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_latest_and_collection_names() {
        let store = MemoryDocumentStore::new();
        store.insert("thought", doc! { "quote": "first" }).await.unwrap();
        store.insert("thought", doc! { "quote": "second" }).await.unwrap();
        store.insert("member", doc! { "name": "Bo" }).await.unwrap();

        let latest = store.find_latest("thought").await.unwrap().unwrap();
        assert_eq!(latest.get_str("quote").unwrap(), "second");

        assert_eq!(
            store.list_collection_names().await.unwrap(),
            vec!["member".to_string(), "thought".to_string()]
        );
    }
}
