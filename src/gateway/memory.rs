//! Process-local document store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{sort_documents, Document, GatewayError, RemoteGateway, SortDirection};
use crate::models::{apply_patch, Fields};

/// In-memory [`RemoteGateway`].
///
/// Collections keep insertion order. Marking the gateway unavailable makes
/// every call fail with a transport error, which is how tests exercise the
/// controllers' failure paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    unavailable: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a collection's contents.
    pub fn seed(&self, collection: &str, docs: Vec<Document>) {
        self.lock().insert(collection.to_string(), docs);
    }

    /// Returns a copy of a collection, in storage order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("remote store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn list(
        &self,
        collection: &str,
        sort_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, GatewayError> {
        self.check_available()?;
        let mut docs = self.documents(collection);
        sort_documents(&mut docs, sort_field, direction);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, GatewayError> {
        self.check_available()?;
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, GatewayError> {
        self.check_available()?;
        let id = Uuid::new_v4().simple().to_string();
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), GatewayError> {
        self.check_available()?;
        let mut collections = self.lock();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| GatewayError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        apply_patch(&mut doc.fields, &fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError> {
        self.check_available()?;
        if let Some(docs) = self.lock().get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let gateway = MemoryGateway::new();

        let a = gateway.insert("products", Fields::new()).await.unwrap();
        let b = gateway.insert("products", Fields::new()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(gateway.documents("products").len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let gateway = MemoryGateway::new();
        let id = gateway
            .insert("users", fields(json!({"name": "Ada", "status": "active"})))
            .await
            .unwrap();

        gateway
            .update("users", &id, fields(json!({"status": "inactive"})))
            .await
            .unwrap();

        let doc = gateway.get("users", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["name"], json!("Ada"));
        assert_eq!(doc.fields["status"], json!("inactive"));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let gateway = MemoryGateway::new();

        let result = gateway.update("users", "ghost", Fields::new()).await;

        assert!(matches!(
            result,
            Err(GatewayError::MissingDocument { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let gateway = MemoryGateway::new();
        assert!(gateway.get("orders", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let gateway = MemoryGateway::new();
        gateway.set_unavailable(true);

        assert!(gateway
            .list("orders", "createdAt", SortDirection::Descending)
            .await
            .is_err());
        assert!(gateway.insert("orders", Fields::new()).await.is_err());
        assert!(gateway.delete("orders", "x").await.is_err());

        gateway.set_unavailable(false);
        assert!(gateway.insert("orders", Fields::new()).await.is_ok());
    }
}
