//! File-backed document store.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a JSON array of
//! documents. Writes go to a temp file that is renamed over the original, so
//! a crashed write never leaves a half-written collection behind.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{sort_documents, Document, GatewayError, RemoteGateway, SortDirection};
use crate::models::{apply_patch, Fields};

#[derive(Debug)]
pub struct FileGateway {
    data_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileGateway {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Rejects collection names that could escape the data directory.
    fn collection_path(&self, collection: &str) -> Result<PathBuf, GatewayError> {
        if collection.is_empty()
            || collection.contains('/')
            || collection.contains('\\')
            || collection.contains("..")
            || collection.starts_with('.')
        {
            return Err(GatewayError::Transport(format!(
                "invalid collection name: {}",
                collection
            )));
        }
        Ok(self.data_dir.join(format!("{}.json", collection)))
    }

    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, GatewayError> {
        let path = self.collection_path(collection)?;

        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| GatewayError::Corrupt(path, e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(GatewayError::Io(path, e.to_string())),
        }
    }

    async fn write_collection(
        &self,
        collection: &str,
        docs: &[Document],
    ) -> Result<(), GatewayError> {
        let path = self.collection_path(collection)?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| GatewayError::Io(self.data_dir.clone(), e.to_string()))?;

        let bytes = serde_json::to_vec_pretty(docs)
            .map_err(|e| GatewayError::Corrupt(path.clone(), e.to_string()))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &bytes)
            .await
            .map_err(|e| GatewayError::Io(temp_path.clone(), e.to_string()))?;

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| GatewayError::Io(path.clone(), e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for FileGateway {
    async fn list(
        &self,
        collection: &str,
        sort_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, GatewayError> {
        let mut docs = self.read_collection(collection).await?;
        sort_documents(&mut docs, sort_field, direction);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, GatewayError> {
        let docs = self.read_collection(collection).await?;
        Ok(docs.into_iter().find(|d| d.id == id))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, GatewayError> {
        let _guard = self.write_lock.lock().await;

        let mut docs = self.read_collection(collection).await?;
        let id = Uuid::new_v4().simple().to_string();
        docs.push(Document::new(id.clone(), fields));
        self.write_collection(collection, &docs).await?;

        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;

        let mut docs = self.read_collection(collection).await?;
        let doc = docs.iter_mut().find(|d| d.id == id).ok_or_else(|| {
            GatewayError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            }
        })?;
        apply_patch(&mut doc.fields, &fields);
        self.write_collection(collection, &docs).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;

        let mut docs = self.read_collection(collection).await?;
        docs.retain(|d| d.id != id);
        self.write_collection(collection, &docs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (FileGateway, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path().join("data"));
        (gateway, temp_dir)
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_missing_collection_lists_empty() {
        let (gateway, _temp) = setup();

        let docs = gateway
            .list("products", "createdAt", SortDirection::Descending)
            .await
            .unwrap();

        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_insert_persists_across_instances() {
        let (gateway, temp) = setup();

        let id = gateway
            .insert("products", fields(json!({"category": "flower"})))
            .await
            .unwrap();

        let reopened = FileGateway::new(temp.path().join("data"));
        let doc = reopened.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["category"], json!("flower"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (gateway, _temp) = setup();
        let id = gateway
            .insert("users", fields(json!({"status": "active"})))
            .await
            .unwrap();

        gateway
            .update("users", &id, fields(json!({"status": "inactive"})))
            .await
            .unwrap();
        let doc = gateway.get("users", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["status"], json!("inactive"));

        gateway.delete("users", &id).await.unwrap();
        assert!(gateway.get("users", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let (gateway, _temp) = setup();
        gateway.insert("orders", Fields::new()).await.unwrap();

        assert!(gateway.data_dir().join("orders.json").exists());
        assert!(!gateway.data_dir().join("orders.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (gateway, _temp) = setup();
        std::fs::create_dir_all(gateway.data_dir()).unwrap();
        std::fs::write(gateway.data_dir().join("orders.json"), "{not json").unwrap();

        let result = gateway
            .list("orders", "createdAt", SortDirection::Descending)
            .await;

        assert!(matches!(result, Err(GatewayError::Corrupt(_, _))));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (gateway, _temp) = setup();

        assert!(gateway.get("../etc", "x").await.is_err());
        assert!(gateway.insert("a/b", Fields::new()).await.is_err());
    }
}
