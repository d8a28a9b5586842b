pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemStore;
pub use postgres::PgStore;

/// A stored record: a JSON object whose `id` field holds its collection key.
pub type Document = Map<String, Value>;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Uniform wrapper over the document store: find-all, find-by-id, insert,
/// merge-update and delete, each a single-document operation. Consistency of
/// concurrent writes to the same record is delegated to the backend's
/// single-document atomicity; there are no multi-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid)
        -> Result<Option<Document>, StoreError>;

    /// Assigns a fresh id, persists the document and returns the stored form.
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// Merges the given fields into an existing document. Returns the
    /// post-update document, or `None` when the id is unknown.
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns `false` when the id was already absent.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    /// Pings the backend to ensure connectivity.
    async fn health_check(&self) -> Result<(), StoreError>;
}
