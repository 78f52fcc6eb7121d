//! histrail Storage - Document Store Ports
//!
//! The history log lives in an ordinary document of a host store. This crate
//! defines the two capabilities the visit pipeline needs from that host:
//! reading and writing documents, and asking which item is currently active.
//! In-memory implementations back the tests and simple embeddings.

pub mod document;
pub mod mock;

pub use document::{Document, DocumentFields};
pub use mock::{MockDocumentStore, StaticActiveItem};

use async_trait::async_trait;
use histrail_core::{HistResult, ItemId};
use std::sync::Arc;

// ============================================================================
// PORTS
// ============================================================================

/// Async access to the host's documents.
///
/// Implementations return `StorageError::NotFound` for unknown ids. Fetches
/// may return only the requested `fields`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn fetch_document(&self, id: &ItemId, fields: DocumentFields) -> HistResult<Document>;

    /// Replace the body of an existing document.
    async fn write_document_body(&self, id: &ItemId, body: &str) -> HistResult<()>;
}

/// Source of the item the user is currently looking at.
#[async_trait]
pub trait ActiveItemSource: Send + Sync {
    /// The active item, if any.
    async fn active_item(&self) -> HistResult<Option<ItemId>>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn fetch_document(&self, id: &ItemId, fields: DocumentFields) -> HistResult<Document> {
        (**self).fetch_document(id, fields).await
    }

    async fn write_document_body(&self, id: &ItemId, body: &str) -> HistResult<()> {
        (**self).write_document_body(id, body).await
    }
}

#[async_trait]
impl<T: ActiveItemSource + ?Sized> ActiveItemSource for Arc<T> {
    async fn active_item(&self) -> HistResult<Option<ItemId>> {
        (**self).active_item().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_arc_dyn_store_delegates() {
        let mock = MockDocumentStore::new().with_document("a", "A", "x").unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(mock.clone());
        store
            .write_document_body(&ItemId::new("a"), "y")
            .await
            .unwrap();
        let doc = store
            .fetch_document(&ItemId::new("a"), DocumentFields::BODY)
            .await
            .unwrap();
        assert_eq!(doc.body.as_deref(), Some("y"));
        assert_eq!(mock.write_count().unwrap(), 1);
    }
}
