//! In-memory store and active item source for tests and embedding.

use crate::{ActiveItemSource, Document, DocumentFields, DocumentStore};
use async_trait::async_trait;
use histrail_core::{HistResult, ItemId, StorageError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory document store.
///
/// Besides plain storage it can simulate unreachable documents
/// (`fail_fetch`), rejected writes (`fail_write`), and counts fetches per id
/// so callers can check how often a document was read.
#[derive(Debug, Default, Clone)]
pub struct MockDocumentStore {
    documents: Arc<RwLock<HashMap<ItemId, Document>>>,
    failing: Arc<RwLock<HashSet<ItemId>>>,
    read_only: Arc<RwLock<HashSet<ItemId>>>,
    fetches: Arc<RwLock<HashMap<ItemId, usize>>>,
    writes: Arc<RwLock<usize>>,
}

impl MockDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub fn insert(&self, doc: Document) -> HistResult<()> {
        self.documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Builder-style insert.
    pub fn with_document(
        self,
        id: impl Into<ItemId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> HistResult<Self> {
        self.insert(Document::new(id, title, body))?;
        Ok(self)
    }

    /// Make every fetch of `id` fail as if the document did not exist.
    pub fn fail_fetch(&self, id: impl Into<ItemId>) -> HistResult<()> {
        self.failing
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(id.into());
        Ok(())
    }

    /// Make every body write to `id` fail.
    pub fn fail_write(&self, id: impl Into<ItemId>) -> HistResult<()> {
        self.read_only
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(id.into());
        Ok(())
    }

    /// Current body of `id`.
    pub fn body_of(&self, id: &ItemId) -> HistResult<Option<String>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(documents.get(id).and_then(|doc| doc.body.clone()))
    }

    /// Number of fetches of `id` so far.
    pub fn fetch_count(&self, id: &ItemId) -> HistResult<usize> {
        let fetches = self
            .fetches
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(fetches.get(id).copied().unwrap_or(0))
    }

    /// Number of body writes so far.
    pub fn write_count(&self) -> HistResult<usize> {
        Ok(*self.writes.read().map_err(|_| StorageError::LockPoisoned)?)
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn fetch_document(&self, id: &ItemId, fields: DocumentFields) -> HistResult<Document> {
        *self
            .fetches
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .entry(id.clone())
            .or_insert(0) += 1;

        let failing = self
            .failing
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .contains(id);
        if failing {
            return Err(StorageError::NotFound { id: id.clone() }.into());
        }

        let documents = self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        documents
            .get(id)
            .cloned()
            .map(|doc| doc.project(fields))
            .ok_or_else(|| StorageError::NotFound { id: id.clone() }.into())
    }

    async fn write_document_body(&self, id: &ItemId, body: &str) -> HistResult<()> {
        let read_only = self
            .read_only
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .contains(id);
        if read_only {
            return Err(StorageError::WriteFailed {
                id: id.clone(),
                reason: "document is read-only".to_string(),
            }
            .into());
        }

        let mut documents = self
            .documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let doc = documents
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound { id: id.clone() })?;
        doc.body = Some(body.to_string());
        drop(documents);

        *self.writes.write().map_err(|_| StorageError::LockPoisoned)? += 1;
        tracing::debug!(document = %id, bytes = body.len(), "document body written");
        Ok(())
    }
}

/// Active item source holding a settable item.
#[derive(Debug, Default, Clone)]
pub struct StaticActiveItem {
    current: Arc<RwLock<Option<ItemId>>>,
}

impl StaticActiveItem {
    /// Source with no active item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the active item.
    pub fn set(&self, item: Option<ItemId>) -> HistResult<()> {
        *self.current.write().map_err(|_| StorageError::LockPoisoned)? = item;
        Ok(())
    }
}

#[async_trait]
impl ActiveItemSource for StaticActiveItem {
    async fn active_item(&self) -> HistResult<Option<ItemId>> {
        Ok(self
            .current
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }
}
