//! Document records returned by the store.

use bitflags::bitflags;
use histrail_core::{HistResult, ItemId, StorageError};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Fields requested from a document fetch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DocumentFields: u8 {
        /// Display title
        const TITLE = 0b0000_0001;
        /// Markdown body
        const BODY = 0b0000_0010;
    }
}

/// A (possibly partial) document. Fields that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: ItemId,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Document {
    /// Full document with title and body.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }

    /// Keep only the requested fields.
    pub fn project(mut self, fields: DocumentFields) -> Self {
        if !fields.contains(DocumentFields::TITLE) {
            self.title = None;
        }
        if !fields.contains(DocumentFields::BODY) {
            self.body = None;
        }
        self
    }

    /// Body, or an error when it was not fetched.
    pub fn body(&self) -> HistResult<&str> {
        self.body.as_deref().ok_or_else(|| {
            StorageError::MissingField {
                id: self.id.clone(),
                field: "body".to_string(),
            }
            .into()
        })
    }

    /// Title, or an error when it was not fetched.
    pub fn title(&self) -> HistResult<&str> {
        self.title.as_deref().ok_or_else(|| {
            StorageError::MissingField {
                id: self.id.clone(),
                field: "title".to_string(),
            }
            .into()
        })
    }
}
