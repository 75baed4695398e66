//! In-memory, append-only fragment store.
//!
//! Holds every registered [`Document`] and every [`Fragment`] produced from
//! them, in insertion order. Documents are unique by name; a batch for a
//! name that is already present is rejected as a whole.
//!
//! The store is cheap to clone: both collections sit behind `Arc`, and an
//! append only copies them when an older snapshot still holds a reference.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{Document, Fragment};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document \"{0}\" has already been added.")]
    DuplicateDocument(String),
}

#[derive(Debug, Clone, Default)]
pub struct FragmentStore {
    documents: Arc<Vec<Document>>,
    fragments: Arc<Vec<Fragment>>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document and all of its fragments.
    ///
    /// Nothing is inserted when a document with the same name exists.
    pub fn add_batch(&mut self, document: Document, fragments: Vec<Fragment>) -> Result<(), StoreError> {
        if self.contains_name(&document.name) {
            return Err(StoreError::DuplicateDocument(document.name));
        }
        Arc::make_mut(&mut self.documents).push(document);
        Arc::make_mut(&mut self.fragments).extend(fragments);
        Ok(())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.documents.iter().any(|d| d.name == name)
    }

    /// All fragments in insertion order.
    pub fn all(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
