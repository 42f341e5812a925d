//! Document store seam.
//!
//! [`DocumentStore`] is the collection accessor the record layer runs against: given a
//! name it hands back a [`StoreCollection`] that executes native filter, projection, sort
//! and `$set` documents. [`MemoryStore`] is the in-process implementation.

mod cursor;
mod matcher;
mod memory;

use bson::{Bson, Document};
use std::sync::Arc;

use crate::errors::StoreError;

pub use cursor::Cursor;
pub use memory::{MemoryCollection, MemoryStore};

/// Options for [`StoreCollection::find`]. Skip is applied before limit; a limit of `0`
/// means no limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Which version of the document `find_one_and_update` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnDocument {
    Before,
    #[default]
    After,
}

pub trait StoreCollection: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    /// Fails when the filter, sort or projection cannot be executed.
    fn find(&self, filter: &Document, opts: &FindOptions) -> Result<Cursor, StoreError>;

    /// # Errors
    /// Fails when the filter cannot be executed.
    fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, StoreError>;

    /// Insert a document that already carries `_id`. Returns the identity.
    ///
    /// # Errors
    /// Fails on a duplicate `_id`.
    fn insert_one(&self, doc: Document) -> Result<Bson, StoreError>;

    /// Atomically apply `update` to the first document matching `filter`.
    ///
    /// # Errors
    /// Fails on unsupported update operators or an attempt to change `_id`.
    fn find_one_and_update(
        &self,
        filter: &Document,
        update: &Document,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>, StoreError>;

    /// Atomically remove the first document matching `filter` and return it.
    ///
    /// # Errors
    /// Fails when the filter cannot be executed.
    fn find_one_and_delete(&self, filter: &Document) -> Result<Option<Document>, StoreError>;

    /// # Errors
    /// Fails when the filter cannot be executed.
    fn count_documents(&self, filter: &Document) -> Result<u64, StoreError>;
}

pub trait DocumentStore: Send + Sync {
    /// Handle for `name`, created on first use.
    fn collection(&self, name: &str) -> Arc<dyn StoreCollection>;

    fn list_collection_names(&self) -> Vec<String>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn collection(&self, name: &str) -> Arc<dyn StoreCollection> {
        (**self).collection(name)
    }

    fn list_collection_names(&self) -> Vec<String> {
        (**self).list_collection_names()
    }
}
