use bson::Document;
use std::sync::Arc;

use super::args::{CountArgs, CreateArgs, DeleteArgs, FindManyArgs, FindUniqueArgs, UpdateArgs};
use super::service::RecordService;
use crate::errors::{DbResult, StoreError};
use crate::store::DocumentStore;

/// Async front of a shared [`RecordService`]. Each call runs on the tokio blocking pool,
/// so the caller suspends while the store works.
pub struct AsyncRecordService<S: DocumentStore + 'static> {
    inner: Arc<RecordService<S>>,
}

impl<S: DocumentStore + 'static> Clone for AsyncRecordService<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S: DocumentStore + 'static> AsyncRecordService<S> {
    pub fn new(service: RecordService<S>) -> Self {
        Self { inner: Arc::new(service) }
    }

    pub const fn from_shared(inner: Arc<RecordService<S>>) -> Self {
        Self { inner }
    }

    pub fn service(&self) -> &RecordService<S> {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&RecordService<S>) -> DbResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// # Errors
    /// See [`RecordService::find_many`].
    pub async fn find_many(&self, collection: &str, args: FindManyArgs) -> DbResult<Vec<Document>> {
        let collection = collection.to_string();
        self.run(move |svc| svc.find_many(&collection, args)).await
    }

    /// # Errors
    /// See [`RecordService::find_unique`].
    pub async fn find_unique(&self, collection: &str, args: FindUniqueArgs) -> DbResult<Option<Document>> {
        let collection = collection.to_string();
        self.run(move |svc| svc.find_unique(&collection, args)).await
    }

    /// # Errors
    /// See [`RecordService::create`].
    pub async fn create(&self, collection: &str, args: CreateArgs) -> DbResult<Document> {
        let collection = collection.to_string();
        self.run(move |svc| svc.create(&collection, args)).await
    }

    /// # Errors
    /// See [`RecordService::update`].
    pub async fn update(&self, collection: &str, args: UpdateArgs) -> DbResult<Option<Document>> {
        let collection = collection.to_string();
        self.run(move |svc| svc.update(&collection, args)).await
    }

    /// # Errors
    /// See [`RecordService::delete`].
    pub async fn delete(&self, collection: &str, args: DeleteArgs) -> DbResult<Option<Document>> {
        let collection = collection.to_string();
        self.run(move |svc| svc.delete(&collection, args)).await
    }

    /// # Errors
    /// See [`RecordService::count`].
    pub async fn count(&self, collection: &str, args: CountArgs) -> DbResult<u64> {
        let collection = collection.to_string();
        self.run(move |svc| svc.count(&collection, args)).await
    }
}
