use bson::{Bson, Document, oid::ObjectId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::matcher::{
    apply_update, bson_equal, compare_docs, eval_filter, parse_filter, parse_sort, project,
    validate_update,
};
use super::{Cursor, DocumentStore, FindOptions, ReturnDocument, StoreCollection};
use crate::errors::StoreError;
use crate::types::NATIVE_ID;

/// In-process document store. Collections keep insertion order, which is the natural
/// order of unsorted reads.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing collection by name, without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<MemoryCollection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn drop_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    fn get_or_create(&self, name: &str) -> Arc<MemoryCollection> {
        if let Some(col) = self.collections.read().get(name) {
            return col.clone();
        }
        self.collections
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("creating collection {name}");
                Arc::new(MemoryCollection::new(name.to_string()))
            })
            .clone()
    }
}

impl DocumentStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn StoreCollection> {
        self.get_or_create(name)
    }

    fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}

pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self { name, docs: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Clone of every document in natural order.
    #[must_use]
    pub fn get_all_documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl StoreCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, filter: &Document, opts: &FindOptions) -> Result<Cursor, StoreError> {
        let bench_start = Instant::now();
        let parsed = parse_filter(filter)?;
        let sort = opts.sort.as_ref().map(parse_sort).transpose()?;

        let mut docs: Vec<Document> =
            self.docs.read().iter().filter(|d| eval_filter(d, &parsed)).cloned().collect();
        if let Some(sort) = &sort {
            docs.sort_by(|a, b| compare_docs(a, b, sort));
        }
        let skip = to_usize(opts.skip.unwrap_or(0));
        let limit = match opts.limit {
            None | Some(0) => usize::MAX,
            Some(n) => to_usize(n),
        };
        let docs: Vec<Document> = docs
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| match &opts.projection {
                Some(p) => project(&d, p),
                None => d,
            })
            .collect();
        crate::dev6!(
            "{{\"bench\":\"store\",\"op\":\"find\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{},\"skip\":{},\"limit\":{}}}",
            self.name,
            bench_start.elapsed().as_millis(),
            docs.len(),
            opts.skip.unwrap_or(0),
            opts.limit.unwrap_or(0)
        );
        Ok(Cursor::new(docs))
    }

    fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, StoreError> {
        let parsed = parse_filter(filter)?;
        let docs = self.docs.read();
        Ok(docs.iter().find(|d| eval_filter(d, &parsed)).map(|d| match projection {
            Some(p) => project(d, p),
            None => d.clone(),
        }))
    }

    fn insert_one(&self, mut doc: Document) -> Result<Bson, StoreError> {
        let id = match doc.get(NATIVE_ID) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                doc.insert(NATIVE_ID, id.clone());
                id
            }
        };
        let mut docs = self.docs.write();
        if docs.iter().any(|d| d.get(NATIVE_ID).is_some_and(|existing| bson_equal(existing, &id))) {
            return Err(StoreError::DuplicateKey { collection: self.name.clone(), id: id.to_string() });
        }
        docs.push(doc);
        Ok(id)
    }

    fn find_one_and_update(
        &self,
        filter: &Document,
        update: &Document,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>, StoreError> {
        validate_update(update)?;
        let parsed = parse_filter(filter)?;
        let mut docs = self.docs.write();
        let Some(pos) = docs.iter().position(|d| eval_filter(d, &parsed)) else {
            return Ok(None);
        };
        let before = docs[pos].clone();
        let mut after = before.clone();
        apply_update(&mut after, update)?;
        docs[pos] = after.clone();
        Ok(Some(match return_document {
            ReturnDocument::Before => before,
            ReturnDocument::After => after,
        }))
    }

    fn find_one_and_delete(&self, filter: &Document) -> Result<Option<Document>, StoreError> {
        let parsed = parse_filter(filter)?;
        let mut docs = self.docs.write();
        let pos = docs.iter().position(|d| eval_filter(d, &parsed));
        Ok(pos.map(|pos| docs.remove(pos)))
    }

    fn count_documents(&self, filter: &Document) -> Result<u64, StoreError> {
        let parsed = parse_filter(filter)?;
        let n = self.docs.read().iter().filter(|d| eval_filter(d, &parsed)).count();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}
