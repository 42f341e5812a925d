use bson::{Document, doc};
use serde::de::DeserializeOwned;

use super::args::{CountArgs, CreateArgs, DeleteArgs, FindManyArgs, FindUniqueArgs, UpdateArgs};
use crate::config::RecordsConfig;
use crate::errors::{DbError, DbResult};
use crate::identity::{ensure_identity, normalize_identity_field};
use crate::logger::{AUDIT_TARGET, DEV6_TARGET};
use crate::query::{
    UnknownOperatorPolicy, WhereInput, compile_filter, compile_projection, compile_query,
};
use crate::store::{DocumentStore, FindOptions, ReturnDocument};
use crate::utils::devlog;
use crate::utils::json::bson_document_to_json;

/// Relational-style record operations over a [`DocumentStore`].
///
/// Each call compiles its arguments into native query documents and issues exactly one
/// store request. Not-found is `Ok(None)`, never an error.
pub struct RecordService<S: DocumentStore> {
    store: S,
    config: RecordsConfig,
}

impl<S: DocumentStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RecordsConfig::default())
    }

    pub const fn with_config(store: S, config: RecordsConfig) -> Self {
        Self { store, config }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn config(&self) -> &RecordsConfig {
        &self.config
    }

    /// Matching records, sorted when `orderBy` is given, after `skip` then `take`.
    ///
    /// # Errors
    /// `InvalidArgument` for a rejected operator; `Store` for store failures.
    pub fn find_many(&self, collection: &str, args: FindManyArgs) -> DbResult<Vec<Document>> {
        check_operators(&self.config, args.filter.as_ref())?;
        let q = compile_query(args.filter.as_ref(), args.select.as_ref(), args.order_by.as_ref());
        let opts = FindOptions {
            projection: q.projection,
            sort: q.sort,
            skip: args.skip.filter(|n| *n > 0),
            limit: effective_take(&self.config, args.take),
        };
        trace("findMany", collection, &q.filter);
        let cursor = self.store.collection(collection).find(&q.filter, &opts)?;
        Ok(cursor.collect())
    }

    /// First matching record, or `None`.
    ///
    /// # Errors
    /// `InvalidArgument` for a rejected operator; `Store` for store failures.
    pub fn find_unique(&self, collection: &str, args: FindUniqueArgs) -> DbResult<Option<Document>> {
        check_operators(&self.config, args.filter.as_ref())?;
        let filter = compile_filter(args.filter.as_ref());
        let projection = compile_projection(args.select.as_ref());
        trace("findUnique", collection, &filter);
        Ok(self.store.collection(collection).find_one(&filter, projection.as_ref())?)
    }

    /// Insert `data` and return the stored record, identity included.
    ///
    /// # Errors
    /// `InvalidArgument` when `data` is missing; `Store` on a duplicate identity.
    pub fn create(&self, collection: &str, args: CreateArgs) -> DbResult<Document> {
        let mut data = require_data("create", args.data)?;
        let id = ensure_identity(&mut data, self.config.id_length);
        self.store.collection(collection).insert_one(data.clone())?;
        log::info!(target: AUDIT_TARGET, "create collection={collection} id={id}");
        Ok(data)
    }

    /// Set the fields of `data` on the first match; returns the updated record.
    ///
    /// # Errors
    /// `InvalidArgument` when `data` is missing, before the store is touched; `Store` when the
    /// update would change an existing identity.
    pub fn update(&self, collection: &str, args: UpdateArgs) -> DbResult<Option<Document>> {
        let mut data = require_data("update", args.data)?;
        check_operators(&self.config, args.filter.as_ref())?;
        normalize_identity_field(&mut data);
        let filter = compile_filter(args.filter.as_ref());
        trace("update", collection, &filter);
        let updated = self.store.collection(collection).find_one_and_update(
            &filter,
            &doc! { "$set": data },
            ReturnDocument::After,
        )?;
        match &updated {
            Some(d) => log::info!(
                target: AUDIT_TARGET,
                "update collection={collection} id={}",
                d.get("_id").map(ToString::to_string).unwrap_or_default()
            ),
            None => log::debug!("update on {collection}: no match"),
        }
        Ok(updated)
    }

    /// Remove the first match and return it.
    ///
    /// # Errors
    /// `InvalidArgument` for a rejected operator; `Store` for store failures.
    pub fn delete(&self, collection: &str, args: DeleteArgs) -> DbResult<Option<Document>> {
        check_operators(&self.config, args.filter.as_ref())?;
        let filter = compile_filter(args.filter.as_ref());
        trace("delete", collection, &filter);
        let removed = self.store.collection(collection).find_one_and_delete(&filter)?;
        if let Some(d) = &removed {
            log::info!(
                target: AUDIT_TARGET,
                "delete collection={collection} id={}",
                d.get("_id").map(ToString::to_string).unwrap_or_default()
            );
        }
        Ok(removed)
    }

    /// Number of matching records, ignoring pagination.
    ///
    /// # Errors
    /// `InvalidArgument` for a rejected operator; `Store` for store failures.
    pub fn count(&self, collection: &str, args: CountArgs) -> DbResult<u64> {
        check_operators(&self.config, args.filter.as_ref())?;
        let filter = compile_filter(args.filter.as_ref());
        trace("count", collection, &filter);
        Ok(self.store.collection(collection).count_documents(&filter)?)
    }

    /// # Errors
    /// As [`Self::find_many`], plus `InvalidArgument` for a malformed body.
    pub fn find_many_json(&self, collection: &str, body: &str) -> DbResult<Vec<Document>> {
        self.find_many(collection, parse_args(body)?)
    }

    /// # Errors
    /// As [`Self::find_unique`], plus `InvalidArgument` for a malformed body.
    pub fn find_unique_json(&self, collection: &str, body: &str) -> DbResult<Option<Document>> {
        self.find_unique(collection, parse_args(body)?)
    }

    /// # Errors
    /// As [`Self::create`], plus `InvalidArgument` for a malformed body.
    pub fn create_json(&self, collection: &str, body: &str) -> DbResult<Document> {
        self.create(collection, parse_args(body)?)
    }

    /// # Errors
    /// As [`Self::update`], plus `InvalidArgument` for a malformed body.
    pub fn update_json(&self, collection: &str, body: &str) -> DbResult<Option<Document>> {
        self.update(collection, parse_args(body)?)
    }

    /// # Errors
    /// As [`Self::delete`], plus `InvalidArgument` for a malformed body.
    pub fn delete_json(&self, collection: &str, body: &str) -> DbResult<Option<Document>> {
        self.delete(collection, parse_args(body)?)
    }

    /// # Errors
    /// As [`Self::count`], plus `InvalidArgument` for a malformed body.
    pub fn count_json(&self, collection: &str, body: &str) -> DbResult<u64> {
        self.count(collection, parse_args(body)?)
    }
}

/// Under [`UnknownOperatorPolicy::Reject`], fail on the first operator the compiler would drop.
///
/// # Errors
/// `InvalidArgument` naming the operator.
pub(crate) fn check_operators(config: &RecordsConfig, filter: Option<&WhereInput>) -> DbResult<()> {
    let Some(filter) = filter else { return Ok(()) };
    if config.unknown_operators != UnknownOperatorPolicy::Reject {
        return Ok(());
    }
    match filter.unrecognized_operators().first() {
        Some(name) => Err(DbError::InvalidArgument(format!("unknown filter operator: {name}"))),
        None => Ok(()),
    }
}

/// `take` after treating `0` as absent and applying `max_take`.
pub(crate) fn effective_take(config: &RecordsConfig, take: Option<u64>) -> Option<u64> {
    let take = take.filter(|n| *n > 0);
    match (take, config.max_take.filter(|n| *n > 0)) {
        (Some(t), Some(cap)) => Some(t.min(cap)),
        (None, cap) => cap,
        (t, None) => t,
    }
}

fn require_data(op: &str, data: Option<Document>) -> DbResult<Document> {
    data.ok_or_else(|| DbError::InvalidArgument(format!("{op} requires data")))
}

pub(crate) fn parse_args<T: DeserializeOwned>(body: &str) -> DbResult<T> {
    serde_json::from_str(body).map_err(|e| DbError::InvalidArgument(e.to_string()))
}

fn trace(op: &str, collection: &str, filter: &Document) {
    if !devlog::is_capturing() && !log::log_enabled!(target: DEV6_TARGET, log::Level::Trace) {
        return;
    }
    crate::dev6!(
        "{}",
        serde_json::json!({
            "op": op,
            "collection": collection,
            "filter": bson_document_to_json(filter.clone()),
        })
    );
}
