//! The synchronization service: coordinates a primary record store and a
//! derived search mirror so that search results eventually reflect
//! primary-store state, while primary reads stay authoritative.
//!
//! Every mutation writes the primary store first; the mirror write happens
//! second, in the same call, behind an isolated error boundary. A mirror
//! failure after a successful primary mutation is recorded and logged but
//! never fails the operation — there is no cross-store transaction and no
//! rollback, only an at-least-once push toward eventual consistency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{GriddleError, Result};
use crate::search::{SearchIndex, StructuredQuery};
use crate::store::RecordStore;
use crate::types::{Entity, PageRequest};

/// Cross-cutting propagation policy for the mirror write path.
///
/// Holds the divergence counter: the number of mirror writes/deletes that
/// failed after their primary mutation succeeded and were dropped. A
/// successful [`EntityService::reindex`] sweep resets it.
#[derive(Debug, Default)]
pub struct Propagation {
    diverged: AtomicU64,
}

impl Propagation {
    pub fn new() -> Self {
        Propagation::default()
    }

    /// Mirror mutations dropped since the last successful reindex.
    pub fn diverged(&self) -> u64 {
        self.diverged.load(Ordering::Relaxed)
    }

    fn record_failure(&self, kind: &'static str, op: &str, error: &GriddleError) {
        self.diverged.fetch_add(1, Ordering::Relaxed);
        let outcome = GriddleError::IndexPropagation(error.to_string());
        warn!(
            kind,
            op,
            %outcome,
            "dropped search mirror propagation; primary store remains authoritative"
        );
    }

    fn reset(&self) {
        self.diverged.store(0, Ordering::Relaxed);
    }
}

/// One synchronization service per entity kind: the operation set an
/// upstream transport binds to.
///
/// Stateless apart from the shared adapters and policy — cheap to clone,
/// no locks, no caches. Concurrent operations on the same identifier are
/// not serialized here; the primary store's own consistency applies.
pub struct EntityService<T: Entity> {
    store: Arc<dyn RecordStore<T>>,
    index: Arc<dyn SearchIndex<T>>,
    propagation: Arc<Propagation>,
}

impl<T: Entity> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        EntityService {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            propagation: Arc::clone(&self.propagation),
        }
    }
}

impl<T: Entity> EntityService<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>, index: Arc<dyn SearchIndex<T>>) -> Self {
        Self::with_propagation(store, index, Arc::new(Propagation::new()))
    }

    pub fn with_propagation(
        store: Arc<dyn RecordStore<T>>,
        index: Arc<dyn SearchIndex<T>>,
        propagation: Arc<Propagation>,
    ) -> Self {
        EntityService {
            store,
            index,
            propagation,
        }
    }

    pub fn propagation(&self) -> &Propagation {
        &self.propagation
    }

    /// Create a new record: validate, write the primary store, then mirror.
    pub async fn save(&self, record: T) -> Result<T> {
        debug!(kind = T::KIND, ?record, "request to save record");
        record.validate()?;
        let saved = self.store.create(record).await?;
        self.mirror_upsert(&saved).await;
        Ok(saved)
    }

    /// Full replace of an existing record.
    pub async fn update(&self, record: T) -> Result<T> {
        debug!(kind = T::KIND, ?record, "request to update record");
        record.validate()?;
        let updated = self.store.replace(record).await?;
        self.mirror_upsert(&updated).await;
        Ok(updated)
    }

    /// Merge-patch an existing record: only fields the patch explicitly
    /// supplies overwrite stored values.
    pub async fn partial_update(&self, id: T::Key, patch: T::Patch) -> Result<T> {
        debug!(kind = T::KIND, %id, ?patch, "request to partially update record");
        let merged = self.store.merge_patch(id, patch).await?;
        self.mirror_upsert(&merged).await;
        Ok(merged)
    }

    pub async fn find_all(&self, page: Option<PageRequest>) -> Result<Vec<T>> {
        debug!(kind = T::KIND, "request to get all records");
        self.store.find_all(page).await
    }

    pub async fn find_one(&self, id: &T::Key) -> Result<Option<T>> {
        debug!(kind = T::KIND, %id, "request to get record");
        self.store.find_by_id(id).await
    }

    pub async fn count_all(&self) -> Result<u64> {
        self.store.count().await
    }

    /// Delete from the primary store; mirror deletion is best-effort.
    /// Deleting an absent id is a `NotFound` error and leaves the mirror
    /// untouched.
    pub async fn delete(&self, id: &T::Key) -> Result<()> {
        debug!(kind = T::KIND, %id, "request to delete record");
        self.store.delete_by_id(id).await?;
        if let Err(error) = self.index.delete_record(id).await {
            self.propagation.record_failure(T::KIND, "delete", &error);
        }
        Ok(())
    }

    /// Query the mirror. Mirror errors are fatal here — there is nothing to
    /// fall back to on the search path.
    pub async fn search(&self, query: &str) -> Result<Vec<T>> {
        debug!(kind = T::KIND, query, "request to search records");
        self.index.search(query).await
    }

    pub async fn search_structured(&self, query: &StructuredQuery) -> Result<Vec<T>> {
        debug!(kind = T::KIND, "request to search a page of records");
        self.index.search_structured(query).await
    }

    pub async fn search_count(&self) -> Result<u64> {
        self.index.count().await
    }

    /// Rebuild the mirror from the primary store: wipe it, then re-index
    /// every record. This is the reconciliation sweep for dropped
    /// propagations; on success the divergence counter resets.
    pub async fn reindex(&self) -> Result<u64> {
        debug!(kind = T::KIND, "request to rebuild search mirror");
        self.index.clear().await?;
        let records = self.store.find_all(None).await?;
        self.index.index_all(&records).await?;
        self.propagation.reset();
        Ok(records.len() as u64)
    }

    async fn mirror_upsert(&self, record: &T) {
        if let Err(error) = self.index.index_record(record).await {
            self.propagation.record_failure(T::KIND, "upsert", &error);
        }
    }
}
