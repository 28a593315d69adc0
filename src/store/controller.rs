//! Sync controller: remote writes reconciled into a local cache.
//!
//! A [`SyncController`] owns the cache, the current-entity slot, the derived
//! stats and the last error for one collection. Every operation makes one
//! gateway round trip and, only once the remote call has succeeded, applies
//! its local mutation in a single critical section. Reads that fail leave
//! local state untouched; writes are never reflected before confirmation.
//!
//! Operations on the same controller are not fenced against each other. When
//! two writes are in flight, local state follows completion order, so the
//! cache can disagree with the remote store about which write came last.

use chrono::Utc;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::cache::EntityCache;
use super::error::StoreError;
use super::stats::{compute_stats, Stats};
use super::views;
use crate::gateway::{RemoteGateway, SortDirection};
use crate::models::{
    format_timestamp, AccountStatus, Deletable, Entity, EntityKind, Fields, OrderStatus, Orders,
    Products, StatusHistoryEntry, Users, ADMIN_NOTES, CREATED_AT, STATUS_HISTORY, UPDATED_AT,
};

#[derive(Debug)]
struct State {
    cache: EntityCache,
    current: Option<Entity>,
    stats: Stats,
    last_error: Option<StoreError>,
}

/// Keeps the in-flight count raised for as long as an operation runs,
/// including when its future is dropped early.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Synchronizes one remote collection with a local cache.
pub struct SyncController<K: EntityKind> {
    gateway: Arc<dyn RemoteGateway>,
    state: Mutex<State>,
    in_flight: AtomicUsize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> SyncController<K> {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        let cache = EntityCache::new();
        let stats = compute_stats::<K>(&cache);
        Self {
            gateway,
            state: Mutex::new(State {
                cache,
                current: None,
                stats,
                last_error: None,
            }),
            in_flight: AtomicUsize::new(0),
            _kind: PhantomData,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a failure for the consumer and hands it back for propagation.
    fn fail(&self, err: StoreError) -> StoreError {
        tracing::warn!(collection = K::COLLECTION, "{}", err);
        self.state().last_error = Some(err.clone());
        err
    }

    // ========== Consumer-facing state ==========

    /// True while at least one operation is awaiting the gateway.
    pub fn busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn last_error(&self) -> Option<StoreError> {
        self.state().last_error.clone()
    }

    /// Dismisses the last error. Errors are never cleared any other way.
    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Snapshot of the cache, in cache order.
    pub fn entities(&self) -> Vec<Entity> {
        self.state().cache.entities().to_vec()
    }

    pub fn len(&self) -> usize {
        self.state().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().cache.is_empty()
    }

    pub fn cached(&self, id: &str) -> Option<Entity> {
        self.state().cache.get(id).cloned()
    }

    pub fn current(&self) -> Option<Entity> {
        self.state().current.clone()
    }

    pub fn clear_current(&self) {
        self.state().current = None;
    }

    pub fn stats(&self) -> Stats {
        self.state().stats.clone()
    }

    // ========== Read views ==========

    pub fn by_category(&self, category: &str) -> Vec<Entity> {
        views::by_category(self.state().cache.entities(), category)
    }

    pub fn by_status(&self, status: &str) -> Vec<Entity> {
        views::by_status(self.state().cache.entities(), status)
    }

    /// First `n` records in cache order. See [`views::recent`].
    pub fn recent(&self, n: usize) -> Vec<Entity> {
        views::recent(self.state().cache.entities(), n)
    }

    // ========== Operations ==========

    /// Loads the whole collection, newest first, replacing the cache.
    pub async fn fetch_all(&self) -> Result<(), StoreError> {
        let _busy = BusyGuard::enter(&self.in_flight);
        tracing::debug!(collection = K::COLLECTION, "Fetching collection");

        let docs = self
            .gateway
            .list(K::COLLECTION, CREATED_AT, SortDirection::Descending)
            .await
            .map_err(|e| self.fail(StoreError::read(e)))?;

        let mut state = self.state();
        state.cache.replace_all(docs.into_iter().map(Entity::from).collect());
        state.stats = compute_stats::<K>(&state.cache);
        tracing::info!(
            collection = K::COLLECTION,
            "Loaded {} record(s)",
            state.cache.len()
        );
        Ok(())
    }

    /// Loads one record into the current-entity slot.
    pub async fn fetch_one(&self, id: &str) -> Result<Entity, StoreError> {
        let _busy = BusyGuard::enter(&self.in_flight);
        tracing::debug!(collection = K::COLLECTION, id, "Fetching record");

        let doc = self
            .gateway
            .get(K::COLLECTION, id)
            .await
            .map_err(|e| self.fail(StoreError::read(e)))?;

        let entity = match doc {
            Some(doc) => Entity::from(doc),
            None => {
                return Err(self.fail(StoreError::NotFound {
                    kind: K::LABEL,
                    id: id.to_string(),
                }))
            }
        };

        self.state().current = Some(entity.clone());
        Ok(entity)
    }

    /// Creates a record remotely, then prepends it to the cache.
    ///
    /// Timestamps and the kind's defaults are stamped before the write.
    pub async fn create(&self, fields: Fields) -> Result<Entity, StoreError> {
        let _busy = BusyGuard::enter(&self.in_flight);

        let mut fields = fields;
        let now = Value::String(format_timestamp(Utc::now()));
        fields.insert(CREATED_AT.to_string(), now.clone());
        fields.insert(UPDATED_AT.to_string(), now);
        K::apply_creation_defaults(&mut fields);

        let id = self
            .gateway
            .insert(K::COLLECTION, fields.clone())
            .await
            .map_err(|e| self.fail(StoreError::write(e)))?;

        let entity = Entity::new(id, fields);
        let mut state = self.state();
        state.cache.push_front(entity.clone());
        state.stats = compute_stats::<K>(&state.cache);
        tracing::info!(collection = K::COLLECTION, id = %entity.id, "Created record");
        Ok(entity)
    }

    /// Merges `fields` into a record remotely, then into the cache entry and
    /// the current slot if it holds the same record.
    ///
    /// For kinds that track status history, a `status` field appends a
    /// history entry carrying `note`; a non-empty note is also stored as the
    /// record's admin note.
    pub async fn update(
        &self,
        id: &str,
        fields: Fields,
        note: Option<&str>,
    ) -> Result<(), StoreError> {
        let _busy = BusyGuard::enter(&self.in_flight);

        let mut patch = fields;
        patch.insert(
            UPDATED_AT.to_string(),
            Value::String(format_timestamp(Utc::now())),
        );
        if K::TRACKS_STATUS_HISTORY {
            self.stamp_status_history(id, &mut patch, note.unwrap_or(""));
        }

        self.gateway
            .update(K::COLLECTION, id, patch.clone())
            .await
            .map_err(|e| self.fail(StoreError::write(e)))?;

        let mut state = self.state();
        state.cache.patch(id, &patch);
        if let Some(current) = state.current.as_mut().filter(|c| c.id == id) {
            current.apply(&patch);
        }
        state.stats = compute_stats::<K>(&state.cache);
        tracing::info!(collection = K::COLLECTION, id, "Updated record");
        Ok(())
    }

    /// Adds the history entry (and admin note) for a status change to `patch`.
    ///
    /// The existing history comes from the cached record, or the current slot
    /// when the record is not cached. Without a local copy the history is
    /// left alone rather than overwritten with a single entry.
    fn stamp_status_history(&self, id: &str, patch: &mut Fields, note: &str) {
        let status = match patch.get("status").and_then(Value::as_str) {
            Some(status) => status.to_string(),
            None => return,
        };

        if !note.is_empty() {
            patch.insert(ADMIN_NOTES.to_string(), Value::String(note.to_string()));
        }

        let history = {
            let state = self.state();
            let local = state
                .cache
                .get(id)
                .or_else(|| state.current.as_ref().filter(|c| c.id == id));
            let history = local.map(|entity| match entity.get(STATUS_HISTORY) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            });
            history
        };

        match history {
            Some(mut history) => {
                history.push(StatusHistoryEntry::new(status, Utc::now(), note).to_value());
                patch.insert(STATUS_HISTORY.to_string(), Value::Array(history));
            }
            None => tracing::warn!(
                collection = K::COLLECTION,
                id,
                "No local copy of record; status history not appended"
            ),
        }
    }
}

impl<K: Deletable> SyncController<K> {
    /// Deletes a record remotely, then drops it from the cache and the
    /// current slot.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _busy = BusyGuard::enter(&self.in_flight);

        self.gateway
            .delete(K::COLLECTION, id)
            .await
            .map_err(|e| self.fail(StoreError::write(e)))?;

        let mut state = self.state();
        state.cache.remove(id);
        if state.current.as_ref().is_some_and(|c| c.id == id) {
            state.current = None;
        }
        state.stats = compute_stats::<K>(&state.cache);
        tracing::info!(collection = K::COLLECTION, id, "Deleted record");
        Ok(())
    }
}

impl SyncController<Products> {
    pub fn featured(&self) -> Vec<Entity> {
        views::featured(self.state().cache.entities())
    }

    /// Flips a cached product's `active` flag. Returns `false` if the product
    /// is not cached.
    pub async fn toggle_active(&self, id: &str) -> Result<bool, StoreError> {
        self.toggle_flag(id, "active").await
    }

    /// Flips a cached product's `featured` flag. Returns `false` if the
    /// product is not cached.
    pub async fn toggle_featured(&self, id: &str) -> Result<bool, StoreError> {
        self.toggle_flag(id, "featured").await
    }

    async fn toggle_flag(&self, id: &str, flag: &str) -> Result<bool, StoreError> {
        let value = match self.cached(id) {
            Some(product) => product.bool_field(flag).unwrap_or(false),
            None => return Ok(false),
        };

        let mut patch = Fields::new();
        patch.insert(flag.to_string(), Value::Bool(!value));
        self.update(id, patch, None).await?;
        Ok(true)
    }
}

impl SyncController<Orders> {
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut patch = Fields::new();
        patch.insert("status".into(), Value::String(status.to_string()));
        self.update(id, patch, note).await
    }

    /// Sum of `total` over delivered orders in the cache.
    pub fn total_revenue(&self) -> f64 {
        views::total_revenue(self.state().cache.entities())
    }
}

impl SyncController<Users> {
    pub async fn update_status(&self, id: &str, status: AccountStatus) -> Result<(), StoreError> {
        let mut patch = Fields::new();
        patch.insert("status".into(), Value::String(status.to_string()));
        self.update(id, patch, None).await
    }

    pub fn active_users(&self) -> Vec<Entity> {
        self.by_status(AccountStatus::Active.as_str())
    }
}
