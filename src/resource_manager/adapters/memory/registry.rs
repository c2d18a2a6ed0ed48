//! Concurrency-safe registry of locally owned resource metadata.

use crate::resource_manager::domain::{ResourceId, ResourceMetadata};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Thread-safe map from resource identifier to [`ResourceMetadata`].
///
/// Every operation takes the lock for the duration of a single map access,
/// so callers never hold it across a broker call. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceRegistry {
    entries: Arc<RwLock<HashMap<ResourceId, ResourceMetadata>>>,
}

impl InMemoryResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the metadata for `id`.
    pub fn set(&self, id: ResourceId, metadata: ResourceMetadata) {
        self.entries.write().insert(id, metadata);
    }

    /// Returns a copy of the metadata for `id`.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<ResourceMetadata> {
        self.entries.read().get(id).cloned()
    }

    /// Removes `id`, returning the metadata it held.
    pub fn delete(&self, id: &ResourceId) -> Option<ResourceMetadata> {
        self.entries.write().remove(id)
    }

    /// Applies `update` to an existing entry. Returns `false` without
    /// inserting anything when `id` is absent.
    pub fn modify(&self, id: &ResourceId, update: impl FnOnce(&mut ResourceMetadata)) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(id) {
            Some(metadata) => {
                update(metadata);
                true
            }
            None => false,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Returns the registered identifiers in no defined order.
    #[must_use]
    pub fn ids(&self) -> Vec<ResourceId> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns a snapshot of the entries present at call time.
    ///
    /// The snapshot is detached from the registry; concurrent `set` and
    /// `delete` calls do not affect an iteration already in progress.
    pub fn iterate(&self) -> std::vec::IntoIter<(ResourceId, ResourceMetadata)> {
        let snapshot: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(id, metadata)| (id.clone(), metadata.clone()))
            .collect();
        snapshot.into_iter()
    }
}
