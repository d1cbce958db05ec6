use crate::core::{EntityKind, Id, Result, StoreError};
use crate::facade::StoreConfig;
use crate::facade::consistency;
use crate::model::MenuCategory;
use crate::storage::{Entity, Extent, Extents, Keyed, SnapshotManager};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Per-kind deletion protocol.
///
/// Implementations sever or cascade every relationship the entity holds and
/// only then unregister it, so no survivor is left pointing at a dead handle.
pub trait Cascade: Entity {
    fn cascade_delete(store: &mut Store, id: Id<Self>) -> Result<()>;
}

/// Registry-adjacent state that is derived from the extents rather than
/// persisted with them.
#[derive(Debug, Default)]
pub(crate) struct DerivedCaches {
    pub(crate) all_categories: BTreeSet<Id<MenuCategory>>,
}

/// The application context: every live entity, the derived caches, and the
/// snapshot file they are persisted to.
pub struct Store {
    config: StoreConfig,
    pub(crate) extents: Extents,
    pub(crate) caches: DerivedCaches,
    snapshots: SnapshotManager,
}

impl Store {
    /// Creates an empty store without touching the snapshot file.
    pub fn new(config: StoreConfig) -> Self {
        let snapshots =
            SnapshotManager::new(&config.snapshot_path).sync_on_save(config.sync_on_save);
        Self {
            config,
            extents: Extents::new(),
            caches: DerivedCaches::default(),
            snapshots,
        }
    }

    /// Creates a store and, if configured and a snapshot exists, loads it.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut store = Self::new(config);
        if store.config.load_on_open && store.snapshots.exists() {
            store.load()?;
        }
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn save(&self) -> Result<()> {
        self.snapshots.save(&self.extents)
    }

    /// Replaces the registry with the saved snapshot.
    ///
    /// Returns `Ok(false)` when there is no snapshot. A snapshot that cannot
    /// be decoded or whose graph is inconsistent fails the load and leaves
    /// the current registry untouched.
    pub fn load(&mut self) -> Result<bool> {
        let Some(snapshot) = self.snapshots.load()? else {
            warn!(
                "Snapshot {} does not exist, nothing loaded",
                self.snapshots.path().display()
            );
            return Ok(false);
        };

        consistency::check(&snapshot.extents).map_err(|e| {
            StoreError::persistence("Snapshot failed consistency check", e)
        })?;

        self.extents = snapshot.extents;
        self.rebuild_derived_caches();
        Ok(true)
    }

    /// Recomputes every derived cache from the extents. Called once after a
    /// successful load; normal mutations keep the caches current themselves.
    pub fn rebuild_derived_caches(&mut self) {
        self.caches.all_categories = self.extents.menu_categories.ids().into_iter().collect();
        info!(
            "Rebuilt derived caches ({} categories)",
            self.caches.all_categories.len()
        );
    }

    /// Verifies every bidirectional invariant of the live graph.
    pub fn check_consistency(&self) -> Result<()> {
        consistency::check(&self.extents)
    }

    // ========================================================================
    // Registry access
    // ========================================================================

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.extents.count(kind)
    }

    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        self.extents.counts()
    }

    /// Read-only view over every live instance of `T`, in insertion order.
    pub fn all<'a, T: Entity + 'a>(&'a self) -> impl Iterator<Item = (Id<T>, &'a T)> + 'a {
        self.extents.of::<T>().iter()
    }

    pub fn get<T: Entity>(&self, id: Id<T>) -> Option<&T> {
        self.extents.of::<T>().get(id)
    }

    pub fn contains<T: Entity>(&self, id: Id<T>) -> bool {
        self.extents.of::<T>().contains(id)
    }

    pub fn find_by_key<T: Keyed>(&self, key: &str) -> Option<Id<T>> {
        self.all::<T>()
            .find(|(_, item)| item.key_matches(key))
            .map(|(id, _)| id)
    }

    /// Deletes an entity, cascading per its kind.
    pub fn delete<T: Cascade>(&mut self, id: Id<T>) -> Result<()> {
        self.ensure_live(id)?;
        debug!("Deleting {} {}", T::LABEL, id);
        T::cascade_delete(self, id)
    }

    // ========================================================================
    // Helpers for the relationship maintainers
    // ========================================================================

    pub(crate) fn require<T: Entity>(&self, id: Id<T>) -> Result<&T> {
        self.get(id).ok_or_else(|| missing::<T>(id))
    }

    pub(crate) fn require_mut<T: Entity>(&mut self, id: Id<T>) -> Result<&mut T> {
        self.extents
            .of_mut::<T>()
            .get_mut(id)
            .ok_or_else(|| missing::<T>(id))
    }

    pub(crate) fn ensure_live<T: Entity>(&self, id: Id<T>) -> Result<()> {
        self.require(id).map(|_| ())
    }

    pub(crate) fn extent_mut<T: Entity>(&mut self) -> &mut Extent<T> {
        self.extents.of_mut::<T>()
    }

    /// Rejects `key` if any live `T` other than `exclude` already uses it.
    pub(crate) fn ensure_unique<T: Keyed>(
        &self,
        field: &str,
        key: &str,
        exclude: Option<Id<T>>,
    ) -> Result<()> {
        let taken = self
            .all::<T>()
            .filter(|(id, _)| Some(*id) != exclude)
            .any(|(_, item)| item.key_matches(key));
        if taken {
            return Err(StoreError::validation(format!(
                "{} '{}' must be unique",
                field,
                key.trim()
            )));
        }
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

pub(crate) fn missing<T: Entity>(id: Id<T>) -> StoreError {
    StoreError::MissingEntity {
        entity: T::LABEL,
        id: id.raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, RestaurantClass};
    use crate::model::Address;
    use tempfile::TempDir;

    fn bistro_with_category(store: &mut Store) -> Id<MenuCategory> {
        let address = Address::new("Koszykowa", "23", "Warsaw", "12-345").unwrap();
        let bistro = store
            .create_restaurant("Koszykowa Bistro", address, [RestaurantClass::Delivery])
            .unwrap();
        let mains = store.create_menu_category("mains").unwrap();
        store.restaurant_add_category(bistro, mains).unwrap();
        mains
    }

    #[test]
    fn test_inconsistent_snapshot_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::new(temp_dir.path().join("extent"));

        let mut broken = Store::new(config.clone());
        let mains = bistro_with_category(&mut broken);
        broken.extent_mut::<MenuCategory>().unregister(mains);
        broken.save().unwrap();

        let mut store = Store::new(config);
        store.create_menu_category("Soup").unwrap();
        let err = store.load().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(store.all::<MenuCategory>().count(), 1);
        assert_eq!(store.caches.all_categories.len(), 1);
    }

    #[test]
    fn test_snapshot_with_rewound_handle_counter_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::new(temp_dir.path().join("extent"));

        let mut broken = Store::new(config.clone());
        let soup = broken.create_menu_category("Soup").unwrap();
        broken.extents.menu_categories.next_id = 1;
        broken.save().unwrap();

        let mut store = Store::new(config);
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(store.is_empty());

        let coffee = store.create_menu_category("Coffee").unwrap();
        assert!(store.contains(coffee));
        assert_eq!(store.all::<MenuCategory>().count(), 1);
        assert_eq!(soup.raw(), 1);
    }

    #[test]
    fn test_rebuild_derived_caches() {
        let mut store = Store::default();
        bistro_with_category(&mut store);
        store.create_menu_category("Soup").unwrap();
        store.caches.all_categories.clear();

        store.rebuild_derived_caches();
        assert_eq!(store.caches.all_categories.len(), 2);
    }

    #[test]
    fn test_delete_missing_entity() {
        let mut store = Store::default();
        let mains = bistro_with_category(&mut store);
        store.delete(mains).unwrap();

        let err = store.delete(mains).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingEntity {
                entity: "MenuCategory",
                ..
            }
        ));
        store.check_consistency().unwrap();
    }
}
