use crate::core::{EntityKind, Id};
use crate::model::{Client, Contract, Discount, Employee, MenuCategory, MenuItem, Restaurant, Review};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that lives in an extent.
///
/// `LABEL` names the arena in diagnostics. Arenas holding a sum of several
/// concrete kinds (menu items, discounts) report the kind of each record
/// through [`Entity::kind`].
pub trait Entity: Sized {
    const LABEL: &'static str;

    fn kind(&self) -> EntityKind;

    fn extent(extents: &Extents) -> &Extent<Self>;

    fn extent_mut(extents: &mut Extents) -> &mut Extent<Self>;
}

/// Entities addressable by a unique textual key.
pub trait Keyed: Entity {
    fn key(&self) -> &str;

    /// Key comparison used by lookups and uniqueness checks.
    fn key_matches(&self, key: &str) -> bool {
        crate::core::validation::names_equal(self.key(), key)
    }
}

/// Insertion-ordered collection of every live instance of one entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extent<T> {
    pub(crate) next_id: u64,
    items: BTreeMap<Id<T>, T>,
}

impl<T> Default for Extent<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            items: BTreeMap::new(),
        }
    }
}

impl<T> Extent<T> {
    /// Adds an instance under a freshly allocated handle.
    pub fn register(&mut self, item: T) -> Id<T> {
        let id = Id::from_raw(self.next_id);
        self.next_id += 1;
        self.items.insert(id, item);
        id
    }

    /// Removes an instance; `None` if it was not live.
    pub fn unregister(&mut self, id: Id<T>) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: Id<T>) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only view in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> + '_ {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Id<T>, &mut T)> + '_ {
        self.items.iter_mut().map(|(id, item)| (*id, item))
    }

    pub fn ids(&self) -> Vec<Id<T>> {
        self.items.keys().copied().collect()
    }

    /// `true` while the next handle to be allocated is above every live one.
    pub(crate) fn allocator_is_ahead(&self) -> bool {
        self.items
            .keys()
            .next_back()
            .is_none_or(|last| last.raw() < self.next_id)
    }
}

/// One slot per entity type. This is the unit that is snapshotted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extents {
    pub(crate) restaurants: Extent<Restaurant>,
    pub(crate) menu_categories: Extent<MenuCategory>,
    pub(crate) menu_items: Extent<MenuItem>,
    pub(crate) employees: Extent<Employee>,
    pub(crate) clients: Extent<Client>,
    pub(crate) contracts: Extent<Contract>,
    pub(crate) reviews: Extent<Review>,
    pub(crate) discounts: Extent<Discount>,
}

impl Extents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<T: Entity>(&self) -> &Extent<T> {
        T::extent(self)
    }

    pub(crate) fn of_mut<T: Entity>(&mut self) -> &mut Extent<T> {
        T::extent_mut(self)
    }

    /// `true` when no slot holds any instance.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.restaurants.len()
            + self.menu_categories.len()
            + self.menu_items.len()
            + self.employees.len()
            + self.clients.len()
            + self.contracts.len()
            + self.reviews.len()
            + self.discounts.len()
    }

    /// Population of a single concrete kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Restaurant => self.restaurants.len(),
            EntityKind::MenuCategory => self.menu_categories.len(),
            EntityKind::Employee => self.employees.len(),
            EntityKind::Client => self.clients.len(),
            EntityKind::Contract => self.contracts.len(),
            EntityKind::Review => self.reviews.len(),
            EntityKind::MenuItemSeasonal | EntityKind::MenuItemFixed => self
                .menu_items
                .iter()
                .filter(|(_, item)| item.kind() == kind)
                .count(),
            EntityKind::Giftcard | EntityKind::Voucher | EntityKind::VoucherGiftcard => self
                .discounts
                .iter()
                .filter(|(_, discount)| discount.kind() == kind)
                .count(),
        }
    }

    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        EntityKind::ALL
            .iter()
            .map(|kind| (*kind, self.count(*kind)))
            .collect()
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Entity for $ty {
            const LABEL: &'static str = stringify!($ty);

            fn kind(&self) -> EntityKind {
                $kind
            }

            fn extent(extents: &Extents) -> &Extent<Self> {
                &extents.$field
            }

            fn extent_mut(extents: &mut Extents) -> &mut Extent<Self> {
                &mut extents.$field
            }
        }
    };
}

impl_entity!(Restaurant, EntityKind::Restaurant, restaurants);
impl_entity!(MenuCategory, EntityKind::MenuCategory, menu_categories);
impl_entity!(Employee, EntityKind::Employee, employees);
impl_entity!(Client, EntityKind::Client, clients);
impl_entity!(Contract, EntityKind::Contract, contracts);
impl_entity!(Review, EntityKind::Review, reviews);

impl Entity for MenuItem {
    const LABEL: &'static str = "MenuItem";

    fn kind(&self) -> EntityKind {
        self.variant_kind()
    }

    fn extent(extents: &Extents) -> &Extent<Self> {
        &extents.menu_items
    }

    fn extent_mut(extents: &mut Extents) -> &mut Extent<Self> {
        &mut extents.menu_items
    }
}

impl Entity for Discount {
    const LABEL: &'static str = "Discount";

    fn kind(&self) -> EntityKind {
        self.variant_kind()
    }

    fn extent(extents: &Extents) -> &Extent<Self> {
        &extents.discounts
    }

    fn extent_mut(extents: &mut Extents) -> &mut Extent<Self> {
        &mut extents.discounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_allocates_monotonic_handles() {
        let mut extent: Extent<&'static str> = Extent::default();
        let a = extent.register("a");
        let b = extent.register("b");
        assert!(a < b);
        assert_eq!(extent.len(), 2);

        assert_eq!(extent.unregister(a), Some("a"));
        let c = extent.register("c");
        assert!(c > b, "handles are never reused");

        let order: Vec<_> = extent.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, vec!["b", "c"]);
    }

    #[test]
    fn test_allocator_behind_live_handles() {
        let mut extent: Extent<u8> = Extent::default();
        assert!(extent.allocator_is_ahead());
        extent.register(1);
        extent.register(2);
        assert!(extent.allocator_is_ahead());

        extent.next_id = 2;
        assert!(!extent.allocator_is_ahead());
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut extent: Extent<u8> = Extent::default();
        let id = extent.register(1);
        assert!(extent.unregister(id).is_some());
        assert!(extent.unregister(id).is_none());
        assert!(extent.is_empty());
    }

    #[test]
    fn test_empty_registry_reports_zero_for_every_kind() {
        let extents = Extents::new();
        assert!(extents.is_empty());
        assert!(extents.counts().values().all(|count| *count == 0));
        assert_eq!(extents.of::<Restaurant>().len(), 0);
    }
}
