use crate::core::validation::{normalize_name, require_non_empty};
use crate::core::{Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{MenuItem, Restaurant};
use crate::storage::Keyed;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    /// Stored trimmed and lowercased.
    pub(crate) name: String,
    pub(crate) restaurants: Vec<Id<Restaurant>>,
    /// Kept sorted by item name, case-insensitively.
    pub(crate) items: Vec<Id<MenuItem>>,
}

impl MenuCategory {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn restaurants(&self) -> &[Id<Restaurant>] {
        &self.restaurants
    }

    pub fn items(&self) -> &[Id<MenuItem>] {
        &self.items
    }
}

impl Keyed for MenuCategory {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Store {
    pub fn create_menu_category(&mut self, name: &str) -> Result<Id<MenuCategory>> {
        require_non_empty("Category name", name)
            .and_then(|_| self.ensure_unique::<MenuCategory>("Category name", name, None))
            .inspect_err(|err| debug!("Rejected category '{}': {}", name, err))?;

        let id = self.extent_mut::<MenuCategory>().register(MenuCategory {
            name: normalize_name(name),
            restaurants: Vec::new(),
            items: Vec::new(),
        });
        self.caches.all_categories.insert(id);
        debug!("Registered category {} '{}'", id, normalize_name(name));
        Ok(id)
    }

    pub fn category_add_restaurant(
        &mut self,
        category: Id<MenuCategory>,
        restaurant: Id<Restaurant>,
    ) -> Result<()> {
        let name = self.require(category)?.name.clone();
        if let Some(existing) = self.require(restaurant)?.categories.get(&name) {
            if *existing != category {
                return Err(StoreError::relationship(format!(
                    "restaurant {} already maps '{}' to category {}",
                    restaurant, name, existing
                )));
            }
        }
        let entry = self.require_mut(category)?;
        if entry.restaurants.contains(&restaurant) {
            return Ok(());
        }
        entry.restaurants.push(restaurant);
        self.restaurant_add_category(restaurant, category)
    }

    pub fn category_remove_restaurant(
        &mut self,
        category: Id<MenuCategory>,
        restaurant: Id<Restaurant>,
    ) -> Result<()> {
        let entry = self.require_mut(category)?;
        let Some(position) = entry.restaurants.iter().position(|r| *r == restaurant) else {
            return Ok(());
        };
        entry.restaurants.remove(position);
        self.restaurant_remove_category(restaurant, category)
    }

    /// Inserts `item` at its sorted position. An item already shelved in a
    /// different category must be removed from it first.
    pub fn category_add_item(&mut self, category: Id<MenuCategory>, item: Id<MenuItem>) -> Result<()> {
        let entry = self.require(item)?;
        if let Some(current) = entry.category.filter(|current| *current != category) {
            return Err(StoreError::relationship(format!(
                "menu item {} already belongs to category {}",
                item, current
            )));
        }
        let sort_key = entry.name.to_lowercase();

        let shelf = &self.require(category)?.items;
        if shelf.contains(&item) {
            return Ok(());
        }
        let items = &self.extents.menu_items;
        let position = shelf.partition_point(|other| {
            items
                .get(*other)
                .is_some_and(|other| other.name.to_lowercase() <= sort_key)
        });

        self.require_mut(category)?.items.insert(position, item);
        debug!("Shelved menu item {} in category {}", item, category);
        self.item_add_category(item, category)
    }

    pub fn category_remove_item(
        &mut self,
        category: Id<MenuCategory>,
        item: Id<MenuItem>,
    ) -> Result<()> {
        let entry = self.require_mut(category)?;
        let Some(position) = entry.items.iter().position(|i| *i == item) else {
            return Ok(());
        };
        entry.items.remove(position);
        debug!("Unshelved menu item {} from category {}", item, category);
        self.item_remove_category(item)
    }

    /// Items of a category in shelf order.
    pub fn category_items(&self, category: Id<MenuCategory>) -> Result<Vec<&MenuItem>> {
        self.require(category)?
            .items
            .iter()
            .map(|item| self.require(*item))
            .collect()
    }
}

impl Cascade for MenuCategory {
    fn cascade_delete(store: &mut Store, id: Id<MenuCategory>) -> Result<()> {
        while let Some(restaurant) = store.require(id)?.restaurants.first().copied() {
            store.category_remove_restaurant(id, restaurant)?;
        }
        while let Some(item) = store.require(id)?.items.first().copied() {
            store.category_remove_item(id, item)?;
        }
        store.caches.all_categories.remove(&id);
        store.extent_mut::<MenuCategory>().unregister(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, RestaurantClass};
    use crate::model::Address;
    use chrono::NaiveDate;

    fn debut() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 12, 1).unwrap()
    }

    #[test]
    fn test_category_name_is_normalized_and_unique() {
        let mut store = Store::default();
        let mains = store.create_menu_category("  Mains ").unwrap();
        assert_eq!(store.get(mains).unwrap().name(), "mains");

        let err = store.create_menu_category("MAINS").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.all::<MenuCategory>().count(), 1);
    }

    #[test]
    fn test_items_kept_sorted() {
        let mut store = Store::default();
        let drinks = store.create_menu_category("Drinks").unwrap();
        for name in ["Latte", "espresso", "Mocha", "americano"] {
            let item = store.create_fixed_item(name, 9.5, debut(), false).unwrap();
            store.category_add_item(drinks, item).unwrap();
        }
        let names: Vec<_> = store
            .category_items(drinks)
            .unwrap()
            .into_iter()
            .map(|item| item.name())
            .collect();
        assert_eq!(names, vec!["americano", "espresso", "Latte", "Mocha"]);
    }

    #[test]
    fn test_item_cannot_be_in_two_categories() {
        let mut store = Store::default();
        let soup = store.create_menu_category("Soup").unwrap();
        let mains = store.create_menu_category("Mains").unwrap();
        let item = store.create_fixed_item("Tomato", 12.0, debut(), false).unwrap();

        store.category_add_item(soup, item).unwrap();
        let err = store.category_add_item(mains, item).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Relationship);
        assert!(store.get(mains).unwrap().items().is_empty());
        assert_eq!(store.get(item).unwrap().category(), Some(soup));
    }

    #[test]
    fn test_delete_category_leaves_items_uncategorized() {
        let mut store = Store::default();
        let address = Address::new("Polna", "12", "Warsaw", "67-890").unwrap();
        let bistro = store
            .create_restaurant("Polna Bistro", address, [RestaurantClass::OwnBuilding])
            .unwrap();
        let desserts = store.create_menu_category("Desserts").unwrap();
        let item = store.create_fixed_item("Sernik", 14.0, debut(), true).unwrap();
        store.restaurant_add_category(bistro, desserts).unwrap();
        store.item_add_category(item, desserts).unwrap();

        store.delete(desserts).unwrap();

        assert!(!store.contains(desserts));
        assert!(store.get(bistro).unwrap().categories().is_empty());
        assert_eq!(store.get(item).unwrap().category(), None);
        assert!(store.unassigned_categories(bistro).unwrap().is_empty());
    }
}
