use crate::core::validation::{normalize_name, require_non_empty};
use crate::core::{Id, RestaurantClass, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{Address, Contract, MenuCategory};
use crate::storage::Keyed;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub(crate) name: String,
    pub(crate) address: Address,
    pub(crate) classes: BTreeSet<RestaurantClass>,
    pub(crate) max_car_height: Option<f64>,
    pub(crate) max_delivery_distance: Option<u32>,
    pub(crate) parking_capacity: Option<u32>,
    pub(crate) contracts: Vec<Id<Contract>>,
    /// Qualified association: normalized category name -> category.
    pub(crate) categories: BTreeMap<String, Id<MenuCategory>>,
}

impl Restaurant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn classes(&self) -> &BTreeSet<RestaurantClass> {
        &self.classes
    }

    pub fn has_class(&self, class: RestaurantClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn classes_pretty(&self) -> String {
        self.classes
            .iter()
            .map(|class| class.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn contracts(&self) -> &[Id<Contract>] {
        &self.contracts
    }

    pub fn categories(&self) -> &BTreeMap<String, Id<MenuCategory>> {
        &self.categories
    }

    pub fn max_car_height(&self) -> Result<Option<f64>> {
        self.require_class(RestaurantClass::DriveThru)?;
        Ok(self.max_car_height)
    }

    pub fn max_delivery_distance(&self) -> Result<Option<u32>> {
        self.require_class(RestaurantClass::Delivery)?;
        Ok(self.max_delivery_distance)
    }

    pub fn parking_capacity(&self) -> Result<Option<u32>> {
        self.require_class(RestaurantClass::OwnBuilding)?;
        Ok(self.parking_capacity)
    }

    fn require_class(&self, class: RestaurantClass) -> Result<()> {
        if !self.has_class(class) {
            return Err(StoreError::CapabilityAbsent(class));
        }
        Ok(())
    }
}

impl Keyed for Restaurant {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Store {
    pub fn create_restaurant<I>(
        &mut self,
        name: &str,
        address: Address,
        classes: I,
    ) -> Result<Id<Restaurant>>
    where
        I: IntoIterator<Item = RestaurantClass>,
    {
        let classes: BTreeSet<_> = classes.into_iter().collect();
        let validated = require_non_empty("Restaurant name", name)
            .and_then(|_| self.ensure_unique::<Restaurant>("Restaurant name", name, None))
            .and_then(|_| {
                if classes.is_empty() {
                    return Err(StoreError::validation(
                        "Restaurant must have at least one class",
                    ));
                }
                Ok(())
            });
        if let Err(err) = validated {
            debug!("Rejected restaurant '{}': {}", name, err);
            return Err(err);
        }

        let id = self.extent_mut::<Restaurant>().register(Restaurant {
            name: name.trim().to_string(),
            address,
            classes,
            max_car_height: None,
            max_delivery_distance: None,
            parking_capacity: None,
            contracts: Vec::new(),
            categories: BTreeMap::new(),
        });
        debug!("Registered restaurant {} '{}'", id, name.trim());
        Ok(id)
    }

    pub fn set_max_car_height(&mut self, restaurant: Id<Restaurant>, height: f64) -> Result<()> {
        let entry = self.require_mut(restaurant)?;
        entry.require_class(RestaurantClass::DriveThru)?;
        if !height.is_finite() || height <= 0.0 {
            return Err(StoreError::validation("Max car height must be positive"));
        }
        entry.max_car_height = Some(height);
        Ok(())
    }

    pub fn set_max_delivery_distance(
        &mut self,
        restaurant: Id<Restaurant>,
        distance: u32,
    ) -> Result<()> {
        let entry = self.require_mut(restaurant)?;
        entry.require_class(RestaurantClass::Delivery)?;
        entry.max_delivery_distance = Some(distance);
        Ok(())
    }

    pub fn set_parking_capacity(&mut self, restaurant: Id<Restaurant>, capacity: u32) -> Result<()> {
        let entry = self.require_mut(restaurant)?;
        entry.require_class(RestaurantClass::OwnBuilding)?;
        entry.parking_capacity = Some(capacity);
        Ok(())
    }

    /// Links a category under its name. No-op if the name is already mapped.
    pub fn restaurant_add_category(
        &mut self,
        restaurant: Id<Restaurant>,
        category: Id<MenuCategory>,
    ) -> Result<()> {
        let name = self.require(category)?.name.clone();
        let entry = self.require_mut(restaurant)?;
        if entry.categories.contains_key(&name) {
            return Ok(());
        }
        entry.categories.insert(name, category);
        debug!("Linked restaurant {} -> category {}", restaurant, category);
        self.category_add_restaurant(category, restaurant)
    }

    pub fn restaurant_remove_category(
        &mut self,
        restaurant: Id<Restaurant>,
        category: Id<MenuCategory>,
    ) -> Result<()> {
        let name = self.require(category)?.name.clone();
        let entry = self.require_mut(restaurant)?;
        if entry.categories.get(&name) != Some(&category) {
            return Ok(());
        }
        entry.categories.remove(&name);
        debug!("Unlinked restaurant {} -> category {}", restaurant, category);
        self.category_remove_restaurant(category, restaurant)
    }

    /// Qualified lookup; the name is normalized before matching.
    pub fn category_by_name(
        &self,
        restaurant: Id<Restaurant>,
        name: &str,
    ) -> Result<Option<Id<MenuCategory>>> {
        let entry = self.require(restaurant)?;
        Ok(entry.categories.get(&normalize_name(name)).copied())
    }

    /// Every live category not linked to `restaurant`.
    pub fn unassigned_categories(&self, restaurant: Id<Restaurant>) -> Result<Vec<Id<MenuCategory>>> {
        let assigned: HashSet<_> = self.require(restaurant)?.categories.values().copied().collect();
        Ok(self
            .caches
            .all_categories
            .iter()
            .filter(|category| !assigned.contains(category))
            .copied()
            .collect())
    }
}

impl Cascade for Restaurant {
    fn cascade_delete(store: &mut Store, id: Id<Restaurant>) -> Result<()> {
        while let Some(contract) = store.require(id)?.contracts.first().copied() {
            store.delete(contract)?;
        }
        while let Some(category) = store.require(id)?.categories.values().next().copied() {
            store.restaurant_remove_category(id, category)?;
        }
        store.extent_mut::<Restaurant>().unregister(id);
        Ok(())
    }
}
