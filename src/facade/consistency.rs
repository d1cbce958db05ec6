//! Whole-graph integrity check.
//!
//! Every association is stored on both of its ends; this walks the registry
//! and verifies that each end agrees with the other, that every handle is
//! live, and that the uniqueness and ordering rules hold.

use crate::core::validation::normalize_name;
use crate::core::{EntityKind, Id, Result, StoreError};
use crate::model::{Discount, MenuItem};
use crate::storage::{Entity, Extent, Extents, Keyed};
use std::collections::HashSet;

pub(crate) fn check(extents: &Extents) -> Result<()> {
    check_allocators(extents)?;
    check_restaurants(extents)?;
    check_categories(extents)?;
    check_menu_items(extents)?;
    check_staff(extents)?;
    check_clients(extents)?;
    check_discounts(extents)?;
    Ok(())
}

/// A handle counter at or below a live handle would hand out that handle again.
fn check_allocators(extents: &Extents) -> Result<()> {
    allocator_ahead(&extents.restaurants)?;
    allocator_ahead(&extents.menu_categories)?;
    allocator_ahead(&extents.menu_items)?;
    allocator_ahead(&extents.employees)?;
    allocator_ahead(&extents.clients)?;
    allocator_ahead(&extents.contracts)?;
    allocator_ahead(&extents.reviews)?;
    allocator_ahead(&extents.discounts)
}

fn check_restaurants(extents: &Extents) -> Result<()> {
    unique_keys(&extents.restaurants)?;
    for (id, restaurant) in extents.restaurants.iter() {
        no_duplicates(id, &restaurant.contracts)?;
        for contract in &restaurant.contracts {
            let entry = live(&extents.contracts, *contract)?;
            ensure(entry.restaurant == id, || {
                format!("contract {} does not point back at restaurant {}", contract, id)
            })?;
        }
        for (name, category) in &restaurant.categories {
            let entry = live(&extents.menu_categories, *category)?;
            ensure(&entry.name == name, || {
                format!("restaurant {} files category {} under '{}'", id, category, name)
            })?;
            ensure(entry.restaurants.contains(&id), || {
                format!("category {} does not list restaurant {}", category, id)
            })?;
        }
    }
    Ok(())
}

fn check_categories(extents: &Extents) -> Result<()> {
    unique_keys(&extents.menu_categories)?;
    for (id, category) in extents.menu_categories.iter() {
        ensure(category.name == normalize_name(&category.name), || {
            format!("category {} name '{}' is not normalized", id, category.name)
        })?;
        no_duplicates(id, &category.restaurants)?;
        no_duplicates(id, &category.items)?;
        for restaurant in &category.restaurants {
            let entry = live(&extents.restaurants, *restaurant)?;
            ensure(entry.categories.get(&category.name) == Some(&id), || {
                format!("restaurant {} does not map category {}", restaurant, id)
            })?;
        }

        let mut previous: Option<String> = None;
        for item in &category.items {
            let entry = live(&extents.menu_items, *item)?;
            ensure(entry.category == Some(id), || {
                format!("menu item {} does not point back at category {}", item, id)
            })?;
            let sort_key = entry.name.to_lowercase();
            if let Some(previous) = &previous {
                ensure(*previous <= sort_key, || {
                    format!("category {} items are out of order", id)
                })?;
            }
            previous = Some(sort_key);
        }
    }
    Ok(())
}

fn check_menu_items(extents: &Extents) -> Result<()> {
    unique_keys(&extents.menu_items)?;
    for (id, item) in extents.menu_items.iter() {
        if let Some(category) = item.category {
            let entry = live(&extents.menu_categories, category)?;
            ensure(entry.items.contains(&id), || {
                format!("category {} does not shelve menu item {}", category, id)
            })?;
        }
    }
    Ok(())
}

fn check_staff(extents: &Extents) -> Result<()> {
    unique_keys(&extents.employees)?;
    for (id, employee) in extents.employees.iter() {
        no_duplicates(id, &employee.contracts)?;
        for contract in &employee.contracts {
            let entry = live(&extents.contracts, *contract)?;
            ensure(entry.employee == id, || {
                format!("contract {} does not point back at employee {}", contract, id)
            })?;
        }
    }

    let mut triples = HashSet::new();
    for (id, contract) in extents.contracts.iter() {
        let employee = live(&extents.employees, contract.employee)?;
        let restaurant = live(&extents.restaurants, contract.restaurant)?;
        ensure(
            employee.contracts.contains(&id) && restaurant.contracts.contains(&id),
            || format!("contract {} is not listed by both of its parties", id),
        )?;
        ensure(
            triples.insert((contract.employee, contract.restaurant, contract.contract_type)),
            || format!("contract {} duplicates an existing contract", id),
        )?;
    }
    Ok(())
}

fn check_clients(extents: &Extents) -> Result<()> {
    for (id, client) in extents.clients.iter() {
        no_duplicates(id, &client.reviews)?;
        no_duplicates(id, &client.discounts)?;
        no_duplicates(id, &client.active_discounts)?;
        for review in &client.reviews {
            let entry = live(&extents.reviews, *review)?;
            ensure(entry.client == id, || {
                format!("review {} does not point back at client {}", review, id)
            })?;
        }
        for discount in &client.discounts {
            let entry = live(&extents.discounts, *discount)?;
            ensure(entry.client == Some(id), || {
                format!("discount {} does not point back at client {}", discount, id)
            })?;
        }
        for discount in &client.active_discounts {
            ensure(client.discounts.contains(discount), || {
                format!("active discount {} is not held by client {}", discount, id)
            })?;
        }
    }

    for (id, review) in extents.reviews.iter() {
        let client = live(&extents.clients, review.client)?;
        ensure(client.reviews.contains(&id), || {
            format!("client {} does not list review {}", review.client, id)
        })?;
    }
    Ok(())
}

fn check_discounts(extents: &Extents) -> Result<()> {
    for (id, discount) in extents.discounts.iter() {
        if let Some(client) = discount.client {
            let entry = live(&extents.clients, client)?;
            ensure(entry.discounts.contains(&id), || {
                format!("client {} does not hold discount {}", client, id)
            })?;
        }
        if let Some(item) = discount.menu_item() {
            live::<MenuItem>(&extents.menu_items, item)?;
        }
        if let Some(giftcard) = discount.giftcard() {
            let entry: &Discount = live(&extents.discounts, giftcard)?;
            ensure(entry.kind() == EntityKind::Giftcard, || {
                format!("discount {} tops up {} which is not a giftcard", id, giftcard)
            })?;
        }
    }
    Ok(())
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(StoreError::relationship(message()))
    }
}

fn live<T: Entity>(extent: &Extent<T>, id: Id<T>) -> Result<&T> {
    extent
        .get(id)
        .ok_or_else(|| crate::facade::store::missing::<T>(id))
}

fn allocator_ahead<T: Entity>(extent: &Extent<T>) -> Result<()> {
    ensure(extent.allocator_is_ahead(), || {
        format!("{} handle counter is behind its live handles", T::LABEL)
    })
}

fn no_duplicates<O: Entity, T>(owner: Id<O>, handles: &[Id<T>]) -> Result<()> {
    let mut seen = HashSet::new();
    ensure(handles.iter().all(|handle| seen.insert(*handle)), || {
        format!("{} {} lists the same handle twice", O::LABEL, owner)
    })
}

fn unique_keys<T: Keyed>(extent: &Extent<T>) -> Result<()> {
    let mut seen = HashSet::new();
    for (id, item) in extent.iter() {
        ensure(seen.insert(normalize_name(item.key())), || {
            format!("{} {} reuses the key '{}'", T::LABEL, id, item.key())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, RestaurantClass};
    use crate::facade::Store;
    use crate::model::{Address, MenuCategory};
    use chrono::NaiveDate;

    fn populated() -> (Store, Id<MenuCategory>, Id<MenuItem>) {
        let mut store = Store::default();
        let address = Address::new("Koszykowa", "23", "Warsaw", "12-345").unwrap();
        let bistro = store
            .create_restaurant("Koszykowa Bistro", address, [RestaurantClass::Delivery])
            .unwrap();
        let mains = store.create_menu_category("Mains").unwrap();
        let debut = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        let item = store.create_fixed_item("McChicken", 18.0, debut, false).unwrap();
        store.restaurant_add_category(bistro, mains).unwrap();
        store.category_add_item(mains, item).unwrap();
        (store, mains, item)
    }

    #[test]
    fn test_consistent_graph_passes() {
        let (store, _, _) = populated();
        check(store.extents()).unwrap();
    }

    #[test]
    fn test_one_sided_link_is_detected() {
        let (store, mains, item) = populated();
        let mut extents = store.extents().clone();
        extents.menu_items.get_mut(item).unwrap().category = None;

        let err = check(&extents).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Relationship);

        let mut extents = store.extents().clone();
        extents.menu_categories.get_mut(mains).unwrap().items.clear();
        assert!(check(&extents).is_err());
    }

    #[test]
    fn test_dangling_handle_is_detected() {
        let (store, mains, _) = populated();
        let mut extents = store.extents().clone();
        extents.menu_categories.unregister(mains);
        assert!(matches!(
            check(&extents),
            Err(StoreError::MissingEntity { entity: "MenuCategory", .. })
        ));
    }

    #[test]
    fn test_rewound_handle_counter_is_detected() {
        let (store, _, _) = populated();
        let mut extents = store.extents().clone();
        extents.menu_items.next_id = 1;

        let err = check(&extents).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Relationship);
    }
}
