//! Names and identities checked against the live extents

use chrono::NaiveDate;
use restmax::{
    Address, Employee, EntityKind, ErrorKind, MenuCategory, Restaurant, RestaurantClass, Store,
};

fn debut() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 12, 1).unwrap()
}

#[test]
fn test_category_names_differing_in_case_are_rejected() {
    let mut store = Store::default();
    let mains = store.create_menu_category("mains").unwrap();

    let err = store.create_menu_category("Mains").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.all::<MenuCategory>().count(), 1);
    assert_eq!(store.find_by_key::<MenuCategory>("MAINS"), Some(mains));
}

#[test]
fn test_restaurant_names_differing_in_whitespace_are_rejected() {
    let mut store = Store::default();
    let address = Address::new("Polna", "12", "Warsaw", "67-890").unwrap();
    store
        .create_restaurant("Polna Bistro", address.clone(), [RestaurantClass::Delivery])
        .unwrap();

    let err = store
        .create_restaurant(" POLNA BISTRO  ", address, [RestaurantClass::Delivery])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.all::<Restaurant>().count(), 1);
}

#[test]
fn test_item_names_are_unique_across_item_kinds() {
    let mut store = Store::default();
    let far = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
    store.create_fixed_item("frIes", 9.0, debut(), false).unwrap();

    assert!(store.create_fixed_item("Fries", 8.0, debut(), false).is_err());
    assert!(store.create_seasonal_item("FRIES ", 8.0, debut(), far, 2).is_err());
    assert_eq!(store.count(EntityKind::MenuItemFixed), 1);
    assert_eq!(store.count(EntityKind::MenuItemSeasonal), 0);
}

#[test]
fn test_pesel_is_unique() {
    let mut store = Store::default();
    store
        .create_employee("66012395176", "Ola", "Mazur", "ola@restmax.pl")
        .unwrap();
    let err = store
        .create_employee("66012395176", "Ela", "Mazur", "ela@restmax.pl")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.all::<Employee>().count(), 1);
}

#[test]
fn test_name_is_free_again_after_delete() {
    let mut store = Store::default();
    let soup = store.create_menu_category("Soup").unwrap();
    store.delete(soup).unwrap();

    let again = store.create_menu_category("SOUP").unwrap();
    assert_ne!(soup, again);
    assert_eq!(store.get(again).unwrap().name(), "soup");
}

#[test]
fn test_rejected_construction_registers_nothing() {
    let mut store = Store::default();
    assert!(store.create_menu_category("   ").is_err());
    assert!(store.create_fixed_item("", 1.0, debut(), false).is_err());
    assert!(store
        .create_employee("12345678901", "Jan", "Kowalski", "jan@restmax.pl")
        .is_err());
    assert!(store
        .create_client("jan", "J", "Kowalski", "jan@example.com")
        .is_err());
    assert!(store.is_empty());
}
