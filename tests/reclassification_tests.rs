//! Seasonal items turning into fixed items

use chrono::{Days, NaiveDate};
use restmax::{EntityKind, ErrorKind, MenuItem, MenuItemKind, Store};

fn debut() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 12, 1).unwrap()
}

fn season_end() -> NaiveDate {
    restmax::core::validation::today()
        .checked_add_days(Days::new(60))
        .unwrap()
}

#[test]
fn test_reclassified_item_replaces_seasonal_one() {
    let mut store = Store::default();
    let mains = store.create_menu_category("mains").unwrap();
    let burger = store.create_fixed_item("Burger", 5.0, debut(), false).unwrap();
    let drwal = store
        .create_seasonal_item("Drwal", 26.0, debut(), season_end(), 3)
        .unwrap();
    let wrap = store.create_fixed_item("Wrap", 12.0, debut(), false).unwrap();
    for item in [burger, drwal, wrap] {
        store.category_add_item(mains, item).unwrap();
    }

    let fixed = store.reclassify(drwal, false).unwrap();

    assert!(!store.contains(drwal));
    assert_eq!(store.count(EntityKind::MenuItemSeasonal), 0);
    assert_eq!(store.count(EntityKind::MenuItemFixed), 3);
    assert_eq!(store.get(mains).unwrap().items(), &[burger, fixed, wrap]);

    let item = store.get(fixed).unwrap();
    assert_eq!(item.name(), "Drwal");
    assert_eq!(item.price(), 26.0);
    assert_eq!(item.first_debut(), debut());
    assert_eq!(
        item.variant(),
        &MenuItemKind::Fixed {
            popularity_score: 5,
            signature_dish: false
        }
    );
    assert_eq!(store.find_by_key::<MenuItem>("drwal"), Some(fixed));
    store.check_consistency().unwrap();
}

#[test]
fn test_uncategorized_item_stays_uncategorized() {
    let mut store = Store::default();
    let princess = store
        .create_seasonal_item("McPrincess", 31.0, debut(), season_end(), 1)
        .unwrap();
    let fixed = store.reclassify(princess, true).unwrap();

    let item = store.get(fixed).unwrap();
    assert_eq!(item.category(), None);
    assert!(item.is_signature_dish());
}

#[test]
fn test_vouchers_follow_the_reclassified_item() {
    let mut store = Store::default();
    let drwal = store
        .create_seasonal_item("Drwal", 20.0, debut(), season_end(), 3)
        .unwrap();
    let card = store.create_giftcard(5.0).unwrap();
    let voucher = store.create_voucher(0.5, drwal).unwrap();
    let combo = store.create_voucher_giftcard(0.25, drwal, card).unwrap();

    let fixed = store.reclassify(drwal, false).unwrap();

    assert!(store.contains(voucher));
    assert!(store.contains(combo));
    assert_eq!(store.get(voucher).unwrap().menu_item(), Some(fixed));
    assert_eq!(store.get(combo).unwrap().menu_item(), Some(fixed));
    assert_eq!(store.total_amount(voucher).unwrap(), 10.0);
    assert_eq!(store.total_amount(combo).unwrap(), 10.0);
    store.check_consistency().unwrap();
}

#[test]
fn test_only_seasonal_items_can_be_reclassified() {
    let mut store = Store::default();
    let fixed = store.create_fixed_item("BicMac", 20.0, debut(), true).unwrap();
    let err = store.reclassify(fixed, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Relationship);
    assert_eq!(store.count(EntityKind::MenuItemFixed), 1);
}

#[test]
fn test_reclassifying_twice_fails_on_the_retired_handle() {
    let mut store = Store::default();
    let drwal = store
        .create_seasonal_item("Drwal", 26.0, debut(), season_end(), 3)
        .unwrap();
    store.reclassify(drwal, false).unwrap();
    let err = store.reclassify(drwal, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Relationship);
    assert_eq!(store.all::<MenuItem>().count(), 1);
}
