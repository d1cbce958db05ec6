use crate::core::validation::{require_non_empty, today};
use crate::core::{EntityKind, Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{DiscountKind, MenuCategory};
use crate::storage::{Entity, Keyed};
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POPULARITY_SCORE: u8 = 5;
pub const MIN_POPULARITY_SCORE: u8 = 1;
pub const MAX_POPULARITY_SCORE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MenuItemKind {
    Seasonal {
        end_date: NaiveDate,
        max_order_quantity: u32,
    },
    Fixed {
        popularity_score: u8,
        signature_dish: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub(crate) name: String,
    pub(crate) price: f64,
    pub(crate) first_debut: NaiveDate,
    pub(crate) category: Option<Id<MenuCategory>>,
    pub(crate) variant: MenuItemKind,
}

impl MenuItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn first_debut(&self) -> NaiveDate {
        self.first_debut
    }

    pub fn category(&self) -> Option<Id<MenuCategory>> {
        self.category
    }

    pub fn variant(&self) -> &MenuItemKind {
        &self.variant
    }

    pub fn variant_kind(&self) -> EntityKind {
        match self.variant {
            MenuItemKind::Seasonal { .. } => EntityKind::MenuItemSeasonal,
            MenuItemKind::Fixed { .. } => EntityKind::MenuItemFixed,
        }
    }

    pub fn is_seasonal(&self) -> bool {
        matches!(self.variant, MenuItemKind::Seasonal { .. })
    }

    pub fn popularity_score(&self) -> Option<u8> {
        match self.variant {
            MenuItemKind::Fixed { popularity_score, .. } => Some(popularity_score),
            MenuItemKind::Seasonal { .. } => None,
        }
    }

    pub fn is_signature_dish(&self) -> bool {
        matches!(self.variant, MenuItemKind::Fixed { signature_dish: true, .. })
    }
}

impl Keyed for MenuItem {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Store {
    pub fn create_seasonal_item(
        &mut self,
        name: &str,
        price: f64,
        first_debut: NaiveDate,
        end_date: NaiveDate,
        max_order_quantity: u32,
    ) -> Result<Id<MenuItem>> {
        self.validate_item(name, price, first_debut, None)
            .and_then(|_| {
                if end_date < today() {
                    return Err(StoreError::validation("End date cannot be in the past"));
                }
                if max_order_quantity == 0 {
                    return Err(StoreError::validation(
                        "Max order quantity must be at least 1",
                    ));
                }
                Ok(())
            })
            .inspect_err(|err| debug!("Rejected seasonal item '{}': {}", name, err))?;

        Ok(self.register_item(
            name,
            price,
            first_debut,
            MenuItemKind::Seasonal {
                end_date,
                max_order_quantity,
            },
        ))
    }

    pub fn create_fixed_item(
        &mut self,
        name: &str,
        price: f64,
        first_debut: NaiveDate,
        signature_dish: bool,
    ) -> Result<Id<MenuItem>> {
        self.validate_item(name, price, first_debut, None)
            .inspect_err(|err| debug!("Rejected fixed item '{}': {}", name, err))?;

        Ok(self.register_item(
            name,
            price,
            first_debut,
            MenuItemKind::Fixed {
                popularity_score: DEFAULT_POPULARITY_SCORE,
                signature_dish,
            },
        ))
    }

    pub fn set_popularity_score(&mut self, item: Id<MenuItem>, score: u8) -> Result<()> {
        if !(MIN_POPULARITY_SCORE..=MAX_POPULARITY_SCORE).contains(&score) {
            return Err(StoreError::validation(format!(
                "Popularity score must be between {} and {}",
                MIN_POPULARITY_SCORE, MAX_POPULARITY_SCORE
            )));
        }
        match &mut self.require_mut(item)?.variant {
            MenuItemKind::Fixed { popularity_score, .. } => {
                *popularity_score = score;
                Ok(())
            }
            MenuItemKind::Seasonal { .. } => Err(not_fixed(item)),
        }
    }

    pub fn set_signature_dish(&mut self, item: Id<MenuItem>, signature: bool) -> Result<()> {
        match &mut self.require_mut(item)?.variant {
            MenuItemKind::Fixed { signature_dish, .. } => {
                *signature_dish = signature;
                Ok(())
            }
            MenuItemKind::Seasonal { .. } => Err(not_fixed(item)),
        }
    }

    pub fn item_add_category(&mut self, item: Id<MenuItem>, category: Id<MenuCategory>) -> Result<()> {
        self.ensure_live(category)?;
        let entry = self.require_mut(item)?;
        match entry.category {
            Some(current) if current == category => Ok(()),
            Some(current) => Err(StoreError::relationship(format!(
                "menu item {} already belongs to category {}",
                item, current
            ))),
            None => {
                entry.category = Some(category);
                self.category_add_item(category, item)
            }
        }
    }

    pub fn item_remove_category(&mut self, item: Id<MenuItem>) -> Result<()> {
        match self.require_mut(item)?.category.take() {
            Some(category) => self.category_remove_item(category, item),
            None => Ok(()),
        }
    }

    /// Turns a seasonal item into a fixed one.
    ///
    /// The fixed item takes over the name, price, debut date, category shelf
    /// and every voucher of the seasonal item, which is then deleted. Nothing
    /// is mutated unless the new item validates.
    pub fn reclassify(&mut self, seasonal: Id<MenuItem>, signature_dish: bool) -> Result<Id<MenuItem>> {
        let source = self.require(seasonal)?;
        if !source.is_seasonal() {
            return Err(StoreError::relationship(format!(
                "menu item {} is not seasonal",
                seasonal
            )));
        }
        let name = source.name.clone();
        let (price, first_debut, category) = (source.price, source.first_debut, source.category);

        // The seasonal item still holds the name until it is retired below.
        self.validate_item(&name, price, first_debut, Some(seasonal))?;

        let fixed = self.register_item(
            &name,
            price,
            first_debut,
            MenuItemKind::Fixed {
                popularity_score: DEFAULT_POPULARITY_SCORE,
                signature_dish,
            },
        );

        if let Some(category) = category {
            self.category_add_item(category, fixed)?;
            self.category_remove_item(category, seasonal)?;
        }

        for (_, discount) in self.extents.discounts.iter_mut() {
            match &mut discount.variant {
                DiscountKind::Voucher { item, .. } | DiscountKind::VoucherGiftcard { item, .. }
                    if *item == seasonal =>
                {
                    *item = fixed;
                }
                _ => {}
            }
        }

        self.delete(seasonal)?;
        info!("Reclassified '{}' from {} to {}", name, seasonal, fixed);
        Ok(fixed)
    }

    pub fn seasonal_items(&self) -> Vec<Id<MenuItem>> {
        self.items_where(|item| item.is_seasonal())
    }

    pub fn fixed_items(&self) -> Vec<Id<MenuItem>> {
        self.items_where(|item| !item.is_seasonal())
    }

    /// Items priced at or below `max_price`, seasonal ones first.
    pub fn find_items_below_price(&self, max_price: f64) -> Vec<Id<MenuItem>> {
        self.find_items_by_price(f64::NEG_INFINITY, max_price)
    }

    /// Items priced within `[min_price, max_price]`, seasonal ones first.
    pub fn find_items_by_price(&self, min_price: f64, max_price: f64) -> Vec<Id<MenuItem>> {
        let in_range = |item: &MenuItem| item.price >= min_price && item.price <= max_price;
        let mut found = self.items_where(|item| item.is_seasonal() && in_range(item));
        found.extend(self.items_where(|item| !item.is_seasonal() && in_range(item)));
        found
    }

    fn items_where(&self, predicate: impl Fn(&MenuItem) -> bool) -> Vec<Id<MenuItem>> {
        self.all::<MenuItem>()
            .filter(|(_, item)| predicate(item))
            .map(|(id, _)| id)
            .collect()
    }

    fn validate_item(
        &self,
        name: &str,
        price: f64,
        first_debut: NaiveDate,
        exclude: Option<Id<MenuItem>>,
    ) -> Result<()> {
        require_non_empty("Menu item name", name)?;
        self.ensure_unique::<MenuItem>("Menu item name", name, exclude)?;
        if !price.is_finite() || price < 0.0 {
            return Err(StoreError::validation("Price cannot be negative"));
        }
        if first_debut > today() {
            return Err(StoreError::validation("First debut cannot be in the future"));
        }
        Ok(())
    }

    fn register_item(
        &mut self,
        name: &str,
        price: f64,
        first_debut: NaiveDate,
        variant: MenuItemKind,
    ) -> Id<MenuItem> {
        let item = MenuItem {
            name: name.trim().to_string(),
            price,
            first_debut,
            category: None,
            variant,
        };
        let kind = item.kind();
        let id = self.extent_mut::<MenuItem>().register(item);
        debug!("Registered {} {} '{}'", kind, id, name.trim());
        id
    }
}

fn not_fixed(item: Id<MenuItem>) -> StoreError {
    StoreError::relationship(format!("menu item {} is not a fixed item", item))
}

impl Cascade for MenuItem {
    fn cascade_delete(store: &mut Store, id: Id<MenuItem>) -> Result<()> {
        store.item_remove_category(id)?;
        while let Some(voucher) = store.find_discount(|discount| discount.menu_item() == Some(id)) {
            store.delete(voucher)?;
        }
        store.extent_mut::<MenuItem>().unregister(id);
        Ok(())
    }
}
