use crate::core::{EntityKind, Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{Client, MenuItem};
use crate::storage::Entity;
use log::debug;
use serde::{Deserialize, Serialize};

pub const MIN_DISCOUNT_RATE: f64 = 0.01;
pub const MAX_DISCOUNT_RATE: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiscountKind {
    Giftcard {
        value: f64,
    },
    Voucher {
        rate: f64,
        item: Id<MenuItem>,
    },
    /// A voucher topped up with the value of a giftcard.
    VoucherGiftcard {
        rate: f64,
        item: Id<MenuItem>,
        giftcard: Id<Discount>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub(crate) client: Option<Id<Client>>,
    pub(crate) variant: DiscountKind,
}

impl Discount {
    pub fn client(&self) -> Option<Id<Client>> {
        self.client
    }

    pub fn variant(&self) -> &DiscountKind {
        &self.variant
    }

    pub fn variant_kind(&self) -> EntityKind {
        match self.variant {
            DiscountKind::Giftcard { .. } => EntityKind::Giftcard,
            DiscountKind::Voucher { .. } => EntityKind::Voucher,
            DiscountKind::VoucherGiftcard { .. } => EntityKind::VoucherGiftcard,
        }
    }

    /// The item a voucher applies to.
    pub fn menu_item(&self) -> Option<Id<MenuItem>> {
        match self.variant {
            DiscountKind::Voucher { item, .. } | DiscountKind::VoucherGiftcard { item, .. } => {
                Some(item)
            }
            DiscountKind::Giftcard { .. } => None,
        }
    }

    pub fn giftcard(&self) -> Option<Id<Discount>> {
        match self.variant {
            DiscountKind::VoucherGiftcard { giftcard, .. } => Some(giftcard),
            _ => None,
        }
    }
}

impl Store {
    pub fn create_giftcard(&mut self, value: f64) -> Result<Id<Discount>> {
        if !value.is_finite() || value <= 0.0 {
            return Err(StoreError::validation("Giftcard value must be greater than 0"));
        }
        Ok(self.register_discount(DiscountKind::Giftcard { value }))
    }

    pub fn create_voucher(&mut self, rate: f64, item: Id<MenuItem>) -> Result<Id<Discount>> {
        validate_rate(rate)?;
        self.ensure_live(item)?;
        Ok(self.register_discount(DiscountKind::Voucher { rate, item }))
    }

    pub fn create_voucher_giftcard(
        &mut self,
        rate: f64,
        item: Id<MenuItem>,
        giftcard: Id<Discount>,
    ) -> Result<Id<Discount>> {
        validate_rate(rate)?;
        self.ensure_live(item)?;
        if self.require(giftcard)?.variant_kind() != EntityKind::Giftcard {
            return Err(StoreError::relationship(format!(
                "discount {} is not a giftcard",
                giftcard
            )));
        }
        Ok(self.register_discount(DiscountKind::VoucherGiftcard {
            rate,
            item,
            giftcard,
        }))
    }

    pub fn discount_add_client(&mut self, discount: Id<Discount>, client: Id<Client>) -> Result<()> {
        self.ensure_live(client)?;
        let entry = self.require_mut(discount)?;
        match entry.client {
            Some(owner) if owner == client => Ok(()),
            Some(owner) => Err(StoreError::relationship(format!(
                "discount {} already belongs to client {}",
                discount, owner
            ))),
            None => {
                entry.client = Some(client);
                self.client_add_discount(client, discount)
            }
        }
    }

    pub fn discount_remove_client(
        &mut self,
        discount: Id<Discount>,
        client: Id<Client>,
    ) -> Result<()> {
        let entry = self.require_mut(discount)?;
        if entry.client != Some(client) {
            return Ok(());
        }
        entry.client = None;
        self.client_remove_discount(client, discount)
    }

    /// Money off granted by the discount.
    ///
    /// A voucher-giftcard never grants more than the price of its item.
    pub fn total_amount(&self, discount: Id<Discount>) -> Result<f64> {
        match self.require(discount)?.variant {
            DiscountKind::Giftcard { value } => Ok(value),
            DiscountKind::Voucher { rate, item } => Ok(self.require(item)?.price * rate),
            DiscountKind::VoucherGiftcard {
                rate,
                item,
                giftcard,
            } => {
                let price = self.require(item)?.price;
                let topped_up = price * rate + self.total_amount(giftcard)?;
                Ok(topped_up.min(price))
            }
        }
    }

    pub fn is_applicable(&self, discount: Id<Discount>) -> Result<bool> {
        let entry = self.require(discount)?;
        if entry.client.is_none() {
            return Ok(false);
        }
        let applicable = match entry.variant {
            DiscountKind::Giftcard { value } => value > 0.0,
            DiscountKind::Voucher { item, .. } => self.contains(item),
            DiscountKind::VoucherGiftcard { item, giftcard, .. } => {
                self.contains(item) && self.is_applicable(giftcard)?
            }
        };
        Ok(applicable)
    }

    pub(crate) fn find_discount(&self, predicate: impl Fn(&Discount) -> bool) -> Option<Id<Discount>> {
        self.all::<Discount>()
            .find(|(_, discount)| predicate(discount))
            .map(|(id, _)| id)
    }

    fn register_discount(&mut self, variant: DiscountKind) -> Id<Discount> {
        let discount = Discount {
            client: None,
            variant,
        };
        let kind = discount.kind();
        let id = self.extent_mut::<Discount>().register(discount);
        debug!("Registered {} {}", kind, id);
        id
    }
}

fn validate_rate(rate: f64) -> Result<()> {
    if !(MIN_DISCOUNT_RATE..=MAX_DISCOUNT_RATE).contains(&rate) {
        return Err(StoreError::validation(
            "Discount rate must be between 1% and 99%",
        ));
    }
    Ok(())
}

impl Cascade for Discount {
    fn cascade_delete(store: &mut Store, id: Id<Discount>) -> Result<()> {
        if let Some(client) = store.require(id)?.client {
            store.client_remove_discount(client, id)?;
        }
        while let Some(topped_up) = store.find_discount(|discount| discount.giftcard() == Some(id)) {
            store.delete(topped_up)?;
        }
        store.extent_mut::<Discount>().unregister(id);
        Ok(())
    }
}
