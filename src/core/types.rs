use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete entity kinds, one registry slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Restaurant,
    MenuCategory,
    MenuItemSeasonal,
    MenuItemFixed,
    Employee,
    Client,
    Contract,
    Review,
    Giftcard,
    Voucher,
    VoucherGiftcard,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Restaurant,
        EntityKind::MenuCategory,
        EntityKind::MenuItemSeasonal,
        EntityKind::MenuItemFixed,
        EntityKind::Employee,
        EntityKind::Client,
        EntityKind::Contract,
        EntityKind::Review,
        EntityKind::Giftcard,
        EntityKind::Voucher,
        EntityKind::VoucherGiftcard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Restaurant => "Restaurant",
            EntityKind::MenuCategory => "MenuCategory",
            EntityKind::MenuItemSeasonal => "MenuItemSeasonal",
            EntityKind::MenuItemFixed => "MenuItemFixed",
            EntityKind::Employee => "Employee",
            EntityKind::Client => "Client",
            EntityKind::Contract => "Contract",
            EntityKind::Review => "Review",
            EntityKind::Giftcard => "Giftcard",
            EntityKind::Voucher => "Voucher",
            EntityKind::VoucherGiftcard => "VoucherGiftcard",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Capabilities a restaurant can be classified with. A restaurant carries a
/// non-empty set of them; each gates one optional attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RestaurantClass {
    DriveThru,
    Delivery,
    OwnBuilding,
}

impl fmt::Display for RestaurantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestaurantClass::DriveThru => write!(f, "DriveThru"),
            RestaurantClass::Delivery => write!(f, "Delivery"),
            RestaurantClass::OwnBuilding => write!(f, "OwnBuilding"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractType {
    Employment,
    PartTime,
    Contractor,
    Internship,
    Volunteer,
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractType::Employment => "EMPLOYMENT",
            ContractType::PartTime => "PART_TIME",
            ContractType::Contractor => "CONTRACTOR",
            ContractType::Internship => "INTERNSHIP",
            ContractType::Volunteer => "VOLUNTEER",
        };
        f.write_str(label)
    }
}
