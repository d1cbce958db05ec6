pub mod address;
pub mod client;
pub mod contract;
pub mod discount;
pub mod employee;
pub mod menu_category;
pub mod menu_item;
pub mod person;
pub mod restaurant;
pub mod review;

pub use address::Address;
pub use client::Client;
pub use contract::Contract;
pub use discount::{Discount, DiscountKind};
pub use employee::Employee;
pub use menu_category::MenuCategory;
pub use menu_item::{MenuItem, MenuItemKind};
pub use person::{Person, PersonInfo};
pub use restaurant::Restaurant;
pub use review::Review;
