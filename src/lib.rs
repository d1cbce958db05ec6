// ============================================================================
// RestMax Extent Library
// ============================================================================

//! In-memory registry of restaurant domain entities.
//!
//! Every entity lives in a typed extent owned by a [`Store`]. Associations are
//! stored on both ends and kept symmetric by paired add/remove mutators,
//! deletions cascade per entity kind, and the whole registry is persisted as
//! one snapshot file.
//!
//! ```
//! use restmax::{Address, RestaurantClass, Store};
//!
//! # fn main() -> restmax::Result<()> {
//! let mut store = Store::default();
//! let address = Address::new("Koszykowa", "23", "Warsaw", "12-345")?;
//! let bistro = store.create_restaurant("Koszykowa Bistro", address, [RestaurantClass::Delivery])?;
//! let mains = store.create_menu_category("Mains")?;
//!
//! store.restaurant_add_category(bistro, mains)?;
//! assert_eq!(store.category_by_name(bistro, "MAINS")?, Some(mains));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod facade;
pub mod model;
pub mod storage;

// Re-export main types for convenience
pub use core::{ContractType, EntityKind, ErrorKind, Id, RestaurantClass, Result, StoreError};
pub use facade::{Cascade, Store, StoreConfig};
pub use model::{
    Address, Client, Contract, Discount, DiscountKind, Employee, MenuCategory, MenuItem,
    MenuItemKind, Person, PersonInfo, Restaurant, Review,
};
pub use storage::{Entity, Extents, Keyed};
