pub mod error;
pub mod id;
pub mod types;
pub mod validation;

pub use error::{ErrorKind, Result, StoreError};
pub use id::Id;
pub use types::{ContractType, EntityKind, RestaurantClass};
