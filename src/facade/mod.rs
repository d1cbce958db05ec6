pub mod config;
pub(crate) mod consistency;
pub mod store;

pub use config::StoreConfig;
pub use store::{Cascade, Store};
