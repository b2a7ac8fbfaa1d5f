pub mod connection;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use repository::PgStore;
pub use store::{Store, StoreError};
