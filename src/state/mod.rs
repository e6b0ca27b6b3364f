pub mod factory;
pub mod postgres_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use postgres_store::PostgresStore;
pub use store::*;
