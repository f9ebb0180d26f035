pub mod memory;

#[cfg(feature = "postgres")]
pub mod models;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod schema;

pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::DbStore;
