pub mod migrate;
pub mod postgres;
pub mod store;
pub mod testutil;

pub use postgres::PgNewsStore;
pub use store::NewsStore;
