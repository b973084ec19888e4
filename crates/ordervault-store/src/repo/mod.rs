//! Repository layer mapping order aggregates to the four order tables

pub mod hydration;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
