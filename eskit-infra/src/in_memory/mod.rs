//! 内存 CRUD 引擎
//!
mod database;
mod repository;

pub use database::{
    INITIAL_REVISION, InMemoryDatabase, InMemoryDatabaseBuilder, RowChange, StoredRow,
};
pub use repository::InMemoryCrudRepository;
