//! dig-db - Metadata access for schemadig
//!
//! This crate provides the `MetadataProvider` trait the graph builder and
//! migration writer consume, a file-backed `CatalogSnapshot` provider, and a
//! live `DuckDbProvider` that reads DuckDB's catalog functions.

pub mod catalog;
pub mod duckdb;
pub mod error;
pub mod traits;

pub use catalog::CatalogSnapshot;
pub use duckdb::DuckDbProvider;
pub use error::{DbError, DbResult};
pub use traits::{ForeignKeyRef, MetadataProvider};
