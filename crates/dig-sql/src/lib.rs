//! dig-sql - SQL layer for schemadig
//!
//! This crate wraps sqlparser-rs for extracting the relations a view reads,
//! and provides a lightweight scanner that finds object-creation statements
//! in arbitrary DDL text, including PL/SQL that no SQL parser accepts.

pub mod ddl_scan;
pub mod error;
pub mod extractor;
pub mod parser;

pub use ddl_scan::{scan_created_objects, strip_comments_and_literals};
pub use error::{SqlError, SqlResult};
pub use extractor::{extract_relations, extract_sequence_refs, RelationName};
pub use parser::SqlParser;
