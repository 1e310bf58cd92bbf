//! dig-migrate - Migration planning and file generation for schemadig
//!
//! The planner orders a dependency graph into category groups that can be
//! created front to back. The writer turns the part of a plan that a
//! migration folder does not define yet into versioned SQL files.

pub mod error;
pub mod index;
pub mod planner;
pub mod version;
pub mod writer;

pub use error::{MigrateError, MigrateResult};
pub use index::{MigrationFile, MigrationFileIndex};
pub use planner::plan;
pub use version::MigrationVersion;
pub use writer::{sanitize_migration_name, MigrationWriter, WriteOutcome};
