//! CLI command implementations

pub(crate) mod common;
pub(crate) mod create_migrations;
pub(crate) mod show_deps;
