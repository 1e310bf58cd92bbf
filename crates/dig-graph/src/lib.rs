//! dig-graph - Dependency closure and presentation for schemadig
//!
//! The builder walks a metadata provider outward from one or more seeds and
//! records every object the seeds need. The presenter turns the resulting
//! graph into a readable tree or a nested JSON document.

pub mod builder;
pub mod render;

pub use builder::GraphBuilder;
pub use render::{render, OutputFormat, RenderOptions};
