//! Resolved schema reference graphs

mod resolver;
mod schema_graph;

pub use resolver::{REFERENCE_MATCH_POLICY, ReferenceResolver};
pub use schema_graph::{SchemaGraph, SchemaId, SchemaNode, SchemaReference};
