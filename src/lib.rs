pub mod error;
pub mod graph;
pub mod locator;
pub mod readers;
pub mod schema;
pub mod validation;

pub use error::{ConfigurationError, SchemaError};
