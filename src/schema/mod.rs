//! Schema identity, match policies, formats, and the parsed document model

pub mod document;
pub mod format;
pub mod match_policy;
pub mod standard;
pub mod version;

pub use document::{ClassDef, ClassKind, PropertyDef, QualifiedName, ReferenceSpec, SchemaDocument};
pub use format::{FormatDetector, SchemaEncoding, SchemaFormat};
pub use match_policy::MatchPolicy;
pub use standard::{STANDARD_SCHEMAS, is_standard_schema};
pub use version::{LegacyVersion, VersionKey, parse_legacy};
