//! Deserializer collaborators and the strategy that picks one per file

mod json;
mod legacy;
mod xml;

pub use json::parse_json_document;
pub use legacy::XmlLegacyDeserializer;
pub use xml::parse_xml_document;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{FormatDetector, SchemaDocument, SchemaEncoding, SchemaFormat};

/// Failure reported by the legacy deserialization context
#[derive(Error, Debug)]
pub enum DeserializeError {
    #[error("Referenced schema '{reference}' of schema '{schema}' was not found")]
    ReferencedSchemaNotFound { schema: String, reference: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Legacy (ECXML 2.0 / 3.1) deserializer.
///
/// Implementations may hold a single shared parsing context whose search
/// paths are replaced on every call, hence `&mut self`.
pub trait LegacyDeserializer {
    fn deserialize(
        &mut self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> Result<SchemaDocument, DeserializeError>;
}

/// Pure in-process parser for current-format files
pub trait DocumentParser {
    fn parse(&self, content: &str, encoding: SchemaEncoding) -> anyhow::Result<SchemaDocument>;
}

/// Default current-format parser: ECXML 3.2 and EC JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinParser;

impl DocumentParser for BuiltinParser {
    fn parse(&self, content: &str, encoding: SchemaEncoding) -> anyhow::Result<SchemaDocument> {
        match encoding {
            SchemaEncoding::Xml => parse_xml_document(content),
            SchemaEncoding::Json => parse_json_document(content),
        }
    }
}

/// Routes each file to the legacy or current reader based on its detected format
pub struct SchemaReaders {
    legacy: Box<dyn LegacyDeserializer>,
    parser: Box<dyn DocumentParser>,
}

impl Default for SchemaReaders {
    fn default() -> Self {
        Self::new(Box::new(XmlLegacyDeserializer::new()), Box::new(BuiltinParser))
    }
}

impl SchemaReaders {
    pub fn new(legacy: Box<dyn LegacyDeserializer>, parser: Box<dyn DocumentParser>) -> Self {
        Self { legacy, parser }
    }

    /// Read and parse one schema file.
    ///
    /// A "referenced schema not found" report from the legacy context becomes
    /// `UnresolvedReference`; every other collaborator error passes through.
    pub fn read(
        &mut self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> Result<(SchemaDocument, SchemaFormat), SchemaError> {
        let encoding = SchemaEncoding::from_path(path)
            .ok_or_else(|| {
                SchemaError::malformed(path, "not an .ecschema.xml or .ecschema.json file")
            })?;
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        let format = FormatDetector::detect(&content, encoding);

        debug!("Reading {} as {format}", path.display());

        let document = if format.is_legacy() {
            self.legacy
                .deserialize(path, search_paths)
                .map_err(|e| match e {
                    DeserializeError::ReferencedSchemaNotFound { schema, reference } => {
                        SchemaError::UnresolvedReference { schema, reference }
                    }
                    DeserializeError::Other(other) => unwrap_schema_error(other),
                })?
        } else {
            self.parser
                .parse(&content, encoding)
                .map_err(unwrap_schema_error)?
        };

        Ok((document, format))
    }
}

/// Recover our own error type when a collaborator merely forwarded it
fn unwrap_schema_error(error: anyhow::Error) -> SchemaError {
    match error.downcast::<SchemaError>() {
        Ok(schema_error) => schema_error,
        Err(other) => SchemaError::Collaborator(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct FailingLegacy(fn() -> DeserializeError);

    impl LegacyDeserializer for FailingLegacy {
        fn deserialize(
            &mut self,
            _path: &Path,
            _search_paths: &[PathBuf],
        ) -> Result<SchemaDocument, DeserializeError> {
            Err((self.0)())
        }
    }

    fn legacy_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("Old.01.00.ecschema.xml");
        fs::write(
            &path,
            r#"<ECSchema schemaName="Old" version="01.00" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.2.0"/>"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn referenced_schema_not_found_is_rewrapped() {
        let dir = TempDir::new().unwrap();
        let path = legacy_file(&dir);
        let mut readers = SchemaReaders::new(
            Box::new(FailingLegacy(|| DeserializeError::ReferencedSchemaNotFound {
                schema: "Old".into(),
                reference: "Gone".into(),
            })),
            Box::new(BuiltinParser),
        );

        match readers.read(&path, &[]) {
            Err(SchemaError::UnresolvedReference { schema, reference }) => {
                assert_eq!((schema.as_str(), reference.as_str()), ("Old", "Gone"));
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
    }

    #[test]
    fn other_collaborator_errors_pass_through_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = legacy_file(&dir);
        let mut readers = SchemaReaders::new(
            Box::new(FailingLegacy(|| {
                DeserializeError::Other(anyhow::anyhow!("native context crashed"))
            })),
            Box::new(BuiltinParser),
        );

        let err = readers.read(&path, &[]).unwrap_err();
        assert!(matches!(err, SchemaError::Collaborator(_)));
        assert_eq!(err.to_string(), "native context crashed");
    }

    #[test]
    fn current_files_never_reach_the_legacy_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("New.01.00.00.ecschema.json");
        fs::write(&path, r#"{"name": "New", "version": "01.00.00", "alias": "new"}"#).unwrap();

        let mut readers = SchemaReaders::new(
            Box::new(FailingLegacy(|| {
                DeserializeError::Other(anyhow::anyhow!("should not be called"))
            })),
            Box::new(BuiltinParser),
        );
        let (document, format) = readers.read(&path, &[]).unwrap();
        assert_eq!(document.name(), "New");
        assert_eq!(format, SchemaFormat::Current);
    }

    #[test]
    fn version_errors_keep_their_type_through_the_parser() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Bad.ecschema.json");
        fs::write(&path, r#"{"name": "Bad", "version": "1"}"#).unwrap();

        let mut readers = SchemaReaders::default();
        assert!(matches!(
            readers.read(&path, &[]),
            Err(SchemaError::InvalidVersionString { .. })
        ));
    }
}
