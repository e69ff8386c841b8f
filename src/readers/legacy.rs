//! Built-in stand-in for the native legacy deserialization context

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{DeserializeError, LegacyDeserializer, xml::parse_xml_document};
use crate::locator::{FileSchemaLocator, SchemaLocator};
use crate::schema::{MatchPolicy, SchemaDocument};

/// Reads ECXML 2.0 / 3.1 files in process.
///
/// Like the native context it replaces, it owns a search-path list that is
/// reset on every call, and it refuses documents whose references cannot be
/// found under those paths.
#[derive(Debug, Default)]
pub struct XmlLegacyDeserializer {
    search_paths: Vec<PathBuf>,
}

impl XmlLegacyDeserializer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LegacyDeserializer for XmlLegacyDeserializer {
    fn deserialize(
        &mut self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> Result<SchemaDocument, DeserializeError> {
        self.search_paths = search_paths.to_vec();
        if let Some(parent) = path.parent() {
            self.search_paths.push(parent.to_path_buf());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document = parse_xml_document(&content)
            .with_context(|| format!("Failed to deserialize {}", path.display()))?;

        let mut locator = FileSchemaLocator::with_search_paths(self.search_paths.iter().cloned());
        for reference in &document.references {
            let found = match &reference.version {
                Some(key) => locator
                    .locate(key, MatchPolicy::LatestCompatibleWrite)
                    .map_err(anyhow::Error::from)?,
                None => locator
                    .locate_latest(&reference.name)
                    .map_err(anyhow::Error::from)?,
            };

            if found.is_none() {
                debug!(
                    "Legacy context could not find '{}' referenced by '{}'",
                    reference.name,
                    document.name()
                );
                return Err(DeserializeError::ReferencedSchemaNotFound {
                    schema: document.name().to_string(),
                    reference: reference.name.clone(),
                });
            }
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEGACY: &str = r#"<ECSchema schemaName="Old" nameSpacePrefix="old" version="01.00" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.2.0">
    <ECSchemaReference name="Base" version="01.00" prefix="base"/>
</ECSchema>"#;

    #[test]
    fn missing_reference_is_reported_as_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Old.01.00.ecschema.xml");
        fs::write(&path, LEGACY).unwrap();

        let mut deserializer = XmlLegacyDeserializer::new();
        match deserializer.deserialize(&path, &[]) {
            Err(DeserializeError::ReferencedSchemaNotFound { schema, reference }) => {
                assert_eq!(schema, "Old");
                assert_eq!(reference, "Base");
            }
            other => panic!("expected ReferencedSchemaNotFound, got {other:?}"),
        }
    }

    #[test]
    fn sibling_reference_is_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Old.01.00.ecschema.xml");
        fs::write(&path, LEGACY).unwrap();
        fs::write(
            dir.path().join("Base.01.00.ecschema.xml"),
            r#"<ECSchema schemaName="Base" nameSpacePrefix="base" version="01.00" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.2.0"/>"#,
        )
        .unwrap();

        let mut deserializer = XmlLegacyDeserializer::new();
        let document = deserializer.deserialize(&path, &[]).unwrap();
        assert_eq!(document.name(), "Old");
    }
}
