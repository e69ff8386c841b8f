//! Extraction of a schema's identity from the top-level declaration

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

use crate::error::SchemaError;
use crate::schema::{FormatDetector, SchemaEncoding, SchemaFormat, VersionKey, parse_legacy};

/// Name and version attributes as written in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    pub name: Option<String>,
    pub version: Option<String>,
    pub format: SchemaFormat,
}

/// Read the name/version declaration without interpreting the version
pub fn read_declaration(
    path: &Path,
    content: &str,
    encoding: SchemaEncoding,
) -> Result<RawDeclaration, SchemaError> {
    let format = FormatDetector::detect(content, encoding);

    let (name, version) = match encoding {
        SchemaEncoding::Xml => xml_declaration(path, content)?,
        SchemaEncoding::Json => json_declaration(path, content)?,
    };

    Ok(RawDeclaration {
        name,
        version,
        format,
    })
}

/// Extract the schema key from file content.
///
/// Legacy V2 versions always go through the legacy translator; other
/// formats parse the three-part form.
pub fn get_schema_key(
    path: &Path,
    content: &str,
    encoding: SchemaEncoding,
) -> Result<VersionKey, SchemaError> {
    let declaration = read_declaration(path, content, encoding)?;

    let name = declaration
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| SchemaError::malformed(path, "the schema name attribute is missing"))?;
    let version = declaration
        .version
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SchemaError::malformed(path, "the version attribute is missing"))?;

    version_key(&name, &version, declaration.format)
}

/// Interpret a version string the way the given format writes it
pub fn version_key(
    name: &str,
    version: &str,
    format: SchemaFormat,
) -> Result<VersionKey, SchemaError> {
    if format == SchemaFormat::LegacyV2 {
        parse_legacy(version)?.into_key(name, version)
    } else {
        VersionKey::parse(name, version)
    }
}

fn xml_declaration(
    path: &Path,
    content: &str,
) -> Result<(Option<String>, Option<String>), SchemaError> {
    let mut reader = Reader::from_str(content);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"ECSchema" {
                    return Err(SchemaError::malformed(
                        path,
                        format!(
                            "expected a top-level ECSchema element, found '{}'",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        ),
                    ));
                }
                return Ok((
                    attribute(&e, "schemaName").or_else(|| attribute(&e, "name")),
                    attribute(&e, "version"),
                ));
            }
            Ok(Event::Eof) => {
                return Err(SchemaError::malformed(path, "no ECSchema element found"));
            }
            Err(e) => return Err(SchemaError::malformed(path, format!("invalid XML: {e}"))),
            Ok(_) => {}
        }
    }
}

fn json_declaration(
    path: &Path,
    content: &str,
) -> Result<(Option<String>, Option<String>), SchemaError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| SchemaError::malformed(path, format!("invalid JSON: {e}")))?;

    let text = |field: &str| value.get(field).and_then(|v| v.as_str()).map(str::to_string);
    Ok((text("name"), text("version")))
}

/// Read one attribute by local name
pub(crate) fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}
