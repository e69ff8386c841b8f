//! Classification of schema files by serialization version

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Serialization version of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaFormat {
    LegacyV2,
    LegacyV3_1,
    Current,
}

impl SchemaFormat {
    pub fn is_legacy(&self) -> bool {
        matches!(self, SchemaFormat::LegacyV2 | SchemaFormat::LegacyV3_1)
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaFormat::LegacyV2 => write!(f, "ECXML 2.0"),
            SchemaFormat::LegacyV3_1 => write!(f, "ECXML 3.1"),
            SchemaFormat::Current => write!(f, "ECXML 3.2"),
        }
    }
}

/// Text encoding of a schema file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaEncoding {
    Xml,
    Json,
}

impl SchemaEncoding {
    /// `Foo.ecschema.xml` -> Xml, `Foo.ecschema.json` -> Json, anything else -> None
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if file_name.ends_with(".ecschema.xml") {
            Some(SchemaEncoding::Xml)
        } else if file_name.ends_with(".ecschema.json") {
            Some(SchemaEncoding::Json)
        } else {
            None
        }
    }
}

const LEGACY_V2_MARKER: &str = "ECXML.2.0";
const LEGACY_V3_1_MARKER: &str = "ECXML.3.1";

pub struct FormatDetector;

impl FormatDetector {
    /// Classify raw file text.
    ///
    /// Only the namespace of the top-level `ECSchema` element is inspected.
    /// JSON files are always `Current`.
    pub fn detect(content: &str, encoding: SchemaEncoding) -> SchemaFormat {
        if encoding == SchemaEncoding::Json {
            return SchemaFormat::Current;
        }

        match Self::root_namespace(content) {
            Some(ns) if ns.contains(LEGACY_V2_MARKER) => SchemaFormat::LegacyV2,
            Some(ns) if ns.contains(LEGACY_V3_1_MARKER) => SchemaFormat::LegacyV3_1,
            _ => SchemaFormat::Current,
        }
    }

    fn root_namespace(content: &str) -> Option<String> {
        let mut reader = Reader::from_str(content);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() != b"ECSchema" {
                        return None;
                    }
                    return e.attributes().flatten().find_map(|attr| {
                        let key = attr.key.as_ref();
                        if key == b"xmlns" || key.starts_with(b"xmlns:") {
                            attr.unescape_value().ok().map(|v| v.into_owned())
                        } else {
                            None
                        }
                    });
                }
                Ok(Event::Eof) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }
}
