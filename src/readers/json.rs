//! In-process reader for EC JSON schema documents

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::schema::{ClassDef, ClassKind, PropertyDef, ReferenceSpec, SchemaDocument, VersionKey};

#[derive(Debug, Deserialize)]
struct JsonSchema {
    name: String,
    version: String,
    alias: Option<String>,
    description: Option<String>,
    #[serde(default)]
    references: Vec<JsonReference>,
    /// Kept as a map so items come back in the order they were written
    #[serde(default)]
    items: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonReference {
    name: String,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonItem {
    schema_item_type: String,
    base_class: Option<String>,
    description: Option<String>,
    #[serde(default)]
    mixins: Vec<String>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonProperty {
    name: String,
    type_name: Option<String>,
    relationship_name: Option<String>,
}

/// Parse an EC JSON document. Items are visited in declaration order.
pub fn parse_json_document(content: &str) -> Result<SchemaDocument> {
    let raw: JsonSchema = serde_json::from_str(content).context("invalid EC JSON schema")?;

    let mut document = SchemaDocument::new(VersionKey::parse(&raw.name, &raw.version)?);
    document.alias = raw.alias;
    document.description = raw.description;

    for reference in raw.references {
        let parsed = match reference.version.as_deref().map(str::trim) {
            Some(version) if !version.is_empty() && version != "*" => {
                ReferenceSpec::exact(VersionKey::parse(&reference.name, version)?)
            }
            _ => ReferenceSpec::wildcard(reference.name),
        };
        document.references.push(parsed);
    }

    for (name, value) in raw.items {
        let item: JsonItem = serde_json::from_value(value)
            .with_context(|| format!("invalid schema item '{name}'"))?;
        let Some(kind) = ClassKind::from_item_type(&item.schema_item_type) else {
            continue;
        };

        let mut base_classes: Vec<String> = item.base_class.into_iter().collect();
        base_classes.extend(item.mixins);

        document.classes.push(ClassDef {
            name,
            kind,
            description: item.description,
            base_classes,
            properties: item
                .properties
                .into_iter()
                .map(|p| PropertyDef {
                    name: p.name,
                    type_name: p.type_name.or(p.relationship_name),
                })
                .collect(),
        });
    }

    Ok(document)
}
