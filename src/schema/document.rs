//! In-memory form of a parsed schema file, as handed over by the deserializers

use serde::{Deserialize, Serialize};

use super::version::VersionKey;

/// A parsed schema file before its references have been resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub key: VersionKey,
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub references: Vec<ReferenceSpec>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl SchemaDocument {
    pub fn new(key: VersionKey) -> Self {
        Self {
            key,
            alias: None,
            description: None,
            references: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }
}

/// A reference declaration; `version == None` means "any version"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    pub name: String,
    pub version: Option<VersionKey>,
    pub alias: Option<String>,
}

impl ReferenceSpec {
    pub fn exact(key: VersionKey) -> Self {
        Self {
            name: key.name.clone(),
            version: Some(key),
            alias: None,
        }
    }

    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Entity,
    Struct,
    CustomAttribute,
    Relationship,
    Mixin,
}

impl ClassKind {
    /// Map an XML element name (`ECEntityClass`, legacy `ECClass`, ...) to a kind
    pub fn from_xml_element(element: &str) -> Option<Self> {
        match element {
            "ECEntityClass" | "ECClass" => Some(ClassKind::Entity),
            "ECStructClass" => Some(ClassKind::Struct),
            "ECCustomAttributeClass" => Some(ClassKind::CustomAttribute),
            "ECRelationshipClass" => Some(ClassKind::Relationship),
            "ECMixinClass" => Some(ClassKind::Mixin),
            _ => None,
        }
    }

    /// Map a JSON `schemaItemType` to a kind; non-class items yield `None`
    pub fn from_item_type(item_type: &str) -> Option<Self> {
        match item_type {
            "EntityClass" => Some(ClassKind::Entity),
            "StructClass" => Some(ClassKind::Struct),
            "CustomAttributeClass" => Some(ClassKind::CustomAttribute),
            "RelationshipClass" => Some(ClassKind::Relationship),
            "Mixin" => Some(ClassKind::Mixin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub description: Option<String>,
    /// Base classes as written in the file (`alias:Name` or `Schema.Name`)
    #[serde(default)]
    pub base_classes: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub type_name: Option<String>,
}

/// A base class reference split into its schema qualifier and class name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub qualifier: Option<&'a str>,
    pub name: &'a str,
}

impl<'a> QualifiedName<'a> {
    /// Split `alias:Name` or `Schema.Name`; an unqualified name refers to the owning schema
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if let Some((qualifier, name)) = raw.split_once(':').or_else(|| raw.split_once('.')) {
            Self {
                qualifier: Some(qualifier),
                name,
            }
        } else {
            Self {
                qualifier: None,
                name: raw,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_accepts_alias_and_schema_forms() {
        assert_eq!(
            QualifiedName::parse("bis:Element"),
            QualifiedName {
                qualifier: Some("bis"),
                name: "Element"
            }
        );
        assert_eq!(
            QualifiedName::parse("BisCore.Element"),
            QualifiedName {
                qualifier: Some("BisCore"),
                name: "Element"
            }
        );
        assert_eq!(QualifiedName::parse("Local").qualifier, None);
    }

    #[test]
    fn legacy_ec_class_is_an_entity() {
        assert_eq!(ClassKind::from_xml_element("ECClass"), Some(ClassKind::Entity));
        assert_eq!(ClassKind::from_item_type("KindOfQuantity"), None);
    }
}
