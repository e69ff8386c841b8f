//! In-process reader for ECXML documents (all three serialization versions)

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::locator::{attribute, version_key};
use crate::schema::{
    ClassDef, ClassKind, FormatDetector, PropertyDef, ReferenceSpec, SchemaDocument,
    SchemaEncoding, SchemaFormat,
};

const PROPERTY_ELEMENTS: &[&str] = &[
    "ECProperty",
    "ECStructProperty",
    "ECArrayProperty",
    "ECStructArrayProperty",
    "ECNavigationProperty",
];

/// Parse an ECXML document into the document model
pub fn parse_xml_document(content: &str) -> Result<SchemaDocument> {
    let format = FormatDetector::detect(content, SchemaEncoding::Xml);
    let mut reader = Reader::from_str(content);

    let mut document: Option<SchemaDocument> = None;
    let mut current_class: Option<ClassDef> = None;
    let mut in_base_class = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| anyhow!("XML error at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(e) => {
                let element = local_name(&e);
                match element.as_str() {
                    "ECSchema" => document = Some(read_schema_element(&e, format)?),
                    "BaseClass" if current_class.is_some() => in_base_class = true,
                    _ => handle_child(&e, &element, format, &mut document, &mut current_class)?,
                }
            }
            Event::Empty(e) => {
                let element = local_name(&e);
                if element == "ECSchema" {
                    document = Some(read_schema_element(&e, format)?);
                    continue;
                }
                handle_child(&e, &element, format, &mut document, &mut current_class)?;
                // a self-closing class has no children to wait for
                if ClassKind::from_xml_element(&element).is_some() {
                    finish_class(&mut document, &mut current_class);
                }
            }
            Event::Text(text) if in_base_class => {
                let base = text.unescape().context("invalid BaseClass text")?;
                let base = base.trim();
                if let (Some(class), false) = (current_class.as_mut(), base.is_empty()) {
                    class.base_classes.push(base.to_string());
                }
            }
            Event::End(e) => {
                let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if element == "BaseClass" {
                    in_base_class = false;
                } else if ClassKind::from_xml_element(&element).is_some() {
                    finish_class(&mut document, &mut current_class);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    document.ok_or_else(|| anyhow!("no ECSchema element found"))
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn read_schema_element(element: &BytesStart<'_>, format: SchemaFormat) -> Result<SchemaDocument> {
    let name = attribute(element, "schemaName")
        .or_else(|| attribute(element, "name"))
        .context("ECSchema is missing the schemaName attribute")?;
    let version =
        attribute(element, "version").context("ECSchema is missing the version attribute")?;

    let mut document = SchemaDocument::new(version_key(&name, &version, format)?);
    document.alias = attribute(element, "alias").or_else(|| attribute(element, "nameSpacePrefix"));
    document.description = attribute(element, "description");
    Ok(document)
}

fn handle_child(
    element: &BytesStart<'_>,
    name: &str,
    format: SchemaFormat,
    document: &mut Option<SchemaDocument>,
    current_class: &mut Option<ClassDef>,
) -> Result<()> {
    if name == "ECSchemaReference" {
        let Some(document) = document.as_mut() else {
            bail!("ECSchemaReference outside of an ECSchema element");
        };
        document.references.push(read_reference(element, format)?);
    } else if let Some(kind) = ClassKind::from_xml_element(name) {
        if document.is_none() {
            bail!("{name} outside of an ECSchema element");
        }
        *current_class = Some(read_class(element, kind)?);
    } else if PROPERTY_ELEMENTS.contains(&name) {
        if let Some(class) = current_class.as_mut() {
            class.properties.push(PropertyDef {
                name: attribute(element, "propertyName").with_context(|| {
                    format!("{name} in class '{}' has no propertyName", class.name)
                })?,
                type_name: attribute(element, "typeName")
                    .or_else(|| attribute(element, "relationshipName")),
            });
        }
    }
    Ok(())
}

fn read_reference(element: &BytesStart<'_>, format: SchemaFormat) -> Result<ReferenceSpec> {
    let name =
        attribute(element, "name").context("ECSchemaReference is missing the name attribute")?;

    let mut reference = match attribute(element, "version") {
        Some(version) if !version.trim().is_empty() && version.trim() != "*" => {
            ReferenceSpec::exact(version_key(&name, &version, format)?)
        }
        _ => ReferenceSpec::wildcard(&name),
    };

    if let Some(alias) = attribute(element, "alias").or_else(|| attribute(element, "prefix")) {
        reference = reference.with_alias(alias);
    }
    Ok(reference)
}

fn read_class(element: &BytesStart<'_>, kind: ClassKind) -> Result<ClassDef> {
    let name = attribute(element, "typeName").context("class element is missing typeName")?;

    // ECXML 2.0 spells struct and custom attribute classes as flagged ECClass elements
    let is_flagged = |flag: &str| {
        attribute(element, flag)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
    let kind = if kind == ClassKind::Entity && is_flagged("isCustomAttributeClass") {
        ClassKind::CustomAttribute
    } else if kind == ClassKind::Entity && is_flagged("isStruct") {
        ClassKind::Struct
    } else {
        kind
    };

    Ok(ClassDef {
        name,
        kind,
        description: attribute(element, "description"),
        base_classes: Vec::new(),
        properties: Vec::new(),
    })
}

fn finish_class(document: &mut Option<SchemaDocument>, current_class: &mut Option<ClassDef>) {
    if let (Some(document), Some(class)) = (document.as_mut(), current_class.take()) {
        document.classes.push(class);
    }
}
