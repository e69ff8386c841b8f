//! Rule-walker contract and the built-in rule set

use anyhow::Result;

use crate::graph::{SchemaGraph, SchemaId, SchemaNode};
use crate::schema::{ClassDef, PropertyDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Message,
    RuleViolation,
}

/// Raw output of a rule walker; severity is derived from the text later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub text: String,
}

impl Diagnostic {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Message,
            text: text.into(),
        }
    }

    pub fn violation(text: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RuleViolation,
            text: text.into(),
        }
    }

    pub fn error(code: &str, message: impl AsRef<str>) -> Self {
        Self::violation(format!("Error {code}: {}", message.as_ref()))
    }

    pub fn warning(code: &str, message: impl AsRef<str>) -> Self {
        Self::violation(format!("Warning {code}: {}", message.as_ref()))
    }
}

/// Traverses one schema of a resolved graph and reports diagnostics
pub trait RuleWalker {
    fn traverse(&mut self, graph: &SchemaGraph, schema: SchemaId) -> Result<Vec<Diagnostic>>;
}

/// A single check. Every hook is optional.
pub trait Rule {
    fn code(&self) -> &'static str;

    fn check_schema(&self, _graph: &SchemaGraph, _schema: SchemaId, _out: &mut Vec<Diagnostic>) {}

    fn check_class(
        &self,
        _graph: &SchemaGraph,
        _schema: SchemaId,
        _class: &ClassDef,
        _out: &mut Vec<Diagnostic>,
    ) {
    }

    fn check_property(
        &self,
        _schema: &SchemaNode,
        _class: &ClassDef,
        _property: &PropertyDef,
        _out: &mut Vec<Diagnostic>,
    ) {
    }
}

/// Walks schema, then each class, then each of the class's properties
pub struct RuleSetWalker {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSetWalker {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(vec![
            Box::new(SchemaAliasRequired),
            Box::new(BaseClassResolves),
            Box::new(PascalCaseClassNames),
            Box::new(PropertyTypeRequired),
        ])
    }
}

impl Default for RuleSetWalker {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl RuleWalker for RuleSetWalker {
    fn traverse(&mut self, graph: &SchemaGraph, schema: SchemaId) -> Result<Vec<Diagnostic>> {
        let node = graph.node(schema);
        let mut out = Vec::new();

        for rule in &self.rules {
            rule.check_schema(graph, schema, &mut out);
        }

        for class in &node.classes {
            for rule in &self.rules {
                rule.check_class(graph, schema, class, &mut out);
            }
            for property in &class.properties {
                for rule in &self.rules {
                    rule.check_property(node, class, property, &mut out);
                }
            }
        }

        Ok(out)
    }
}

pub struct SchemaAliasRequired;

impl Rule for SchemaAliasRequired {
    fn code(&self) -> &'static str {
        "SV-100"
    }

    fn check_schema(&self, graph: &SchemaGraph, schema: SchemaId, out: &mut Vec<Diagnostic>) {
        let node = graph.node(schema);
        if node.alias.as_deref().is_none_or(|alias| alias.trim().is_empty()) {
            out.push(Diagnostic::error(
                self.code(),
                format!("Schema '{}' does not declare an alias.", node.name()),
            ));
        }
    }
}

pub struct BaseClassResolves;

impl Rule for BaseClassResolves {
    fn code(&self) -> &'static str {
        "SV-101"
    }

    fn check_class(
        &self,
        graph: &SchemaGraph,
        schema: SchemaId,
        class: &ClassDef,
        out: &mut Vec<Diagnostic>,
    ) {
        for base in &class.base_classes {
            if graph.resolve_class(schema, base).is_none() {
                out.push(Diagnostic::error(
                    self.code(),
                    format!(
                        "Class '{}.{}' derives from '{base}', which is not defined in the schema or its references.",
                        graph.node(schema).name(),
                        class.name
                    ),
                ));
            }
        }
    }
}

pub struct PascalCaseClassNames;

impl Rule for PascalCaseClassNames {
    fn code(&self) -> &'static str {
        "SV-200"
    }

    fn check_class(
        &self,
        graph: &SchemaGraph,
        schema: SchemaId,
        class: &ClassDef,
        out: &mut Vec<Diagnostic>,
    ) {
        let starts_upper = class
            .name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase());
        if !starts_upper || class.name.contains('_') {
            out.push(Diagnostic::warning(
                self.code(),
                format!(
                    "Class '{}.{}' should be named in PascalCase.",
                    graph.node(schema).name(),
                    class.name
                ),
            ));
        }
    }
}

pub struct PropertyTypeRequired;

impl Rule for PropertyTypeRequired {
    fn code(&self) -> &'static str {
        "SV-102"
    }

    fn check_property(
        &self,
        schema: &SchemaNode,
        class: &ClassDef,
        property: &PropertyDef,
        out: &mut Vec<Diagnostic>,
    ) {
        if property.type_name.as_deref().is_none_or(|t| t.trim().is_empty()) {
            out.push(Diagnostic::error(
                self.code(),
                format!(
                    "Property '{}.{}.{}' has no type.",
                    schema.name(),
                    class.name,
                    property.name
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassKind, SchemaDocument, SchemaFormat, VersionKey};
    use std::path::PathBuf;

    fn graph_with(alias: Option<&str>, classes: Vec<ClassDef>) -> (SchemaGraph, SchemaId) {
        let mut document = SchemaDocument::new(VersionKey::new("Test", 1, 0, 0));
        document.alias = alias.map(str::to_string);
        document.classes = classes;
        let mut graph = SchemaGraph::new();
        let id = graph.insert(SchemaNode::from_document(
            document,
            PathBuf::from("Test.01.00.00.ecschema.xml"),
            SchemaFormat::Current,
            false,
        ));
        (graph, id)
    }

    fn class(name: &str, bases: &[&str], properties: &[(&str, Option<&str>)]) -> ClassDef {
        ClassDef {
            name: name.to_string(),
            kind: ClassKind::Entity,
            description: None,
            base_classes: bases.iter().map(|b| b.to_string()).collect(),
            properties: properties
                .iter()
                .map(|(n, t)| PropertyDef {
                    name: n.to_string(),
                    type_name: t.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn clean_schema_produces_nothing() {
        let (graph, id) = graph_with(
            Some("tst"),
            vec![
                class("Base", &[], &[("Size", Some("double"))]),
                class("Derived", &["tst:Base"], &[]),
            ],
        );
        let diagnostics = RuleSetWalker::default().traverse(&graph, id).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn each_rule_reports_in_walk_order() {
        let (graph, id) = graph_with(
            None,
            vec![class("lower_case", &["x:Missing"], &[("Loose", None)])],
        );
        let texts: Vec<_> = RuleSetWalker::default()
            .traverse(&graph, id)
            .unwrap()
            .into_iter()
            .map(|d| d.text)
            .collect();

        assert_eq!(texts.len(), 4);
        assert!(texts[0].starts_with("Error SV-100"));
        assert!(texts[1].starts_with("Error SV-101"));
        assert!(texts[2].starts_with("Warning SV-200"));
        assert!(texts[3].starts_with("Error SV-102"));
    }
}
