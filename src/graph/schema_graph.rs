use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::{ClassDef, QualifiedName, SchemaDocument, SchemaFormat, VersionKey};

/// Handle to a resolved schema inside one [`SchemaGraph`]
pub type SchemaId = NodeIndex;

/// One resolved reference edge, with the alias the referencing schema declared for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    pub id: SchemaId,
    pub alias: Option<String>,
}

/// A schema whose references have all been resolved
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub key: VersionKey,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub path: PathBuf,
    pub format: SchemaFormat,
    /// Resolved references in declaration order
    pub references: Vec<SchemaReference>,
    pub classes: Vec<ClassDef>,
    /// Foundational schema: part of the graph, never rule-walked
    pub is_standard: bool,
}

impl SchemaNode {
    pub fn from_document(
        document: SchemaDocument,
        path: PathBuf,
        format: SchemaFormat,
        is_standard: bool,
    ) -> Self {
        Self {
            key: document.key,
            alias: document.alias,
            description: document.description,
            path,
            format,
            references: Vec::new(),
            classes: document.classes,
            is_standard,
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes
            .iter()
            .find(|class| class.name.eq_ignore_ascii_case(name))
    }

    /// Whether `qualifier` names this schema by alias or by full name
    fn answers_to(&self, qualifier: &str) -> bool {
        self.key.has_name(qualifier)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }
}

/// Arena of resolved schemas for one resolution context.
///
/// Each key is stored once, so diamond references share a node. Edges point
/// from a schema to the schemas it references.
#[derive(Debug, Default)]
pub struct SchemaGraph {
    graph: DiGraph<SchemaNode, ()>,
    node_map: HashMap<VersionKey, SchemaId>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn find(&self, key: &VersionKey) -> Option<SchemaId> {
        self.node_map.get(key).copied()
    }

    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.graph[id]
    }

    pub(crate) fn insert(&mut self, node: SchemaNode) -> SchemaId {
        let key = node.key.clone();
        let id = self.graph.add_node(node);
        self.node_map.insert(key, id);
        id
    }

    pub(crate) fn add_reference(&mut self, from: SchemaId, to: SchemaId, alias: Option<String>) {
        self.graph.update_edge(from, to, ());
        let references = &mut self.graph[from].references;
        if !references.iter().any(|r| r.id == to) {
            references.push(SchemaReference { id: to, alias });
        }
    }

    /// Direct references in declaration order
    pub fn references(&self, id: SchemaId) -> impl Iterator<Item = &SchemaNode> + '_ {
        self.graph[id].references.iter().map(|r| &self.graph[r.id])
    }

    /// Resolve a class reference (`alias:Name`, `Schema.Name`, or `Name`) as seen from `from`.
    ///
    /// A qualifier is matched against the aliases `from` declared on its
    /// references before the referenced schemas' own aliases and names.
    pub fn resolve_class(&self, from: SchemaId, raw: &str) -> Option<(SchemaId, &ClassDef)> {
        let qualified = QualifiedName::parse(raw);
        let owner = self.node(from);

        let schema = match qualified.qualifier {
            None => from,
            Some(q) if owner.answers_to(q) => from,
            Some(q) => {
                let declared = owner
                    .references
                    .iter()
                    .find(|r| r.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(q)));
                declared
                    .or_else(|| {
                        owner
                            .references
                            .iter()
                            .find(|r| self.graph[r.id].answers_to(q))
                    })?
                    .id
            }
        };

        self.node(schema)
            .class(qualified.name)
            .map(|class| (schema, class))
    }

    /// Referenced, non-standard schemas that provide a base class to one of `id`'s classes,
    /// in reference order
    pub fn parent_schemas(&self, id: SchemaId) -> Vec<SchemaId> {
        let node = self.node(id);
        let mut providers: Vec<SchemaId> = Vec::new();

        for class in &node.classes {
            for base in &class.base_classes {
                if let Some((owner, _)) = self.resolve_class(id, base)
                    && owner != id
                    && !self.node(owner).is_standard
                    && !providers.contains(&owner)
                {
                    providers.push(owner);
                }
            }
        }

        node.references
            .iter()
            .map(|r| r.id)
            .filter(|r| providers.contains(r))
            .collect()
    }
}
