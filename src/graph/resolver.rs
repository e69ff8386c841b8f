//! Recursive resolution of a schema's reference graph

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema_graph::{SchemaGraph, SchemaId, SchemaNode};
use crate::error::SchemaError;
use crate::locator::{FileSchemaLocator, SchemaLocator};
use crate::readers::SchemaReaders;
use crate::schema::{MatchPolicy, ReferenceSpec, VersionKey, is_standard_schema};

/// Policy used for versioned reference declarations
pub const REFERENCE_MATCH_POLICY: MatchPolicy = MatchPolicy::LatestCompatibleWrite;

/// One resolution context: a locator, the readers, and the graph being built.
///
/// The locator's search paths grow as files are found, so a resolver must not
/// be shared between two resolutions running at the same time.
pub struct ReferenceResolver<'a> {
    locator: FileSchemaLocator,
    readers: &'a mut SchemaReaders,
    graph: SchemaGraph,
    in_progress: Vec<VersionKey>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(locator: FileSchemaLocator, readers: &'a mut SchemaReaders) -> Self {
        Self {
            locator,
            readers,
            graph: SchemaGraph::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SchemaGraph {
        self.graph
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        self.locator.search_paths()
    }

    /// Locate the root schema by key, then resolve it and everything it references
    pub fn resolve(
        &mut self,
        root: &VersionKey,
        policy: MatchPolicy,
    ) -> Result<SchemaId, SchemaError> {
        let found = self.locator.locate(root, policy)?.ok_or_else(|| {
            SchemaError::UnresolvedReference {
                schema: root.name.clone(),
                reference: root.to_string(),
            }
        })?;
        self.resolve_file(&found.path)
    }

    /// Resolve a schema file whose location is already known
    pub fn resolve_file(&mut self, path: &Path) -> Result<SchemaId, SchemaError> {
        if let Some(parent) = path.parent() {
            self.locator.add_search_path(parent.to_path_buf());
        }

        let search_paths = self.locator.search_paths().to_vec();
        let (document, format) = self.readers.read(path, &search_paths)?;

        if let Some(existing) = self.graph.find(&document.key) {
            return Ok(existing);
        }

        if let Some(start) = self.in_progress.iter().position(|k| *k == document.key) {
            let mut chain: Vec<String> = self.in_progress[start..]
                .iter()
                .map(|k| k.name.clone())
                .collect();
            chain.push(document.key.name.clone());
            return Err(SchemaError::CyclicReference { chain });
        }

        debug!("Resolving {} from {}", document.key, path.display());
        self.in_progress.push(document.key.clone());

        let outcome = self.resolve_references(&document.key, &document.references);
        self.in_progress.pop();
        let references = outcome?;

        let is_standard = is_standard_schema(document.name());
        let node = SchemaNode::from_document(document, path.to_path_buf(), format, is_standard);
        let id = self.graph.insert(node);
        for (reference, alias) in references {
            self.graph.add_reference(id, reference, alias);
        }

        info!("✓ Resolved {}", self.graph.node(id).key);
        Ok(id)
    }

    fn resolve_references(
        &mut self,
        owner: &VersionKey,
        references: &[ReferenceSpec],
    ) -> Result<Vec<(SchemaId, Option<String>)>, SchemaError> {
        let mut resolved = Vec::with_capacity(references.len());

        for reference in references {
            if let Some(id) = reference
                .version
                .as_ref()
                .and_then(|key| self.graph.find(key))
            {
                resolved.push((id, reference.alias.clone()));
                continue;
            }

            let found = match &reference.version {
                Some(key) => self.locator.locate(key, REFERENCE_MATCH_POLICY)?,
                None => self.locator.locate_latest(&reference.name)?,
            };

            let Some(found) = found else {
                return Err(SchemaError::UnresolvedReference {
                    schema: owner.name.clone(),
                    reference: reference.name.clone(),
                });
            };

            let id = self.resolve_file(&found.path)?;
            resolved.push((id, reference.alias.clone()));
        }

        Ok(resolved)
    }
}
