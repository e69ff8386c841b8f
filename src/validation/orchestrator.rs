use std::path::Path;
use tracing::{debug, info, warn};

use super::discovery::{Corpus, DiscoveredSchema};
use super::options::{RunConfig, ValidationOptions};
use super::reporter::write_artifacts;
use super::results::{SchemaReport, SkipReason, SkippedSchema, ValidationReport};
use super::rules::{Diagnostic, RuleSetWalker, RuleWalker};
use crate::error::{ConfigurationError, SchemaError};
use crate::graph::ReferenceResolver;
use crate::locator::FileSchemaLocator;
use crate::readers::SchemaReaders;
use crate::schema::is_standard_schema;

/// Drives discovery, filtering, resolution, and rule walking for one run
pub struct ValidationOrchestrator<W: RuleWalker = RuleSetWalker> {
    config: RunConfig,
    readers: SchemaReaders,
    walker: W,
}

impl ValidationOrchestrator<RuleSetWalker> {
    /// Orchestrator with the built-in readers and rule set
    pub fn with_default_rules(config: RunConfig) -> Self {
        Self::new(config, RuleSetWalker::default())
    }
}

impl<W: RuleWalker> ValidationOrchestrator<W> {
    pub fn new(config: RunConfig, walker: W) -> Self {
        Self {
            config,
            readers: SchemaReaders::default(),
            walker,
        }
    }

    pub fn with_readers(mut self, readers: SchemaReaders) -> Self {
        self.readers = readers;
        self
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Run a full validation: discover → filter → validate → report.
    ///
    /// Only configuration problems are returned as errors. Anything that goes
    /// wrong while validating a single schema becomes an `Error` result in
    /// that schema's block and the run moves on.
    pub fn run(
        &mut self,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, ConfigurationError> {
        options.check()?;

        // 1. Discover the corpus and derive the reference-path sets
        let corpus = Corpus::discover(&options.input, &self.config)?;

        let mut report = ValidationReport::default();
        for schema in &corpus.schemas {
            // 2. Filter standard and ignored schemas
            if let Some(reason) = self.skip_reason(schema) {
                debug!("Skipping {} ({reason})", schema.name);
                report.skipped.push(SkippedSchema {
                    schema: schema.name.clone(),
                    path: schema.path.clone(),
                    reason,
                });
                continue;
            }

            // 3. Validate, sequentially in discovery order
            info!("Validating {}", schema.path.display());
            let mut schema_report = SchemaReport::begin(&schema.name, &schema.path);
            match self.validate_schema(schema, &corpus, options) {
                Ok(diagnostics) => schema_report.record_diagnostics(diagnostics),
                Err(e) => {
                    warn!("Validation of {} failed: {e}", schema.name);
                    schema_report.record_error(format!(
                        "Failed to validate schema '{}': {e}",
                        schema.name
                    ));
                }
            }
            let mut schema_report = schema_report.finish();

            // 4. Write artifacts for schemas with findings
            if let Some(output) = &options.output
                && schema_report.has_findings()
            {
                Self::write_schema_artifacts(&mut schema_report, output, &mut report);
            }

            report.schemas.push(schema_report);
        }

        info!(
            "Validated {} schemas, skipped {}",
            report.schemas.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn skip_reason(&self, schema: &DiscoveredSchema) -> Option<SkipReason> {
        if is_standard_schema(&schema.name) {
            Some(SkipReason::Standard)
        } else if self
            .config
            .ignore_list
            .is_excluded(&schema.name, schema.version.as_ref())
        {
            Some(SkipReason::Ignored)
        } else {
            None
        }
    }

    /// Search order: the schema's own directory, the classified corpus
    /// directories, then the extra reference paths
    fn locator_for(
        schema: &DiscoveredSchema,
        corpus: &Corpus,
        options: &ValidationOptions,
    ) -> FileSchemaLocator {
        let mut locator = FileSchemaLocator::new();
        if let Some(dir) = schema.directory() {
            locator.add_search_path(dir);
        }
        locator.add_search_paths(corpus.reference_paths(schema));
        locator.add_search_paths(&options.reference_paths);
        locator
    }

    fn validate_schema(
        &mut self,
        schema: &DiscoveredSchema,
        corpus: &Corpus,
        options: &ValidationOptions,
    ) -> Result<Vec<Diagnostic>, SchemaError> {
        let locator = Self::locator_for(schema, corpus, options);

        let mut resolver = ReferenceResolver::new(locator, &mut self.readers);
        let root = resolver.resolve_file(&schema.path)?;
        let graph = resolver.into_graph();

        let mut diagnostics = self.walker.traverse(&graph, root)?;

        if options.validate_full_graph {
            for parent in graph.parent_schemas(root) {
                debug!(
                    "Full-graph pass over {} for {}",
                    graph.node(parent).key,
                    schema.name
                );
                diagnostics.extend(self.walker.traverse(&graph, parent)?);
            }
        }

        Ok(diagnostics)
    }

    fn write_schema_artifacts(
        schema_report: &mut SchemaReport,
        output: &Path,
        report: &mut ValidationReport,
    ) {
        match write_artifacts(schema_report, output) {
            Ok(written) => report.artifacts.extend(written),
            Err(e) => schema_report.record_error(format!(
                "Failed to write validation artifacts for '{}': {e}",
                schema_report.schema
            )),
        }
    }
}
