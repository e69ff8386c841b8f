//! Corpus-wide validation: discovery, filtering, rule walking, and reporting

pub mod discovery;
pub mod exclusions;
pub mod options;
pub mod orchestrator;
pub mod reporter;
pub mod results;
pub mod rules;

pub use discovery::{Corpus, DiscoveredSchema};
pub use exclusions::{ExclusionEntry, IgnoreList};
pub use options::{CORPUS_ROOT_ENV, RunConfig, ValidationOptions, corpus_root};
pub use orchestrator::ValidationOrchestrator;
pub use reporter::{CiEnvironment, print_report, render_log, write_artifacts};
pub use results::{
    Outcome, ResultType, SchemaReport, Severity, SkipReason, SkippedSchema, ValidationReport,
    ValidationResult,
};
pub use rules::{Diagnostic, DiagnosticKind, Rule, RuleSetWalker, RuleWalker};
