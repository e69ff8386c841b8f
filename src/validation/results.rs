//! Classification and aggregation of validation diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::rules::{Diagnostic, DiagnosticKind};

/// Opening message of every schema's result block
pub const HEADER_TEXT: &str = "BEGIN VALIDITY CHECK";
/// Closing message, only emitted for a schema without violations or errors
pub const CLEAN_FOOTER_TEXT: &str = "Succeeded. No rule violations found.";
/// Rule violations whose text starts with this token are warnings
pub const WARNING_PREFIX: &str = "Warning";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    Message,
    RuleViolation,
    Error,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultType::Message => write!(f, "Message"),
            ResultType::RuleViolation => write!(f, "RuleViolation"),
            ResultType::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub result_type: ResultType,
    pub text: String,
    pub source_schema: String,
}

impl ValidationResult {
    pub fn new(
        result_type: ResultType,
        text: impl Into<String>,
        source_schema: impl Into<String>,
    ) -> Self {
        Self {
            result_type,
            text: text.into(),
            source_schema: source_schema.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self.result_type {
            ResultType::Message => Severity::Info,
            ResultType::RuleViolation if self.text.starts_with(WARNING_PREFIX) => Severity::Warning,
            ResultType::RuleViolation | ResultType::Error => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    /// Error results and non-warning rule violations fail the run
    pub fn is_failure(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// The line written to a schema's validation log
    pub fn render(&self) -> String {
        format!("{}: {}", self.result_type, self.text)
    }
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Only header/footer messages
    Clean,
    /// Warnings but nothing failing
    PassedWithWarnings,
    Failed,
}

impl Outcome {
    pub fn classify<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) -> Self {
        let mut outcome = Outcome::Clean;
        for result in results {
            match result.severity() {
                Severity::Error => return Outcome::Failed,
                Severity::Warning => outcome = Outcome::PassedWithWarnings,
                Severity::Info => {}
            }
        }
        outcome
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

/// Results of validating one schema, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub schema: String,
    pub path: PathBuf,
    pub results: Vec<ValidationResult>,
}

impl SchemaReport {
    /// Start a block with the header message
    pub fn begin(schema: &str, path: &Path) -> Self {
        Self {
            schema: schema.to_string(),
            path: path.to_path_buf(),
            results: vec![ValidationResult::new(
                ResultType::Message,
                format!("{HEADER_TEXT}: {schema}"),
                schema,
            )],
        }
    }

    pub fn record_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        for diagnostic in diagnostics {
            let result_type = match diagnostic.kind {
                DiagnosticKind::Message => ResultType::Message,
                DiagnosticKind::RuleViolation => ResultType::RuleViolation,
            };
            self.results
                .push(ValidationResult::new(result_type, diagnostic.text, &self.schema));
        }
    }

    pub fn record_error(&mut self, text: impl Into<String>) {
        self.results
            .push(ValidationResult::new(ResultType::Error, text, &self.schema));
    }

    /// Close the block; the footer is only added when nothing was reported
    pub fn finish(mut self) -> Self {
        if !self.has_findings() {
            self.results.push(ValidationResult::new(
                ResultType::Message,
                CLEAN_FOOTER_TEXT,
                &self.schema,
            ));
        }
        self
    }

    /// Whether any RuleViolation or Error was recorded
    pub fn has_findings(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.result_type != ResultType::Message)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::classify(&self.results)
    }
}

/// A discovered schema that was not validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSchema {
    pub schema: String,
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Standard,
    Ignored,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Standard => write!(f, "standard schema"),
            SkipReason::Ignored => write!(f, "listed in the ignore list"),
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub schemas: Vec<SchemaReport>,
    pub skipped: Vec<SkippedSchema>,
    pub artifacts: Vec<PathBuf>,
}

impl ValidationReport {
    /// All results in discovery order, then emission order
    pub fn results(&self) -> impl Iterator<Item = &ValidationResult> + '_ {
        self.schemas.iter().flat_map(|s| s.results.iter())
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::classify(self.results())
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.results().filter(|r| r.severity() == severity).count()
    }
}
