//! Per-schema artifacts, CI annotations, and the console summary

use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::results::{
    Outcome, ResultType, SchemaReport, Severity, ValidationReport, ValidationResult,
};
use crate::error::SchemaError;

pub const LOG_EXTENSION: &str = "validation.log";
pub const JSON_EXTENSION: &str = "validation.json";

/// Render the text artifact: one line per non-Message result, in emission order
pub fn render_log(report: &SchemaReport) -> String {
    report
        .results
        .iter()
        .filter(|r| r.result_type != ResultType::Message)
        .map(|r| format!("{}\n", r.render()))
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonArtifact<'a> {
    schema: &'a str,
    path: &'a Path,
    passed: bool,
    results: &'a [ValidationResult],
}

fn render_json(report: &SchemaReport) -> Result<String, serde_json::Error> {
    let artifact = JsonArtifact {
        schema: &report.schema,
        path: &report.path,
        passed: report.outcome().is_success(),
        results: &report.results,
    };
    serde_json::to_string_pretty(&artifact).map(|json| json + "\n")
}

/// Write `<Name>.validation.log` and `<Name>.validation.json` into `output_dir`
pub fn write_artifacts(
    report: &SchemaReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, SchemaError> {
    let log_path = output_dir.join(format!("{}.{LOG_EXTENSION}", report.schema));
    std::fs::write(&log_path, render_log(report)).map_err(|e| SchemaError::io(&log_path, e))?;

    let json_path = output_dir.join(format!("{}.{JSON_EXTENSION}", report.schema));
    let json = render_json(report).map_err(|e| SchemaError::Collaborator(e.into()))?;
    std::fs::write(&json_path, json).map_err(|e| SchemaError::io(&json_path, e))?;

    debug!("Wrote {} and {}", log_path.display(), json_path.display());
    Ok(vec![log_path, json_path])
}

/// CI systems that understand annotation lines on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiEnvironment {
    AzurePipelines,
    GitHubActions,
}

impl CiEnvironment {
    pub fn detect() -> Option<Self> {
        Self::detect_from(|name| std::env::var(name).ok())
    }

    pub fn detect_from(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let set = |name: &str| lookup(name).is_some_and(|value| !value.is_empty());
        if set("TF_BUILD") {
            Some(CiEnvironment::AzurePipelines)
        } else if set("GITHUB_ACTIONS") {
            Some(CiEnvironment::GitHubActions)
        } else {
            None
        }
    }

    /// Annotation line for warnings and errors; messages produce nothing
    pub fn annotation(&self, result: &ValidationResult) -> Option<String> {
        let level = match result.severity() {
            Severity::Info => return None,
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        let message = format!("[{}] {}", result.source_schema, result.text);

        Some(match self {
            CiEnvironment::AzurePipelines => format!("##vso[task.logissue type={level}]{message}"),
            CiEnvironment::GitHubActions => format!("::{level}::{message}"),
        })
    }
}

/// Print every schema block, the CI annotations, and a closing verdict
pub fn print_report(report: &ValidationReport, ci: Option<CiEnvironment>) {
    for skipped in &report.skipped {
        println!(
            "{} {} ({})",
            "Skipped".dimmed(),
            skipped.schema,
            skipped.reason
        );
    }

    for schema in &report.schemas {
        for result in &schema.results {
            let line = match result.severity() {
                Severity::Info if result.text.starts_with(super::results::HEADER_TEXT) => {
                    format!("\n{}", result.text.bold())
                }
                Severity::Info => format!("  {}", result.text.green()),
                Severity::Warning => format!("  {}", result.text.yellow()),
                Severity::Error => format!("  {} {}", result.result_type, result.text.red()),
            };
            println!("{line}");

            if let Some(annotation) = ci.and_then(|ci| ci.annotation(result)) {
                println!("{annotation}");
            }
        }
    }

    for artifact in &report.artifacts {
        println!("{} {}", "Wrote".dimmed(), artifact.display());
    }

    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    let summary = format!(
        "{} schemas validated, {} skipped, {errors} errors, {warnings} warnings",
        report.schemas.len(),
        report.skipped.len()
    );
    match report.outcome() {
        Outcome::Clean => println!("\n✅ {}", summary.green()),
        Outcome::PassedWithWarnings => println!("\n⚠️  {}", summary.yellow()),
        Outcome::Failed => println!("\n❌ {}", summary.red()),
    }
}
