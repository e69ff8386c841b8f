use std::path::Path;

use schema_validator::ConfigurationError;
use schema_validator::validation::{
    Outcome, RunConfig, ValidationOptions, ValidationOrchestrator, print_report,
};

/// Validate a schema file or directory tree
pub fn validate_command(
    options: ValidationOptions,
    working_dir: &Path,
) -> Result<Outcome, ConfigurationError> {
    let config = RunConfig::load(working_dir)?;
    let ci = config.ci;

    println!("Validating schemas in: {}", options.input.display());

    let mut orchestrator = ValidationOrchestrator::with_default_rules(config);
    let report = orchestrator.run(&options)?;

    print_report(&report, ci);
    Ok(report.outcome())
}
