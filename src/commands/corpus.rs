use std::path::{Path, PathBuf};
use tracing::debug;

use schema_validator::ConfigurationError;
use schema_validator::validation::{CORPUS_ROOT_ENV, Outcome, ValidationOptions, corpus_root};

use super::validate_command;

/// Validate every schema under the corpus root
pub fn corpus_command(
    output: Option<PathBuf>,
    reference_paths: Vec<PathBuf>,
    validate_full_graph: bool,
    working_dir: &Path,
) -> Result<Outcome, ConfigurationError> {
    let override_root = std::env::var(CORPUS_ROOT_ENV).ok();
    let root = corpus_root(override_root.as_deref(), working_dir)?;
    debug!("Corpus root: {}", root.display());

    let options =
        ValidationOptions::from_args(Some(root), reference_paths, validate_full_graph, output)?;
    validate_command(options, working_dir)
}
