//! Run configuration: per-invocation options and the immutable per-run config

use std::path::{Path, PathBuf};
use tracing::debug;

use super::exclusions::IgnoreList;
use super::reporter::CiEnvironment;
use crate::error::ConfigurationError;

/// Directory, relative to the working directory, holding tool configuration
pub const CONFIG_DIR: &str = ".schema-validator";
/// Ignore list file inside [`CONFIG_DIR`]
pub const IGNORE_LIST_FILE: &str = "ignore.json";
/// Environment override for the corpus root used by bulk runs
pub const CORPUS_ROOT_ENV: &str = "SCHEMA_VALIDATOR_CORPUS_ROOT";
/// Corpus root used when the environment override is absent
pub const DEFAULT_CORPUS_ROOT: &str = "schemas";

/// What to validate and where to put the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub input: PathBuf,
    pub reference_paths: Vec<PathBuf>,
    pub validate_full_graph: bool,
    pub output: Option<PathBuf>,
}

impl ValidationOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            reference_paths: Vec::new(),
            validate_full_graph: false,
            output: None,
        }
    }

    /// Build options from command-line values; a missing input is fatal
    pub fn from_args(
        input: Option<PathBuf>,
        reference_paths: Vec<PathBuf>,
        validate_full_graph: bool,
        output: Option<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        let input = input.ok_or(ConfigurationError::MissingInput)?;
        let options = Self {
            input,
            reference_paths,
            validate_full_graph,
            output,
        };
        options.check()?;
        Ok(options)
    }

    pub fn with_reference_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_paths.push(path.into());
        self
    }

    pub fn with_full_graph(mut self, enabled: bool) -> Self {
        self.validate_full_graph = enabled;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// The input must exist, and so must the output directory when one is given
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if !self.input.exists() {
            return Err(ConfigurationError::InputNotFound(self.input.clone()));
        }

        if let Some(output) = &self.output
            && !output.is_dir()
        {
            return Err(ConfigurationError::OutputDirectoryNotFound(output.clone()));
        }

        Ok(())
    }
}

/// Configuration that stays fixed for a whole run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ignore_list: IgnoreList,
    /// Path segment marking the released-schema subtree
    pub released_segment: String,
    /// Directory names never descended into during discovery
    pub excluded_dirs: Vec<String>,
    pub ci: Option<CiEnvironment>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ignore_list: IgnoreList::default(),
            released_segment: "Released".to_string(),
            excluded_dirs: [".git", ".schema-validator", "node_modules", "target", "tools"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ci: None,
        }
    }
}

impl RunConfig {
    /// Load the run configuration rooted at `working_dir`
    pub fn load(working_dir: &Path) -> Result<Self, ConfigurationError> {
        let ignore_path = working_dir.join(CONFIG_DIR).join(IGNORE_LIST_FILE);
        let config = Self {
            ignore_list: IgnoreList::load(&ignore_path)?,
            ci: CiEnvironment::detect(),
            ..Self::default()
        };
        debug!(
            "Run config: {} ignore entries, CI environment {:?}",
            config.ignore_list.entries().len(),
            config.ci
        );
        Ok(config)
    }

    pub fn with_ignore_list(mut self, ignore_list: IgnoreList) -> Self {
        self.ignore_list = ignore_list;
        self
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|dir| dir == name)
    }
}

/// Corpus root for bulk runs: the environment override, else the conventional directory
pub fn corpus_root(
    env_value: Option<&str>,
    working_dir: &Path,
) -> Result<PathBuf, ConfigurationError> {
    let root = match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => PathBuf::from(value),
        None => working_dir.join(DEFAULT_CORPUS_ROOT),
    };

    if !root.is_dir() {
        return Err(ConfigurationError::CorpusRootNotFound(root));
    }
    Ok(root)
}
