//! User ignore list: schemas that are discovered but never validated

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::schema::VersionKey;

pub const ANY_VERSION: &str = "*";

fn any_version() -> String {
    ANY_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub name: String,
    #[serde(default = "any_version")]
    pub version: String,
}

impl ExclusionEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Whether a schema with this name and (possibly unknown) version is excluded.
    ///
    /// Names compare case-insensitively. `*` matches any version, and a schema
    /// whose version could not be determined matches every entry for its name.
    pub fn matches(&self, name: &str, version: Option<&VersionKey>) -> bool {
        if !self.name.eq_ignore_ascii_case(name) {
            return false;
        }

        let entry_version = self.version.trim();
        if entry_version == ANY_VERSION {
            return true;
        }

        let Some(version) = version else {
            return true;
        };

        match VersionKey::parse(name, entry_version) {
            Ok(entry) => entry.compare(version).is_eq(),
            Err(_) => entry_version == version.version_string(),
        }
    }
}

/// Ignore list loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    entries: Vec<ExclusionEntry>,
}

impl IgnoreList {
    pub fn new(entries: Vec<ExclusionEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON array of `{name, version}`; a missing file is an empty list
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            debug!("No ignore list at {}", path.display());
            return Ok(Self::default());
        }

        let load = || -> anyhow::Result<Vec<ExclusionEntry>> {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .context("expected a JSON array of {name, version} entries")
        };

        let entries = load().map_err(|source| ConfigurationError::InvalidIgnoreList {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} ignore list entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ExclusionEntry] {
        &self.entries
    }

    pub fn is_excluded(&self, name: &str, version: Option<&VersionKey>) -> bool {
        self.entries.iter().any(|entry| entry.matches(name, version))
    }
}
