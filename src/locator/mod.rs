//! Mapping (name, version, policy) requests to concrete schema files

mod declaration;
mod file_scanner;

pub use declaration::{RawDeclaration, get_schema_key, read_declaration, version_key};
pub use file_scanner::{FileNameKey, FileScanner};

pub(crate) use declaration::attribute;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{MatchPolicy, SchemaEncoding, VersionKey};

/// A schema file found on disk together with the key it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub key: VersionKey,
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn encoding(&self) -> Option<SchemaEncoding> {
        SchemaEncoding::from_path(&self.path)
    }
}

/// Capability to find schema files by key
pub trait SchemaLocator {
    /// Find the best file for `key` under `policy`; `Ok(None)` when nothing matches
    fn locate(
        &mut self,
        key: &VersionKey,
        policy: MatchPolicy,
    ) -> Result<Option<CandidateFile>, SchemaError>;

    /// Find the highest available revision of `name`, whatever its version
    fn locate_latest(&mut self, name: &str) -> Result<Option<CandidateFile>, SchemaError>;

    fn search_paths(&self) -> &[PathBuf];
}

/// Locator backed by an ordered, duplicate-free list of directories.
///
/// Every successful locate appends the directory of the located file, so
/// sibling references resolve without extra configuration. Among candidates
/// with identical keys the one discovered last wins: directories are visited
/// in insertion order and files within a directory in file name order.
#[derive(Debug, Clone, Default)]
pub struct FileSchemaLocator {
    search_paths: Vec<PathBuf>,
}

impl FileSchemaLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut locator = Self::new();
        locator.add_search_paths(paths);
        locator
    }

    /// Append a directory; duplicates are ignored
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    pub fn add_search_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.add_search_path(path);
        }
    }

    /// Every file named after `name` across all search directories, in discovery order
    pub fn candidates(&self, name: &str) -> Result<Vec<CandidateFile>, SchemaError> {
        let mut candidates = Vec::new();

        for dir in &self.search_paths {
            for (path, file_key) in FileScanner::scan_for_schema(dir, name)? {
                match file_key {
                    FileNameKey::Versioned(key) => candidates.push(CandidateFile { key, path }),
                    FileNameKey::Unversioned(_) => {
                        if let Some(key) = Self::key_from_content(&path) {
                            candidates.push(CandidateFile { key, path });
                        }
                    }
                }
            }
        }

        Ok(candidates)
    }

    fn key_from_content(path: &Path) -> Option<VersionKey> {
        let encoding = SchemaEncoding::from_path(path)?;
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable candidate {}: {e}", path.display());
                return None;
            }
        };

        match get_schema_key(path, &content, encoding) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!("Skipping candidate {}: {e}", path.display());
                None
            }
        }
    }

    /// Highest key wins; ties go to the entry discovered last
    fn select_best(mut candidates: Vec<CandidateFile>) -> Option<CandidateFile> {
        // stable sort keeps discovery order among equal keys
        candidates.sort_by(|a, b| a.key.compare(&b.key));
        candidates.pop()
    }

    fn remember_directory(&mut self, found: &CandidateFile) {
        if let Some(parent) = found.path.parent() {
            self.add_search_path(parent.to_path_buf());
        }
    }
}

impl SchemaLocator for FileSchemaLocator {
    fn locate(
        &mut self,
        key: &VersionKey,
        policy: MatchPolicy,
    ) -> Result<Option<CandidateFile>, SchemaError> {
        let candidates: Vec<_> = self
            .candidates(&key.name)?
            .into_iter()
            .filter(|candidate| policy.matches(key, &candidate.key))
            .collect();

        debug!(
            "Locating {key} ({policy}): {} candidate(s) across {} search path(s)",
            candidates.len(),
            self.search_paths.len()
        );

        let best = Self::select_best(candidates);
        if let Some(found) = &best {
            self.remember_directory(found);
        }
        Ok(best)
    }

    fn locate_latest(&mut self, name: &str) -> Result<Option<CandidateFile>, SchemaError> {
        let best = Self::select_best(self.candidates(name)?);
        if let Some(found) = &best {
            self.remember_directory(found);
        }
        Ok(best)
    }

    fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}
