//! File scanning utilities for discovering schema files

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::SchemaError;
use crate::schema::{SchemaEncoding, VersionKey};

/// `<Name>.<RR>.<WW>.<mm>.ecschema.<ext>`
static CURRENT_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<name>[^.]+)\.(?P<read>\d+)\.(?P<write>\d+)\.(?P<minor>\d+)\.ecschema\.(xml|json)$")
        .expect("valid current file name pattern")
});

/// `<Name>.<RR>.<mm>.ecschema.xml`
static LEGACY_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<name>[^.]+)\.(?P<read>\d+)\.(?P<minor>\d+)\.ecschema\.xml$")
        .expect("valid legacy file name pattern")
});

/// `<Name>.ecschema.<ext>`
static UNVERSIONED_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<name>[^.]+)\.ecschema\.(xml|json)$")
        .expect("valid unversioned file name pattern")
});

/// What a schema file name tells us before the file is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameKey {
    /// The name encodes a full version
    Versioned(VersionKey),
    /// Only the schema name is known; the version lives in the content
    Unversioned(String),
}

impl FileNameKey {
    pub fn schema_name(&self) -> &str {
        match self {
            FileNameKey::Versioned(key) => &key.name,
            FileNameKey::Unversioned(name) => name,
        }
    }
}

pub struct FileScanner;

impl FileScanner {
    /// Check if a file has a schema extension
    pub fn is_schema_file(path: &Path) -> bool {
        SchemaEncoding::from_path(path).is_some()
    }

    /// Decode the schema name and, when present, the version from a file name
    pub fn parse_file_name(path: &Path) -> Option<FileNameKey> {
        let file_name = path.file_name()?.to_str()?;

        if let Some(caps) = CURRENT_FILE_NAME.captures(file_name) {
            return Some(FileNameKey::Versioned(VersionKey::new(
                &caps["name"],
                caps["read"].parse().ok()?,
                caps["write"].parse().ok()?,
                caps["minor"].parse().ok()?,
            )));
        }

        if let Some(caps) = LEGACY_FILE_NAME.captures(file_name) {
            return Some(FileNameKey::Versioned(VersionKey::new(
                &caps["name"],
                caps["read"].parse().ok()?,
                0,
                caps["minor"].parse().ok()?,
            )));
        }

        UNVERSIONED_FILE_NAME
            .captures(file_name)
            .map(|caps| FileNameKey::Unversioned(caps["name"].to_string()))
    }

    /// Scan a directory for schema files (non-recursive), sorted by file name
    pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
        let mut files = Vec::new();

        if !dir.is_dir() {
            return Ok(files);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::io(dir, e))?;
            let path = entry.path();

            if path.is_file() && Self::is_schema_file(&path) {
                files.push(path);
            }
        }

        // read_dir order is platform dependent
        files.sort();
        Ok(files)
    }

    /// Scan a directory for files whose name belongs to the given schema
    pub fn scan_for_schema(
        dir: &Path,
        schema_name: &str,
    ) -> Result<Vec<(PathBuf, FileNameKey)>, SchemaError> {
        Ok(Self::scan_directory(dir)?
            .into_iter()
            .filter_map(|path| {
                let key = Self::parse_file_name(&path)?;
                key.schema_name()
                    .eq_ignore_ascii_case(schema_name)
                    .then_some((path, key))
            })
            .collect())
    }
}
