//! Corpus discovery and released/other classification

use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::options::RunConfig;
use crate::error::ConfigurationError;
use crate::locator::{FileNameKey, FileScanner, read_declaration, version_key};
use crate::schema::{SchemaEncoding, VersionKey};

/// One schema file found in the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSchema {
    pub path: PathBuf,
    pub name: String,
    /// `None` when neither the content nor the file name yields a usable version
    pub version: Option<VersionKey>,
    pub released: bool,
}

impl DiscoveredSchema {
    fn inspect(path: PathBuf, config: &RunConfig) -> Option<Self> {
        let from_file_name = FileScanner::parse_file_name(&path);
        let (declared_name, declared_version) = declared_identity(&path);

        let name = declared_name.or_else(|| {
            from_file_name
                .as_ref()
                .map(|key| key.schema_name().to_string())
        })?;
        let version = declared_version.or_else(|| match &from_file_name {
            Some(FileNameKey::Versioned(key)) => Some(key.clone()),
            _ => None,
        });
        let released = is_released(&path, &config.released_segment);

        Some(Self {
            path,
            name,
            version,
            released,
        })
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Name and version as declared in the file, each independently optional
fn declared_identity(path: &Path) -> (Option<String>, Option<VersionKey>) {
    let Some(encoding) = SchemaEncoding::from_path(path) else {
        return (None, None);
    };
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read {}: {e}", path.display());
            return (None, None);
        }
    };
    let Ok(declaration) = read_declaration(path, &content, encoding) else {
        return (None, None);
    };

    let name = declaration.name.filter(|n| !n.trim().is_empty());
    let version = match (&name, &declaration.version) {
        (Some(name), Some(version)) => match version_key(name, version, declaration.format) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!("Version of {} not usable: {e}", path.display());
                None
            }
        },
        _ => None,
    };
    (name, version)
}

/// A path is released when one of its segments names the released root
fn is_released(path: &Path, segment: &str) -> bool {
    path.components().any(|component| match component {
        Component::Normal(part) => part
            .to_str()
            .is_some_and(|part| part.eq_ignore_ascii_case(segment)),
        _ => false,
    })
}

/// The discovered corpus with the two reference-path sets derived from it
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub schemas: Vec<DiscoveredSchema>,
    /// Directories holding released schemas, in discovery order
    pub released_dirs: Vec<PathBuf>,
    /// Directories holding any schema, in discovery order
    pub all_dirs: Vec<PathBuf>,
}

impl Corpus {
    /// Enumerate the corpus: the file itself, or every schema file under a directory.
    ///
    /// Only an unreadable root is fatal; entries below it that cannot be read
    /// are logged and skipped.
    pub fn discover(input: &Path, config: &RunConfig) -> Result<Self, ConfigurationError> {
        let files = if input.is_file() {
            vec![input.to_path_buf()]
        } else {
            Self::scan_tree(input, config)?
        };

        let mut corpus = Corpus::default();
        for path in files {
            match DiscoveredSchema::inspect(path.clone(), config) {
                Some(schema) => corpus.push(schema),
                None => warn!("Skipping {}: cannot determine the schema name", path.display()),
            }
        }

        debug!(
            "Discovered {} schemas ({} released directories, {} directories)",
            corpus.schemas.len(),
            corpus.released_dirs.len(),
            corpus.all_dirs.len()
        );
        Ok(corpus)
    }

    fn scan_tree(root: &Path, config: &RunConfig) -> Result<Vec<PathBuf>, ConfigurationError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| config.is_excluded_dir(name))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ConfigurationError::InputUnreadable {
                        path: root.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).display().to_string();
                    warn!("Skipping unreadable entry {path}: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() && FileScanner::is_schema_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn push(&mut self, schema: DiscoveredSchema) {
        if let Some(dir) = schema.directory() {
            if schema.released && !self.released_dirs.iter().any(|d| d == dir) {
                self.released_dirs.push(dir.to_path_buf());
            }
            if !self.all_dirs.iter().any(|d| d == dir) {
                self.all_dirs.push(dir.to_path_buf());
            }
        }
        self.schemas.push(schema);
    }

    /// Released schemas only see released directories; everything else sees all of them
    pub fn reference_paths(&self, schema: &DiscoveredSchema) -> &[PathBuf] {
        if schema.released {
            &self.released_dirs
        } else {
            &self.all_dirs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_schema(dir: &Path, file_name: &str, name: &str, version: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        fs::write(
            &path,
            format!(
                r#"<ECSchema schemaName="{name}" alias="x" version="{version}" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.3.2"/>"#
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn single_file_is_the_whole_corpus() {
        let dir = TempDir::new().unwrap();
        let file = write_schema(dir.path(), "Solo.01.00.00.ecschema.xml", "Solo", "01.00.00");
        write_schema(dir.path(), "Other.01.00.00.ecschema.xml", "Other", "01.00.00");

        let corpus = Corpus::discover(&file, &RunConfig::default()).unwrap();
        assert_eq!(corpus.schemas.len(), 1);
        assert_eq!(corpus.schemas[0].name, "Solo");
        assert_eq!(corpus.schemas[0].version, Some(VersionKey::new("Solo", 1, 0, 0)));
    }

    #[test]
    fn directory_walk_is_sorted_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        write_schema(&dir.path().join("b"), "Beta.01.00.00.ecschema.xml", "Beta", "01.00.00");
        write_schema(&dir.path().join("a"), "Alpha.01.00.00.ecschema.xml", "Alpha", "01.00.00");
        write_schema(
            &dir.path().join("node_modules"),
            "Dep.01.00.00.ecschema.xml",
            "Dep",
            "01.00.00",
        );
        fs::write(dir.path().join("a").join("notes.xml"), "<notes/>").unwrap();

        let corpus = Corpus::discover(dir.path(), &RunConfig::default()).unwrap();
        let names: Vec<_> = corpus.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn released_schemas_only_see_released_directories() {
        let dir = TempDir::new().unwrap();
        write_schema(
            &dir.path().join("Released"),
            "Stable.01.00.00.ecschema.xml",
            "Stable",
            "01.00.00",
        );
        write_schema(&dir.path().join("wip"), "Draft.01.00.00.ecschema.xml", "Draft", "01.00.00");

        let corpus = Corpus::discover(dir.path(), &RunConfig::default()).unwrap();
        let stable = corpus.schemas.iter().find(|s| s.name == "Stable").unwrap();
        let draft = corpus.schemas.iter().find(|s| s.name == "Draft").unwrap();

        assert!(stable.released);
        assert!(!draft.released);
        assert_eq!(corpus.reference_paths(stable), [dir.path().join("Released")]);
        assert_eq!(corpus.reference_paths(draft).len(), 2);
    }

    #[test]
    fn unusable_declared_version_falls_back_to_the_file_name() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "Odd.02.00.01.ecschema.xml", "Odd", "garbage");
        write_schema(dir.path(), "Bare.ecschema.xml", "Bare", "");

        let corpus = Corpus::discover(dir.path(), &RunConfig::default()).unwrap();
        let bare = corpus.schemas.iter().find(|s| s.name == "Bare").unwrap();
        let odd = corpus.schemas.iter().find(|s| s.name == "Odd").unwrap();
        assert_eq!(bare.version, None);
        assert_eq!(odd.version, Some(VersionKey::new("Odd", 2, 0, 1)));
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            Corpus::discover(&missing, &RunConfig::default()),
            Err(ConfigurationError::InputUnreadable { path, .. }) if path == missing
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_does_not_abort_discovery() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write_schema(&dir.path().join("ok"), "Fine.01.00.00.ecschema.xml", "Fine", "01.00.00");
        let locked = dir.path().join("locked");
        write_schema(&locked, "Hidden.01.00.00.ecschema.xml", "Hidden", "01.00.00");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let corpus = Corpus::discover(dir.path(), &RunConfig::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let corpus = corpus.unwrap();
        assert!(corpus.schemas.iter().any(|s| s.name == "Fine"));
    }
}
