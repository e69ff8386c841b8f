//! Error types shared by the locator, resolver, and orchestrator

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The component of a version string a problem refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Read,
    Write,
    Minor,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionComponent::Read => write!(f, "read"),
            VersionComponent::Write => write!(f, "write"),
            VersionComponent::Minor => write!(f, "minor"),
        }
    }
}

/// Why a version string could not be turned into a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProblem {
    MissingRead,
    MissingMinor,
    TooManyParts(usize),
    NonNumeric(VersionComponent),
}

impl fmt::Display for VersionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionProblem::MissingRead => write!(f, "the read version is missing"),
            VersionProblem::MissingMinor => write!(f, "the minor version is missing"),
            VersionProblem::TooManyParts(count) => {
                write!(f, "expected at most three parts, found {count}")
            }
            VersionProblem::NonNumeric(component) => {
                write!(f, "the {component} version is not a number")
            }
        }
    }
}

/// Errors that are fatal for one schema (or its reference graph), never for the run
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    #[error("Malformed schema declaration in {}: {reason}", path.display())]
    #[diagnostic(
        code(schema::malformed_declaration),
        help("The top-level ECSchema element must carry a schema name and a version")
    )]
    MalformedSchemaDeclaration { path: PathBuf, reason: String },

    #[error("Invalid version string '{version}': {problem}")]
    #[diagnostic(code(schema::invalid_version))]
    InvalidVersionString {
        version: String,
        problem: VersionProblem,
    },

    #[error("Unable to locate referenced schema '{reference}' of schema '{schema}'")]
    #[diagnostic(
        code(schema::unresolved_reference),
        help("Add the directory containing the referenced schema with --ref")
    )]
    UnresolvedReference { schema: String, reference: String },

    #[error("Cyclic schema reference detected: {}", chain.join(" -> "))]
    #[diagnostic(code(schema::cyclic_reference))]
    CyclicReference { chain: Vec<String> },

    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(schema::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors raised by a deserializer or rule-walker collaborator, surfaced verbatim
    #[error(transparent)]
    #[diagnostic(code(schema::collaborator))]
    Collaborator(#[from] anyhow::Error),
}

impl SchemaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchemaDeclaration {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort the whole run before any schema is processed
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigurationError {
    #[error("Missing required --input (a schema file or directory)")]
    #[diagnostic(code(config::missing_input))]
    MissingInput,

    #[error("Input path does not exist: {}", .0.display())]
    #[diagnostic(code(config::input_not_found))]
    InputNotFound(PathBuf),

    #[error("Output directory does not exist: {}", .0.display())]
    #[diagnostic(
        code(config::output_not_found),
        help("Create the directory first, the validator never creates it")
    )]
    OutputDirectoryNotFound(PathBuf),

    #[error("Schema corpus root does not exist: {}", .0.display())]
    #[diagnostic(
        code(config::corpus_root_not_found),
        help("Set SCHEMA_VALIDATOR_CORPUS_ROOT to the root of the schema corpus")
    )]
    CorpusRootNotFound(PathBuf),

    #[error("Failed to enumerate schemas under {}", path.display())]
    #[diagnostic(code(config::input_unreadable))]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load ignore list {}", path.display())]
    #[diagnostic(code(config::invalid_ignore_list))]
    InvalidIgnoreList {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_problem_names_the_missing_component() {
        let err = SchemaError::InvalidVersionString {
            version: "10".to_string(),
            problem: VersionProblem::MissingMinor,
        };
        assert_eq!(
            err.to_string(),
            "Invalid version string '10': the minor version is missing"
        );
    }

    #[test]
    fn cyclic_reference_renders_chain() {
        let err = SchemaError::CyclicReference {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Cyclic schema reference detected: A -> B -> A");
    }

    #[test]
    fn collaborator_errors_pass_through_verbatim() {
        let err: SchemaError = anyhow::anyhow!("native context exploded").into();
        assert_eq!(err.to_string(), "native context exploded");
    }
}
