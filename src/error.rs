//! Error types for per-file migration

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A failure that abandons one source file. The batch continues with the next file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MigrateError {
    /// The source file could not be read
    #[error("Cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The migrated module could not be written back
    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No `(function (ns, lib) { ... })(` wrapper was found
    #[error("Unable to parse library setup method from {}", path.display())]
    SetupNotFound { path: PathBuf },
    /// An extension header whose initializer never closes with `})`
    #[error("Definition '{name}' starting on line {line} has no matching '}})'")]
    UnclosedDefinition { name: String, line: usize },
    /// A pattern built from recovered aliases failed to compile
    #[error("Invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl MigrateError {
    /// The file named in the message, if the message names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            MigrateError::Read { path, .. } | MigrateError::Write { path, .. } | MigrateError::SetupNotFound { path } => {
                Some(path)
            }
            MigrateError::UnclosedDefinition { .. } | MigrateError::Pattern(_) => None,
        }
    }

    /// Attach a file path to errors raised while working on in-memory text.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            MigrateError::SetupNotFound { .. } => MigrateError::SetupNotFound { path: path.into() },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_not_found_message() {
        let err = MigrateError::SetupNotFound { path: PathBuf::from("lib/stage.js") };
        assert_eq!(err.to_string(), "Unable to parse library setup method from lib/stage.js");
    }

    #[test]
    fn test_unclosed_definition_message() {
        let err = MigrateError::UnclosedDefinition { name: "Graphic1".into(), line: 4 };
        assert_eq!(err.to_string(), "Definition 'Graphic1' starting on line 4 has no matching '})'");
    }

    #[test]
    fn test_path_only_for_file_errors() {
        let err = MigrateError::SetupNotFound { path: PathBuf::from("a.js") };
        assert_eq!(err.path(), Some(Path::new("a.js")));
        let err = MigrateError::UnclosedDefinition { name: "a".into(), line: 1 };
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_in_file_replaces_path() {
        let err = MigrateError::SetupNotFound { path: PathBuf::new() }.in_file("a.js");
        assert!(matches!(err, MigrateError::SetupNotFound { path } if path == PathBuf::from("a.js")));
    }
}
