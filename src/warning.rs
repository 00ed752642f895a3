use std::fmt;
use std::path::PathBuf;

use crate::domain::Version;

/// Non-fatal conditions found while scanning files or reading git history.
/// These are reported to the user but never abort a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A rule's glob matched no file
    NoFilesMatched { rule_index: usize, pattern: String },
    /// A file matched a rule's glob but its content has no version match
    NoVersionFound { rule_index: usize, path: PathBuf },
    /// A file carries an older version than the current one
    InconsistentVersion {
        path: PathBuf,
        found: Version,
        current: Version,
    },
    /// Git history could not be read
    GitUnavailable { reason: String },
    /// The repository has no tag that parses as a version
    NoVersionTags,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoFilesMatched {
                rule_index,
                pattern,
            } => write!(
                f,
                "No files match pattern '{}' (rule #{})",
                pattern,
                rule_index + 1
            ),
            Warning::NoVersionFound { rule_index, path } => write!(
                f,
                "No version found in '{}' (rule #{})",
                path.display(),
                rule_index + 1
            ),
            Warning::InconsistentVersion {
                path,
                found,
                current,
            } => write!(
                f,
                "'{}' has {} but the current version is {}",
                path.display(),
                found,
                current
            ),
            Warning::GitUnavailable { reason } => {
                write!(f, "Git history unavailable: {}", reason)
            }
            Warning::NoVersionTags => write!(f, "No version tags found in the repository"),
        }
    }
}
