//! Command orchestration
//!
//! [`Context`] bundles everything one invocation needs: the validated rules,
//! the file manager and, when available, the git history. The functions in
//! [`commands`] implement each subcommand on top of it, so they can be driven
//! from tests with a [`crate::git::MockHistory`] instead of a real repository.

pub mod commands;

use std::path::{Path, PathBuf};

use crate::config::{self, Config, FileConfig};
use crate::error::{Result, VandrError};
use crate::files::FileManager;
use crate::git::{Git2History, GitHistory};
use crate::warning::Warning;

/// Runtime options shared by every command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// Show what would change without writing files or creating tags
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub assume_yes: bool,
}

/// Everything a command needs for one run
pub struct Context {
    pub config: Config,
    pub rules: Vec<FileConfig>,
    pub files: FileManager,
    pub options: Options,
    history: std::result::Result<Box<dyn GitHistory>, String>,
}

impl Context {
    /// Load configuration for `root`, validate it and open the repository.
    ///
    /// # Errors
    /// Fails with a configuration error before touching any version file.
    /// A missing repository is not an error; git-dependent output degrades.
    pub fn load(root: &Path, config_path: Option<&Path>, options: Options) -> Result<Self> {
        let config = config::load_config(root, config_path)?;
        let history = match Git2History::open(root) {
            Ok(history) => Ok(Box::new(history) as Box<dyn GitHistory>),
            Err(e) => {
                tracing::debug!(error = %e, "git history unavailable");
                Err(e.to_string())
            }
        };
        Self::new(root.to_path_buf(), config, history, options)
    }

    /// Build a context from parts, validating the rules
    pub fn new(
        root: PathBuf,
        config: Config,
        history: std::result::Result<Box<dyn GitHistory>, String>,
        options: Options,
    ) -> Result<Self> {
        let rules = config.file_configs()?;
        Ok(Context {
            config,
            rules,
            files: FileManager::new(root),
            options,
            history,
        })
    }

    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// Git history, or a git-unavailable error
    pub fn history(&self) -> Result<&dyn GitHistory> {
        match &self.history {
            Ok(history) => Ok(history.as_ref()),
            Err(reason) => Err(VandrError::git_unavailable(reason.clone())),
        }
    }
}

/// Unwrap a git result, turning failure into a warning and a default value
pub fn degrade<T: Default>(result: Result<T>, warnings: &mut Vec<Warning>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "continuing without git history");
            let reason = match e {
                VandrError::GitUnavailable(reason) => reason,
                other => other.to_string(),
            };
            let warning = Warning::GitUnavailable { reason };
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileRule;
    use crate::git::MockHistory;

    #[test]
    fn test_invalid_rules_fail_before_anything_else() {
        let config = Config {
            files: vec![FileRule::new("app.py", r"v\d+", "{version}")],
            ..Config::default()
        };
        let result = Context::new(
            PathBuf::from("/nonexistent"),
            config,
            Err("no repo".to_string()),
            Options::default(),
        );
        assert!(matches!(result, Err(VandrError::Config(_))));
    }

    #[test]
    fn test_history_unavailable() {
        let ctx = Context::new(
            PathBuf::from("."),
            Config::default(),
            Err("not a git repository".to_string()),
            Options::default(),
        )
        .unwrap();
        let err = ctx.history().err().unwrap();
        assert!(matches!(err, VandrError::GitUnavailable(_)));
    }

    #[test]
    fn test_degrade_records_single_warning() {
        let mut warnings = Vec::new();
        let repo = MockHistory::unavailable("git not installed");
        let tags: Vec<String> = degrade(repo.list_tags(), &mut warnings);
        let again: Vec<String> = degrade(repo.list_tags(), &mut warnings);
        assert!(tags.is_empty() && again.is_empty());
        assert_eq!(
            warnings,
            vec![Warning::GitUnavailable {
                reason: "git not installed".to_string()
            }]
        );
    }
}
