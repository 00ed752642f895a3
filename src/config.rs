use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Version;
use crate::error::{Result, VandrError};

/// Name of the project-level configuration file
pub const CONFIG_FILE_NAME: &str = "v-and-r.toml";

/// Placeholder replaced by the rendered version in rule templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Represents the complete configuration for v-and-r.
///
/// Contains the ordered list of version file rules and the release document settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_file_rules")]
    pub files: Vec<FileRule>,

    #[serde(default)]
    pub release: ReleaseConfig,
}

/// One unvalidated `[[files]]` entry as written in the configuration file.
///
/// Fields default to empty so that a missing field is reported by
/// [`validate_rules`] together with the rule's position.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct FileRule {
    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub pattern: String,

    #[serde(default)]
    pub template: String,
}

impl FileRule {
    pub fn new(
        file: impl Into<String>,
        pattern: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        FileRule {
            file: file.into(),
            pattern: pattern.into(),
            template: template.into(),
        }
    }
}

/// Returns the built-in version file rules.
fn default_file_rules() -> Vec<FileRule> {
    vec![
        FileRule::new(
            "app.py",
            r#"version = "(v\d+\.\d+\.\d+)""#,
            r#"version = "{version}""#,
        ),
        FileRule::new(
            "README.md",
            r"- Version (v\d+\.\d+\.\d+)",
            "- Version {version}",
        ),
        FileRule::new(
            "dags/*.py",
            r"Version: (v\d+\.\d+\.\d+)",
            "Version: {version}",
        ),
    ]
}

fn default_changelog() -> String {
    "CHANGELOG.md".to_string()
}

fn default_release_notes() -> String {
    "RELEASES.md".to_string()
}

fn default_metadata() -> String {
    "version.json".to_string()
}

fn default_tag_message() -> String {
    "Release {version}".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Output locations and git settings for release commands.
///
/// Paths are relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_changelog")]
    pub changelog: String,

    #[serde(default = "default_release_notes")]
    pub release_notes: String,

    #[serde(default = "default_metadata")]
    pub metadata: String,

    #[serde(default = "default_tag_message")]
    pub tag_message: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            changelog: default_changelog(),
            release_notes: default_release_notes(),
            metadata: default_metadata(),
            tag_message: default_tag_message(),
            remote: default_remote(),
        }
    }
}

impl ReleaseConfig {
    /// Render the annotated tag message for a version
    pub fn tag_message_for(&self, version: &Version) -> String {
        self.tag_message
            .replace(VERSION_PLACEHOLDER, &version.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            files: default_file_rules(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Config {
    /// Validate every file rule, failing on the first malformed one
    pub fn file_configs(&self) -> Result<Vec<FileConfig>> {
        validate_rules(&self.files)
    }
}

/// A validated version file rule.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// Zero-based position of the rule in the configuration
    pub index: usize,
    /// Glob pattern, relative to the project root
    pub file_pattern: String,
    /// Regex whose first capture group spans the version
    pub pattern: Regex,
    /// Replacement text for the whole match, containing `{version}`
    pub template: String,
}

impl FileConfig {
    /// Validate one raw rule.
    ///
    /// # Errors
    /// Returns a configuration error naming the rule when the glob is empty or
    /// malformed, the regex does not compile or has no capture group, or the
    /// template lacks the `{version}` placeholder.
    pub fn new(index: usize, rule: &FileRule) -> Result<Self> {
        let label = rule_label(index, &rule.file);

        if rule.file.trim().is_empty() {
            return Err(VandrError::config(format!(
                "{}: missing required field 'file'",
                label
            )));
        }
        glob::Pattern::new(&rule.file).map_err(|e| {
            VandrError::config(format!("{}: invalid file pattern: {}", label, e))
        })?;

        if rule.pattern.is_empty() {
            return Err(VandrError::config(format!(
                "{}: missing required field 'pattern'",
                label
            )));
        }
        let pattern = Regex::new(&rule.pattern)
            .map_err(|e| VandrError::config(format!("{}: invalid pattern: {}", label, e)))?;
        // captures_len counts the implicit whole-match group
        if pattern.captures_len() < 2 {
            return Err(VandrError::config(format!(
                "{}: pattern '{}' has no capture group for the version",
                label, rule.pattern
            )));
        }

        if !rule.template.contains(VERSION_PLACEHOLDER) {
            return Err(VandrError::config(format!(
                "{}: template '{}' is missing the {} placeholder",
                label, rule.template, VERSION_PLACEHOLDER
            )));
        }

        Ok(FileConfig {
            index,
            file_pattern: rule.file.clone(),
            pattern,
            template: rule.template.clone(),
        })
    }

    /// Render the template with the given version
    pub fn render(&self, version: &Version) -> String {
        self.template
            .replace(VERSION_PLACEHOLDER, &version.to_string())
    }

    /// Human-readable label used in messages, e.g. `rule #2 ('README.md')`
    pub fn label(&self) -> String {
        rule_label(self.index, &self.file_pattern)
    }
}

fn rule_label(index: usize, file: &str) -> String {
    if file.is_empty() {
        format!("rule #{}", index + 1)
    } else {
        format!("rule #{} ('{}')", index + 1, file)
    }
}

/// Validate an ordered list of rules, failing fast on the first malformed entry.
///
/// # Errors
/// Returns a configuration error when the list is empty or any rule is invalid.
pub fn validate_rules(rules: &[FileRule]) -> Result<Vec<FileConfig>> {
    if rules.is_empty() {
        return Err(VandrError::config("no version files configured"));
    }

    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| FileConfig::new(index, rule))
        .collect()
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `v-and-r.toml` in the project root
/// 3. `v-and-r/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let user_config = dirs::config_dir().map(|dir| dir.join("v-and-r").join("config.toml"));
    match resolve_config_path(root, config_path, user_config) {
        Some(path) => load_config_file(&path),
        None => {
            tracing::debug!("no configuration file found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

/// Pick the configuration file to load, if any
fn resolve_config_path(
    root: &Path,
    config_path: Option<&Path>,
    user_config: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let project = root.join(CONFIG_FILE_NAME);
    if project.exists() {
        return Some(project);
    }

    user_config.filter(|path| path.exists())
}

/// Read and parse a single configuration file
pub fn load_config_file(path: &Path) -> Result<Config> {
    tracing::debug!(path = %path.display(), "loading configuration");
    let content = fs::read_to_string(path).map_err(|e| {
        VandrError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| VandrError::config(format!("cannot parse {}: {}", path.display(), e)))
}
