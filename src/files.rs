//! Version file discovery and in-place rewriting.
//!
//! [`FileManager`] expands each rule's glob against the project root, runs the
//! rule's regex over every matched file and either reports the version it found
//! or replaces the match with the rule's rendered template. Every operation is
//! best effort across files: a failing file is recorded in the report and the
//! remaining files are still processed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::FileConfig;
use crate::domain::Version;
use crate::error::{Result, VandrError};
use crate::warning::Warning;

/// A version found in one file by one rule
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredVersion {
    pub path: PathBuf,
    pub rule_index: usize,
    pub version: Version,
    /// Full text of the regex match, e.g. `- Version v1.2.3`
    pub raw_match: String,
}

/// A per-file failure collected during a scan or update
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub rule_index: usize,
    pub error: VandrError,
}

/// Result of scanning all configured files
#[derive(Debug, Default)]
pub struct ScanReport {
    /// One entry per `(path, rule)` pair whose pattern matched, in rule order
    pub discovered: Vec<DiscoveredVersion>,
    /// Files that could not be read or whose match was not a valid version
    pub failures: Vec<FileFailure>,
    /// `(rule index, path)` pairs where the file exists but the pattern did not match
    pub unmatched: Vec<(usize, PathBuf)>,
    /// Rules whose glob matched no file
    pub empty_rules: Vec<usize>,
}

impl ScanReport {
    /// Non-fatal conditions worth showing to the user
    pub fn warnings(&self, configs: &[FileConfig]) -> Vec<Warning> {
        let mut warnings = Vec::new();

        for index in &self.empty_rules {
            let pattern = configs
                .iter()
                .find(|c| c.index == *index)
                .map(|c| c.file_pattern.clone())
                .unwrap_or_default();
            warnings.push(Warning::NoFilesMatched {
                rule_index: *index,
                pattern,
            });
        }

        for (index, path) in &self.unmatched {
            warnings.push(Warning::NoVersionFound {
                rule_index: *index,
                path: path.clone(),
            });
        }

        warnings
    }
}

/// Outcome of rewriting one `(path, rule)` pair
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub rule_index: usize,
    pub result: Result<()>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file report of an update run
#[derive(Debug)]
pub struct UpdateReport {
    pub version: Version,
    pub outcomes: Vec<FileOutcome>,
}

impl UpdateReport {
    /// True when every file was rewritten
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Planned replacement shown by dry runs
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub path: PathBuf,
    pub rule_index: usize,
    pub before: String,
    pub after: String,
}

/// Applies file rules to the files under a project root
#[derive(Debug, Clone)]
pub struct FileManager {
    root: PathBuf,
}

impl FileManager {
    /// Create a manager rooted at `root`; rule globs are resolved relative to it
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileManager { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the root, for display
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Expand every rule's glob into concrete files.
    ///
    /// Rules keep configuration order; the files of one rule are sorted by path.
    /// A rule matching nothing contributes no entries.
    pub fn expand_patterns<'c>(&self, configs: &'c [FileConfig]) -> Vec<(&'c FileConfig, PathBuf)> {
        let mut expanded = Vec::new();
        for config in configs {
            for path in self.expand(config) {
                expanded.push((config, path));
            }
        }
        expanded
    }

    fn expand(&self, config: &FileConfig) -> Vec<PathBuf> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full_pattern = format!("{}/{}", root.trim_end_matches('/'), config.file_pattern);

        let entries = match glob::glob(&full_pattern) {
            Ok(entries) => entries,
            Err(e) => {
                // Patterns are validated at load time, so this only happens for odd roots
                tracing::warn!(rule = %config.label(), error = %e, "cannot expand file pattern");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(rule = %config.label(), error = %e, "skipping unreadable path");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        tracing::debug!(rule = %config.label(), matched = paths.len(), "expanded file pattern");
        paths
    }

    /// Scan every configured file for its version.
    ///
    /// Never fails as a whole: unreadable files and unparsable matches are
    /// collected in [`ScanReport::failures`].
    pub fn scan(&self, configs: &[FileConfig]) -> ScanReport {
        let mut report = ScanReport::default();

        for config in configs {
            let paths = self.expand(config);
            if paths.is_empty() {
                report.empty_rules.push(config.index);
                continue;
            }

            for path in paths {
                match self.scan_file(&path, config) {
                    Ok(Some(found)) => {
                        tracing::debug!(
                            path = %path.display(),
                            version = %found.version,
                            "found version"
                        );
                        report.discovered.push(found);
                    }
                    Ok(None) => report.unmatched.push((config.index, path)),
                    Err(error) => report.failures.push(FileFailure {
                        path,
                        rule_index: config.index,
                        error,
                    }),
                }
            }
        }

        report
    }

    /// Apply one rule to one file without touching it
    pub fn scan_file(&self, path: &Path, config: &FileConfig) -> Result<Option<DiscoveredVersion>> {
        let content = read_file(path)?;

        let captures = match config.pattern.captures(&content) {
            Some(captures) => captures,
            None => return Ok(None),
        };

        let raw_match = captures
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let captured = captures.get(1).map(|m| m.as_str()).unwrap_or("");

        let version = Version::parse(captured).map_err(|e| {
            VandrError::parse(format!("{} ({}): {}", path.display(), config.label(), e))
        })?;

        Ok(Some(DiscoveredVersion {
            path: path.to_path_buf(),
            rule_index: config.index,
            version,
            raw_match,
        }))
    }

    /// Replace the version captured by the rule's match in `path` with `new_version`.
    ///
    /// Bytes outside the captured span are written back unchanged.
    ///
    /// # Errors
    /// Returns a file error if the file cannot be read or written, or if the
    /// pattern no longer matches its content.
    pub fn rewrite(&self, path: &Path, config: &FileConfig, new_version: &Version) -> Result<()> {
        let content = read_file(path)?;

        let updated = replace_version(&content, config, new_version).ok_or_else(|| {
            VandrError::file(
                path,
                format!("pattern of {} no longer matches", config.label()),
            )
        })?;

        if updated != content {
            fs::write(path, updated).map_err(|e| VandrError::file(path, e.to_string()))?;
        }
        tracing::debug!(path = %path.display(), version = %new_version, "rewrote version");
        Ok(())
    }

    /// Rewrite every previously discovered `(path, rule)` pair to `new_version`
    pub fn update_discovered(
        &self,
        discovered: &[DiscoveredVersion],
        configs: &[FileConfig],
        new_version: &Version,
    ) -> UpdateReport {
        let outcomes = discovered
            .iter()
            .map(|found| {
                let result = match configs.iter().find(|c| c.index == found.rule_index) {
                    Some(config) => self.rewrite(&found.path, config, new_version),
                    None => Err(VandrError::config(format!(
                        "rule #{} is not configured",
                        found.rule_index + 1
                    ))),
                };
                if let Err(e) = &result {
                    tracing::warn!(path = %found.path.display(), error = %e, "update failed");
                }
                FileOutcome {
                    path: found.path.clone(),
                    rule_index: found.rule_index,
                    result,
                }
            })
            .collect();

        UpdateReport {
            version: *new_version,
            outcomes,
        }
    }

    /// Scan, then rewrite every discovered version to `new_version`
    pub fn update_all(&self, configs: &[FileConfig], new_version: &Version) -> UpdateReport {
        let scan = self.scan(configs);
        self.update_discovered(&scan.discovered, configs, new_version)
    }

    /// Describe the replacements an update would make, without writing
    pub fn plan_changes(
        &self,
        discovered: &[DiscoveredVersion],
        configs: &[FileConfig],
        new_version: &Version,
    ) -> Vec<PlannedChange> {
        discovered
            .iter()
            .filter_map(|found| {
                let config = configs.iter().find(|c| c.index == found.rule_index)?;
                Some(PlannedChange {
                    path: found.path.clone(),
                    rule_index: found.rule_index,
                    before: found.raw_match.clone(),
                    after: replace_version(&found.raw_match, config, new_version)
                        .unwrap_or_else(|| config.render(new_version)),
                })
            })
            .collect()
    }
}

/// Replace the version captured by the rule's first match.
///
/// Only the span of capture group 1 changes. Its new text is what group 1
/// captures in the rendered template, or the bare version when the rendered
/// template does not match the pattern. Returns `None` if the pattern does not
/// match `content`.
pub fn replace_version(content: &str, config: &FileConfig, version: &Version) -> Option<String> {
    let captured = config.pattern.captures(content)?.get(1)?;
    let replacement = replacement_text(config, version);

    let mut updated = String::with_capacity(content.len() + replacement.len());
    updated.push_str(&content[..captured.start()]);
    updated.push_str(&replacement);
    updated.push_str(&content[captured.end()..]);
    Some(updated)
}

/// Text written in place of the captured version
fn replacement_text(config: &FileConfig, version: &Version) -> String {
    let rendered = config.render(version);
    config
        .pattern
        .captures(&rendered)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| version.to_string())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VandrError::file(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{validate_rules, FileRule};
    use tempfile::TempDir;

    fn readme_rule() -> FileRule {
        FileRule::new(
            "README.md",
            r"- Version (v\d+\.\d+\.\d+)",
            "- Version {version}",
        )
    }

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_replace_version_preserves_surroundings() {
        let configs = validate_rules(&[readme_rule()]).unwrap();
        let updated = replace_version(
            "- Version v1.2.3\nOther text\n",
            &configs[0],
            &Version::new(1, 2, 4),
        )
        .unwrap();
        assert_eq!(updated, "- Version v1.2.4\nOther text\n");
    }

    #[test]
    fn test_replace_version_keeps_crlf_and_only_first_match() {
        let configs = validate_rules(&[readme_rule()]).unwrap();
        let content = "Title\r\n  - Version v0.1.0  \r\n- Version v0.0.9\r\n";
        let updated = replace_version(content, &configs[0], &Version::new(0, 2, 0)).unwrap();
        assert_eq!(updated, "Title\r\n  - Version v0.2.0  \r\n- Version v0.0.9\r\n");
    }

    #[test]
    fn test_replace_version_keeps_text_outside_capture() {
        let rule = FileRule::new(
            "package.json",
            r#""version":\s*"(v\d+\.\d+\.\d+)","#,
            r#""version": "{version}""#,
        );
        let configs = validate_rules(&[rule]).unwrap();
        let content = "{\n  \"version\":   \"v1.0.0\",\n  \"name\": \"x\"\n}\n";
        let updated = replace_version(content, &configs[0], &Version::new(1, 1, 0)).unwrap();
        assert_eq!(updated, "{\n  \"version\":   \"v1.1.0\",\n  \"name\": \"x\"\n}\n");
    }

    #[test]
    fn test_replace_version_template_without_context() {
        let rule = FileRule::new("VERSION", r"^release (v\d+\.\d+\.\d+)$", "{version}");
        let configs = validate_rules(&[rule]).unwrap();
        let updated = replace_version("release v0.9.0", &configs[0], &Version::new(1, 0, 0)).unwrap();
        assert_eq!(updated, "release v1.0.0");
    }

    #[test]
    fn test_replace_version_no_match() {
        let configs = validate_rules(&[readme_rule()]).unwrap();
        assert!(replace_version("nothing here", &configs[0], &Version::new(1, 0, 0)).is_none());
    }

    #[test]
    fn test_scan_discovers_versions() {
        let dir = project(&[("README.md", "# App\n- Version v1.2.3\n")]);
        let configs = validate_rules(&[readme_rule()]).unwrap();

        let report = FileManager::new(dir.path()).scan(&configs);
        assert_eq!(report.discovered.len(), 1);
        assert_eq!(report.discovered[0].version, Version::new(1, 2, 3));
        assert_eq!(report.discovered[0].raw_match, "- Version v1.2.3");
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_scan_recursive_glob() {
        let dir = project(&[
            ("src/a/mod.py", "Version: v1.0.0\n"),
            ("src/b/c/mod.py", "Version: v1.1.0\n"),
            ("src/other.txt", "Version: v9.9.9\n"),
        ]);
        let configs = validate_rules(&[FileRule::new(
            "src/**/*.py",
            r"Version: (v\d+\.\d+\.\d+)",
            "Version: {version}",
        )])
        .unwrap();

        let manager = FileManager::new(dir.path());
        let expanded = manager.expand_patterns(&configs);
        let names: Vec<PathBuf> = expanded
            .iter()
            .map(|(_, p)| manager.relative(p).to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("src/a/mod.py"), PathBuf::from("src/b/c/mod.py")]
        );
    }

    #[test]
    fn test_scan_unmatched_file_is_not_error() {
        let dir = project(&[("README.md", "no version here\n")]);
        let configs = validate_rules(&[readme_rule()]).unwrap();

        let report = FileManager::new(dir.path()).scan(&configs);
        assert!(report.discovered.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.unmatched.len(), 1);
    }

    #[test]
    fn test_scan_invalid_capture_is_per_file_error() {
        let dir = project(&[
            ("a.txt", "version: 1.2\n"),
            ("b.txt", "version: 1.2.3\n"),
        ]);
        let configs = validate_rules(&[FileRule::new(
            "*.txt",
            r"version: ([\d.]+)",
            "version: {version}",
        )])
        .unwrap();

        let report = FileManager::new(dir.path()).scan(&configs);
        assert_eq!(report.discovered.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("a.txt"));
        assert!(matches!(report.failures[0].error, VandrError::Parse(_)));
    }

    #[test]
    fn test_scan_empty_glob_reported() {
        let dir = project(&[("README.md", "- Version v1.0.0\n")]);
        let configs = validate_rules(&[
            FileRule::new("dags/*.py", r"Version: (v\d+\.\d+\.\d+)", "Version: {version}"),
            readme_rule(),
        ])
        .unwrap();

        let report = FileManager::new(dir.path()).scan(&configs);
        assert_eq!(report.empty_rules, vec![0]);
        assert_eq!(report.discovered.len(), 1);

        let warnings = report.warnings(&configs);
        assert_eq!(
            warnings,
            vec![Warning::NoFilesMatched {
                rule_index: 0,
                pattern: "dags/*.py".to_string()
            }]
        );
    }

    #[test]
    fn test_rules_accumulate_per_path_and_rule() {
        let dir = project(&[("app.py", "# Version: v1.0.0\nversion = \"v1.1.0\"\n")]);
        let configs = validate_rules(&[
            FileRule::new("app.py", r#"version = "(v\d+\.\d+\.\d+)""#, r#"version = "{version}""#),
            FileRule::new("app.py", r"Version: (v\d+\.\d+\.\d+)", "Version: {version}"),
        ])
        .unwrap();

        let manager = FileManager::new(dir.path());
        let report = manager.scan(&configs);
        assert_eq!(report.discovered.len(), 2);
        assert_eq!(report.discovered[0].rule_index, 0);
        assert_eq!(report.discovered[1].rule_index, 1);

        let update = manager.update_discovered(&report.discovered, &configs, &Version::new(2, 0, 0));
        assert!(update.is_success());
        assert_eq!(update.outcomes.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("app.py")).unwrap(),
            "# Version: v2.0.0\nversion = \"v2.0.0\"\n"
        );
    }

    #[test]
    fn test_rewrite_fails_when_pattern_gone() {
        let dir = project(&[("README.md", "nothing\n")]);
        let configs = validate_rules(&[readme_rule()]).unwrap();
        let path = dir.path().join("README.md");

        let err = FileManager::new(dir.path())
            .rewrite(&path, &configs[0], &Version::new(1, 0, 0))
            .unwrap_err();
        assert!(matches!(err, VandrError::File { .. }));
        assert_eq!(fs::read_to_string(path).unwrap(), "nothing\n");
    }

    #[test]
    fn test_rewrite_missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let configs = validate_rules(&[readme_rule()]).unwrap();
        let err = FileManager::new(dir.path())
            .rewrite(&dir.path().join("README.md"), &configs[0], &Version::new(1, 0, 0))
            .unwrap_err();
        assert!(err.to_string().contains("README.md"));
    }

    #[test]
    fn test_update_all_partial_failure() {
        let rule = FileRule::new("*.txt", r"ver=(v\d+\.\d+\.\d+)", "ver={version}");
        let dir = project(&[
            ("1.txt", "ver=v1.0.0\n"),
            ("2.txt", "ver=v1.0.0\n"),
            ("3.txt", "ver=v1.0.0\n"),
        ]);
        let configs = validate_rules(&[rule]).unwrap();
        let manager = FileManager::new(dir.path());

        let scan = manager.scan(&configs);
        assert_eq!(scan.discovered.len(), 3);

        // file changes between scan and write
        fs::write(dir.path().join("2.txt"), "rewritten by hand\n").unwrap();

        let report = manager.update_discovered(&scan.discovered, &configs, &Version::new(1, 0, 1));
        let results: Vec<bool> = report.outcomes.iter().map(FileOutcome::is_success).collect();
        assert_eq!(results, vec![true, false, true]);
        assert!(!report.is_success());
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.succeeded().count(), 2);

        assert_eq!(fs::read_to_string(dir.path().join("1.txt")).unwrap(), "ver=v1.0.1\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("2.txt")).unwrap(),
            "rewritten by hand\n"
        );
        assert_eq!(fs::read_to_string(dir.path().join("3.txt")).unwrap(), "ver=v1.0.1\n");
    }

    #[test]
    fn test_plan_changes_does_not_write() {
        let dir = project(&[("README.md", "- Version v1.2.3\n")]);
        let configs = validate_rules(&[readme_rule()]).unwrap();
        let manager = FileManager::new(dir.path());

        let scan = manager.scan(&configs);
        let plan = manager.plan_changes(&scan.discovered, &configs, &Version::new(1, 3, 0));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].before, "- Version v1.2.3");
        assert_eq!(plan[0].after, "- Version v1.3.0");
        assert_eq!(
            fs::read_to_string(dir.path().join("README.md")).unwrap(),
            "- Version v1.2.3\n"
        );
    }
}
