//! Release documents: changelog entries, release notes and version metadata.
//!
//! Everything here is pure text rendering over a version, an optional previous
//! version and an ordered commit list. [`ReleaseDocBuilder`] writes the
//! rendered documents to the paths configured in `[release]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::domain::{CommitRecord, Version};
use crate::error::{Result, VandrError};

const CHANGELOG_HEADER: &str = "# Changelog";

/// Machine-readable description of a release, written as `version.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub version: String,
    pub timestamp: String,
    pub commit_hash: Option<String>,
    pub previous_version: Option<String>,
    pub commits: Vec<CommitRecord>,
}

impl ReleaseMetadata {
    pub fn new(
        version: &Version,
        previous: Option<&Version>,
        commits: Vec<CommitRecord>,
        commit_hash: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        ReleaseMetadata {
            version: version.to_string(),
            timestamp: timestamp.to_rfc3339(),
            commit_hash,
            previous_version: previous.map(Version::to_string),
            commits,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render one changelog section.
///
/// ```text
/// ## [v1.3.0] - 2024-05-01
///
/// Changes since v1.2.0:
///
/// - feat: add export (abc1234)
/// ```
pub fn render_changelog_entry(
    version: &Version,
    previous: Option<&Version>,
    commits: &[CommitRecord],
    date: DateTime<Utc>,
) -> String {
    let mut entry = format!("## [{}] - {}\n\n", version, date.format("%Y-%m-%d"));

    if let Some(previous) = previous {
        entry.push_str(&format!("Changes since {}:\n\n", previous));
    }

    if commits.is_empty() {
        entry.push_str("- No changes recorded\n");
    } else {
        for commit in commits {
            entry.push_str(&format!("- {} ({})\n", commit.message, commit.short_hash));
        }
    }

    entry
}

/// Insert `entry` above the newest section of an existing changelog.
///
/// The `# Changelog` header and any preamble below it stay on top; the entry
/// goes before the first `## ` heading, or at the end when there is none. An
/// existing section for the same version is replaced rather than duplicated.
pub fn prepend_changelog(existing: &str, version: &Version, entry: &str) -> String {
    let body = remove_section(existing, version);
    let body = if body.trim_start().starts_with(CHANGELOG_HEADER) {
        body.trim_start().to_string()
    } else {
        format!("{}\n\n{}", CHANGELOG_HEADER, body.trim_start())
    };

    let (preamble, sections) = body.split_at(first_section_offset(&body).unwrap_or(body.len()));

    let mut changelog = preamble.trim_end().to_string();
    changelog.push_str("\n\n");
    changelog.push_str(entry);
    if !sections.trim().is_empty() {
        changelog.push('\n');
        changelog.push_str(sections.trim_end());
        changelog.push('\n');
    }
    changelog
}

/// Byte offset of the first `## ` heading line
fn first_section_offset(body: &str) -> Option<usize> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.starts_with("## ") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Drop the `## [version]` section, up to the next `## ` heading
fn remove_section(body: &str, version: &Version) -> String {
    let heading = format!("## [{}]", version);
    let mut kept = String::with_capacity(body.len());
    let mut skipping = false;

    for line in body.split_inclusive('\n') {
        if line.starts_with("## ") {
            skipping = line.starts_with(&heading);
        }
        if !skipping {
            kept.push_str(line);
        }
    }
    kept
}

/// Render human-readable release notes
pub fn render_release_notes(
    version: &Version,
    previous: Option<&Version>,
    commits: &[CommitRecord],
    date: DateTime<Utc>,
) -> String {
    let mut notes = format!("# Release {}\n\n", version);
    notes.push_str(&format!("Released: {}\n", date.format("%Y-%m-%d")));
    if let Some(previous) = previous {
        notes.push_str(&format!("Previous version: {}\n", previous));
    }
    notes.push_str(&format!("Commits: {}\n", commits.len()));

    let mut authors: Vec<&str> = commits.iter().map(|c| c.author.as_str()).collect();
    authors.sort_unstable();
    authors.dedup();
    if !authors.is_empty() {
        notes.push_str(&format!("Contributors: {}\n", authors.join(", ")));
    }

    notes.push_str("\n## Changes\n\n");
    if commits.is_empty() {
        notes.push_str("- No changes recorded\n");
    } else {
        for commit in commits {
            notes.push_str(&format!(
                "- {} ({}, {})\n",
                commit.message, commit.short_hash, commit.author
            ));
        }
    }
    notes
}

/// Everything needed to render the documents for one release
#[derive(Debug, Clone)]
pub struct ReleaseInput {
    pub version: Version,
    pub previous: Option<Version>,
    pub commits: Vec<CommitRecord>,
    pub commit_hash: Option<String>,
    pub date: DateTime<Utc>,
}

/// Paths written by [`ReleaseDocBuilder::write_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenDocs {
    pub changelog: PathBuf,
    pub release_notes: PathBuf,
    pub metadata: PathBuf,
}

/// Writes release documents under a project root
pub struct ReleaseDocBuilder<'a> {
    root: &'a Path,
    config: &'a ReleaseConfig,
}

impl<'a> ReleaseDocBuilder<'a> {
    pub fn new(root: &'a Path, config: &'a ReleaseConfig) -> Self {
        ReleaseDocBuilder { root, config }
    }

    pub fn metadata(&self, input: &ReleaseInput) -> ReleaseMetadata {
        ReleaseMetadata::new(
            &input.version,
            input.previous.as_ref(),
            input.commits.clone(),
            input.commit_hash.clone(),
            input.date,
        )
    }

    /// Write the changelog (prepending), release notes and metadata files
    pub fn write_all(&self, input: &ReleaseInput) -> Result<WrittenDocs> {
        let changelog = self.root.join(&self.config.changelog);
        let existing = match fs::read_to_string(&changelog) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(VandrError::file(&changelog, e.to_string())),
        };
        let entry = render_changelog_entry(
            &input.version,
            input.previous.as_ref(),
            &input.commits,
            input.date,
        );
        write_doc(&changelog, &prepend_changelog(&existing, &input.version, &entry))?;

        let release_notes = self.root.join(&self.config.release_notes);
        let notes = render_release_notes(
            &input.version,
            input.previous.as_ref(),
            &input.commits,
            input.date,
        );
        write_doc(&release_notes, &notes)?;

        let metadata = self.root.join(&self.config.metadata);
        let mut json = self.metadata(input).to_json()?;
        json.push('\n');
        write_doc(&metadata, &json)?;

        Ok(WrittenDocs {
            changelog,
            release_notes,
            metadata,
        })
    }
}

fn write_doc(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VandrError::file(parent, e.to_string()))?;
    }
    fs::write(path, content).map_err(|e| VandrError::file(path, e.to_string()))?;
    tracing::debug!(path = %path.display(), "wrote release document");
    Ok(())
}
