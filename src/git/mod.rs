//! Git history abstraction layer
//!
//! Release commands read tags and commits through the [GitHistory] trait so the
//! version and release logic can be exercised without a real repository.
//!
//! - [repository::Git2History]: reads a real repository with the `git2` crate
//! - [mock::MockHistory]: in-memory linear history for tests
//!
//! Callers treat any error from this layer as "git unavailable": version file
//! operations keep working, and release output falls back to empty history.
//!
//! ```rust
//! # use v_and_r::git::{self, GitHistory};
//! # fn example(history: &dyn GitHistory) -> v_and_r::Result<()> {
//! let latest = git::latest_tag(history)?;
//! let commits = history.commits_since(latest.as_ref().map(|t| t.name.as_str()))?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockHistory;
pub use repository::Git2History;

use crate::domain::tag::{previous_tag, sorted_version_tags};
use crate::domain::{CommitRecord, Tag};
use crate::error::Result;

/// Revision name for the current commit
pub const HEAD: &str = "HEAD";

/// Read and tag access to a repository's history
pub trait GitHistory {
    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commits reachable from `to` but not from `from`, oldest first.
    ///
    /// `from` is exclusive and `to` inclusive. With `from = None` the walk
    /// goes back to the root commit.
    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>>;

    /// Commits after `tag` up to HEAD, oldest first
    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitRecord>> {
        self.commits_between(tag, HEAD)
    }

    /// Full hash of the commit a revision (tag, hash or `HEAD`) points to
    fn commit_hash(&self, rev: &str) -> Result<String>;

    /// Full hash of the HEAD commit
    fn head_hash(&self) -> Result<String> {
        self.commit_hash(HEAD)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_tags()?.iter().any(|tag| tag == name))
    }

    /// Create an annotated tag on HEAD
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a tag to a remote
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}

/// Tags that parse as versions, sorted ascending
pub fn version_tags(history: &dyn GitHistory) -> Result<Vec<Tag>> {
    Ok(sorted_version_tags(history.list_tags()?))
}

/// Highest version tag, if any
pub fn latest_tag(history: &dyn GitHistory) -> Result<Option<Tag>> {
    Ok(version_tags(history)?.pop())
}

/// Latest version tag and the version tag before it
pub fn last_release(history: &dyn GitHistory) -> Result<Option<(Tag, Option<Tag>)>> {
    let tags = version_tags(history)?;
    let latest = match tags.last() {
        Some(tag) => tag.clone(),
        None => return Ok(None),
    };
    let previous = previous_tag(&tags, &latest).cloned();
    Ok(Some((latest, previous)))
}
