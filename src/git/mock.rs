use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::CommitRecord;
use crate::error::{Result, VandrError};
use crate::git::{GitHistory, HEAD};

/// In-memory linear history for testing without a repository
pub struct MockHistory {
    commits: Vec<CommitRecord>,
    tags: HashMap<String, usize>,
    unavailable: Option<String>,
    created: RefCell<Vec<(String, String)>>,
    pushed: RefCell<Vec<(String, String)>>,
}

impl MockHistory {
    /// Create a new empty history
    pub fn new() -> Self {
        MockHistory {
            commits: Vec::new(),
            tags: HashMap::new(),
            unavailable: None,
            created: RefCell::new(Vec::new()),
            pushed: RefCell::new(Vec::new()),
        }
    }

    /// A history whose every call fails, as when git is missing
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MockHistory {
            unavailable: Some(reason.into()),
            ..MockHistory::new()
        }
    }

    /// Append a commit on top of HEAD and return its hash
    pub fn commit(&mut self, message: &str, author: &str) -> String {
        let n = self.commits.len() + 1;
        let hash = format!("{:040x}", n);
        let date = format!("2024-01-{:02}T12:00:00+00:00", n.min(28));
        self.commits
            .push(CommitRecord::new(hash.clone(), message, author, date));
        hash
    }

    /// Tag the current HEAD
    pub fn tag(&mut self, name: impl Into<String>) {
        let head = self.commits.len().saturating_sub(1);
        self.tags.insert(name.into(), head);
    }

    /// Tags created through [`GitHistory::create_tag`], as `(name, message)`
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.created.borrow().clone()
    }

    /// Tags pushed through [`GitHistory::push_tag`], as `(remote, name)`
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    fn check(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(VandrError::git_unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn resolve(&self, rev: &str) -> Result<usize> {
        if rev == HEAD {
            return self
                .commits
                .len()
                .checked_sub(1)
                .ok_or_else(|| VandrError::git_unavailable("repository has no commits"));
        }
        if let Some(index) = self.tags.get(rev) {
            return Ok(*index);
        }
        self.commits
            .iter()
            .position(|c| c.hash == rev)
            .ok_or_else(|| VandrError::git_unavailable(format!("unknown revision '{}'", rev)))
    }
}

impl Default for MockHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHistory for MockHistory {
    fn list_tags(&self) -> Result<Vec<String>> {
        self.check()?;
        let mut tags: Vec<String> = self.tags.keys().cloned().collect();
        tags.extend(self.created.borrow().iter().map(|(name, _)| name.clone()));
        tags.sort();
        Ok(tags)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        self.check()?;
        let end = self.resolve(to)?;
        let start = match from {
            Some(rev) => self.resolve(rev)? + 1,
            None => 0,
        };
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end].to_vec())
    }

    fn commit_hash(&self, rev: &str) -> Result<String> {
        self.check()?;
        let index = self.resolve(rev)?;
        Ok(self.commits[index].hash.clone())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        self.check()?;
        if self.tag_exists(name)? {
            return Err(VandrError::tag(format!("tag '{}' already exists", name)));
        }
        self.created
            .borrow_mut()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.check()?;
        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }
}
