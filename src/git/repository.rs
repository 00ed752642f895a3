use chrono::{DateTime, FixedOffset, Utc};
use git2::{Oid, Repository, Sort};
use std::path::Path;

use crate::domain::CommitRecord;
use crate::error::{Result, VandrError};
use crate::git::GitHistory;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2History {
    repo: Repository,
}

impl Git2History {
    /// Discover the repository containing `path`
    ///
    /// # Errors
    /// Returns a git-unavailable error if `path` is not inside a repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            VandrError::git_unavailable(format!(
                "{} is not in a git repository: {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Git2History { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2History { repo }
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(rev).map_err(|e| {
            VandrError::git_unavailable(format!("unknown revision '{}': {}", rev, e.message()))
        })?;
        let commit = object.peel_to_commit().map_err(|e| {
            VandrError::git_unavailable(format!("'{}' is not a commit: {}", rev, e.message()))
        })?;
        Ok(commit.id())
    }
}

/// RFC 3339 date of a commit in its author's timezone
fn commit_date(time: git2::Time) -> String {
    let utc = DateTime::<Utc>::from_timestamp(time.seconds(), 0).unwrap_or_default();
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset).to_rfc3339(),
        None => utc.to_rfc3339(),
    }
}

impl GitHistory for Git2History {
    fn list_tags(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        let mut tags: Vec<String> = names.iter().flatten().map(str::to_string).collect();
        tags.sort();
        Ok(tags)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        let to_oid = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(to_oid)?;
        if let Some(from) = from {
            revwalk.hide(self.resolve_commit(from)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let author = commit.author();
            commits.push(CommitRecord::new(
                commit.id().to_string(),
                commit.message().unwrap_or("(empty message)"),
                author.name().unwrap_or("unknown"),
                commit_date(commit.time()),
            ));
        }

        // Reverse to get chronological order (oldest first)
        commits.reverse();
        Ok(commits)
    }

    fn commit_hash(&self, rev: &str) -> Result<String> {
        Ok(self.resolve_commit(rev)?.to_string())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .repo
            .find_reference(&format!("refs/tags/{}", name))
            .is_ok())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let tagger = self.repo.signature()?;
        self.repo
            .tag(name, head.as_object(), &tagger, message, false)?;
        Ok(())
    }

    fn push_tag(&self, remote_name: &str, name: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|_| {
            VandrError::git_unavailable(format!("No remote named '{}' found", remote_name))
        })?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            return git2::Cred::ssh_key(username, None, &path, None);
                        }
                    }
                }
            }
            git2::Cred::default()
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    VandrError::git_unavailable(format!("Network error during push: {}", e))
                } else {
                    VandrError::git_unavailable(format!("Failed to push tag '{}': {}", name, e))
                }
            })
    }
}
