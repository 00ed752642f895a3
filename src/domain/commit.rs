use serde::{Deserialize, Serialize};

/// Length of the abbreviated commit hash shown in release documents
pub const SHORT_HASH_LEN: usize = 7;

/// One commit as it appears in release documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    #[serde(skip)]
    pub hash: String,
    /// Abbreviated hash, serialized as `hash`
    #[serde(rename = "hash")]
    pub short_hash: String,
    /// Subject line of the commit message
    pub message: String,
    pub author: String,
    /// Commit date in RFC 3339 form
    pub date: String,
}

impl CommitRecord {
    /// Build a record from a full hash and raw commit message.
    ///
    /// Only the first line of the message is kept.
    pub fn new(
        hash: impl Into<String>,
        message: &str,
        author: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        let hash = hash.into();
        CommitRecord {
            short_hash: short_hash(&hash),
            hash,
            message: subject_line(message),
            author: author.into(),
            date: date.into(),
        }
    }
}

/// Abbreviate a commit hash
pub fn short_hash(hash: &str) -> String {
    hash.chars().take(SHORT_HASH_LEN).collect()
}

fn subject_line(message: &str) -> String {
    message.lines().next().unwrap_or("").trim().to_string()
}
