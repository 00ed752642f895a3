use crate::error::{Result, VandrError};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Always rendered as `v{major}.{minor}.{patch}`. Ordering is numeric,
/// most-significant component first, so `v1.10.0 > v1.9.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string such as `v1.2.3` or `1.2.3`.
    ///
    /// Grammar: an optional lowercase `v`, then exactly three dot-separated
    /// runs of ASCII digits. Leading zeros are read as decimal, so
    /// `v1.02.0` parses as `v1.2.0`. Anything else (uppercase `V`, signs,
    /// whitespace, missing or extra components) is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let body = text.strip_prefix('v').unwrap_or(text);

        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(VandrError::parse(format!(
                "Invalid version format: '{}' - expected vX.Y.Z",
                text
            )));
        }

        let major = parse_component(text, "major", parts[0])?;
        let minor = parse_component(text, "minor", parts[1])?;
        let patch = parse_component(text, "patch", parts[2])?;

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// Increment according to bump kind, resetting lower components.
    ///
    /// Fails with an invalid-argument error if the component would overflow.
    pub fn increment(&self, bump: VersionBump) -> Result<Self> {
        let overflow = || {
            VandrError::invalid_argument(format!("cannot apply {} bump to {}: overflow", bump, self))
        };

        let next = match bump {
            VersionBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };
        Ok(next)
    }
}

fn parse_component(text: &str, name: &str, raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VandrError::parse(format!(
            "Invalid {} version in '{}': '{}'",
            name, text, raw
        )));
    }

    raw.parse::<u64>().map_err(|_| {
        VandrError::parse(format!(
            "{} version in '{}' is out of range: '{}'",
            name, text, raw
        ))
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VandrError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Version bump kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    pub const ALL: [VersionBump; 3] = [VersionBump::Patch, VersionBump::Minor, VersionBump::Major];
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        };
        f.write_str(name)
    }
}

impl FromStr for VersionBump {
    type Err = VandrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(VandrError::invalid_argument(format!(
                "unknown increment kind '{}' (expected patch, minor or major)",
                other
            ))),
        }
    }
}
