//! Current and next version computation over one scan.

use crate::domain::{Version, VersionBump};
use crate::error::{Result, VandrError};
use crate::files::{DiscoveredVersion, ScanReport};
use crate::warning::Warning;

/// Highest version among the discovered ones.
///
/// # Errors
/// Returns a not-found error when nothing was discovered.
pub fn highest(discovered: &[DiscoveredVersion]) -> Result<Version> {
    discovered
        .iter()
        .map(|found| found.version)
        .max()
        .ok_or_else(|| VandrError::not_found("no version found in any configured file"))
}

/// Next version for a bump kind.
///
/// Both the preview shown by `view` and the increment commands go through
/// this function so they always agree.
pub fn next_version(current: &Version, bump: VersionBump) -> Result<Version> {
    current.increment(bump)
}

/// Snapshot of the versions found by one scan
#[derive(Debug, Clone, PartialEq)]
pub struct VersionSummary {
    pub current: Version,
    /// Entries whose version is lower than `current`
    pub lagging: Vec<DiscoveredVersion>,
}

impl VersionSummary {
    pub fn from_scan(report: &ScanReport) -> Result<Self> {
        let current = highest(&report.discovered)?;
        let lagging = report
            .discovered
            .iter()
            .filter(|found| found.version < current)
            .cloned()
            .collect();
        Ok(VersionSummary { current, lagging })
    }

    /// True when every file carries the current version
    pub fn is_consistent(&self) -> bool {
        self.lagging.is_empty()
    }

    /// Previews for patch, minor and major bumps
    pub fn previews(&self) -> Result<Vec<(VersionBump, Version)>> {
        VersionBump::ALL
            .iter()
            .map(|bump| Ok((*bump, next_version(&self.current, *bump)?)))
            .collect()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.lagging
            .iter()
            .map(|found| Warning::InconsistentVersion {
                path: found.path.clone(),
                found: found.version,
                current: self.current,
            })
            .collect()
    }
}
