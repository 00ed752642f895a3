//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! `format_*` functions build plain strings and are unit tested; `display_*`
//! functions print them with styling.

use console::style;
use std::path::Path;

use crate::domain::{CommitRecord, Version, VersionBump};
use crate::files::{DiscoveredVersion, FileFailure, PlannedChange, UpdateReport};
use crate::warning::Warning;

/// Maximum number of commits listed before summarizing the rest
const MAX_LISTED_COMMITS: usize = 20;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a non-fatal warning to stderr.
pub fn display_warning(warning: &Warning) {
    eprintln!("{} {}", style("WARNING:").yellow().bold(), warning);
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// One line per discovered version: `path (rule #N): vX.Y.Z`
pub fn format_discovered(root: &Path, discovered: &DiscoveredVersion) -> String {
    format!(
        "{} (rule #{}): {}",
        relative(root, &discovered.path).display(),
        discovered.rule_index + 1,
        discovered.version
    )
}

/// Display every discovered version.
pub fn display_discovered(root: &Path, discovered: &[DiscoveredVersion]) {
    println!("\n{}", style("Version files:").bold());
    for found in discovered {
        println!("  {}", format_discovered(root, found));
    }
}

/// Display per-file scan failures.
pub fn display_failures(root: &Path, failures: &[FileFailure]) {
    for failure in failures {
        eprintln!(
            "{} {} (rule #{}): {}",
            style("FAILED:").red(),
            relative(root, &failure.path).display(),
            failure.rule_index + 1,
            failure.error
        );
    }
}

/// Display the current version and the result of each bump kind.
pub fn display_current_version(current: &Version, previews: &[(VersionBump, Version)]) {
    println!(
        "\n{} {}",
        style("Current version:").bold(),
        style(current).green()
    );
    for (bump, next) in previews {
        println!("  {:<6} → {}", bump.to_string(), next);
    }
}

/// `old → new` line for a dry run
pub fn format_planned_change(root: &Path, change: &PlannedChange) -> String {
    format!(
        "{}: '{}' → '{}'",
        relative(root, &change.path).display(),
        change.before,
        change.after
    )
}

/// Display the changes a dry run would make.
pub fn display_planned_changes(root: &Path, changes: &[PlannedChange]) {
    println!("\n{}", style("Dry run, no files written:").bold());
    for change in changes {
        println!("  {}", format_planned_change(root, change));
    }
}

/// Display the per-file outcome of an update run.
pub fn display_update_report(root: &Path, report: &UpdateReport) {
    println!(
        "\n{} {}",
        style("Updating to").bold(),
        style(report.version).green()
    );
    for outcome in &report.outcomes {
        let path = relative(root, &outcome.path).display();
        match &outcome.result {
            Ok(()) => println!("  {} {}", style("✓").green(), path),
            Err(e) => println!("  {} {}: {}", style("✗").red(), path, e),
        }
    }

    let failed = report.failed().count();
    if failed == 0 {
        display_success(&format!(
            "Updated {} file(s) to {}",
            report.outcomes.len(),
            report.version
        ));
    } else {
        display_error(&format!(
            "{} of {} file(s) could not be updated",
            failed,
            report.outcomes.len()
        ));
    }
}

/// Single commit line: `abc1234 message (author)`
pub fn format_commit(commit: &CommitRecord) -> String {
    format!("{} {} ({})", commit.short_hash, commit.message, commit.author)
}

/// Display a titled commit list, truncated after [`MAX_LISTED_COMMITS`].
pub fn display_commits(title: &str, commits: &[CommitRecord]) {
    println!("\n{}", style(title).bold());
    if commits.is_empty() {
        println!("  (no commits)");
        return;
    }

    for commit in commits.iter().take(MAX_LISTED_COMMITS) {
        println!("  {}", format_commit(commit));
    }
    if commits.len() > MAX_LISTED_COMMITS {
        println!(
            "  ... and {} more commits",
            commits.len() - MAX_LISTED_COMMITS
        );
    }
}
