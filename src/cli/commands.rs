//! Subcommand implementations
//!
//! Each function prints its own output through [`crate::ui`] and returns the
//! data it computed so callers and tests can inspect it. Errors are
//! [`crate::error::VandrError`] values wrapped in `anyhow`; the binary
//! downcasts them to pick the exit code.

use anyhow::Result;
use chrono::Utc;

use crate::cli::{degrade, Context};
use crate::domain::tag::previous_tag;
use crate::domain::{CommitRecord, Tag, Version, VersionBump};
use crate::error::VandrError;
use crate::files::ScanReport;
use crate::git::{self, GitHistory};
use crate::release::{
    render_changelog_entry, ReleaseDocBuilder, ReleaseInput, ReleaseMetadata, WrittenDocs,
};
use crate::resolver::{self, VersionSummary};
use crate::ui;
use crate::warning::Warning;

/// Latest release as seen by `release-last`
#[derive(Debug, Clone, PartialEq)]
pub struct LastRelease {
    pub tag: Tag,
    pub previous: Option<Tag>,
    pub commits: Vec<CommitRecord>,
}

/// Result of `release-deploy`
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub tag: String,
    pub created: bool,
    pub pushed: bool,
}

/// Scan all rules, report per-file problems and compute the current version
fn scan_current(ctx: &Context) -> Result<(ScanReport, VersionSummary)> {
    let report = ctx.files.scan(&ctx.rules);

    ui::display_failures(ctx.root(), &report.failures);
    for warning in report.warnings(&ctx.rules) {
        ui::display_warning(&warning);
    }

    let summary = VersionSummary::from_scan(&report)?;
    for warning in summary.warnings() {
        ui::display_warning(&warning);
    }
    Ok((report, summary))
}

/// `view`: show every discovered version, the current one and bump previews
pub fn view(ctx: &Context) -> Result<VersionSummary> {
    let (report, summary) = scan_current(ctx)?;

    ui::display_discovered(ctx.root(), &report.discovered);
    ui::display_current_version(&summary.current, &summary.previews()?);
    if summary.is_consistent() {
        ui::display_success("All version files agree");
    }
    Ok(summary)
}

/// `patch` / `minor` / `major`: rewrite every discovered version to the next one
pub fn increment(ctx: &Context, bump: VersionBump) -> Result<Version> {
    let (report, summary) = scan_current(ctx)?;
    let next = resolver::next_version(&summary.current, bump)?;

    ui::display_status(&format!(
        "{} bump: {} → {}",
        bump, summary.current, next
    ));

    if ctx.options.dry_run {
        let plan = ctx.files.plan_changes(&report.discovered, &ctx.rules, &next);
        ui::display_planned_changes(ctx.root(), &plan);
        return Ok(next);
    }

    let update = ctx
        .files
        .update_discovered(&report.discovered, &ctx.rules, &next);
    ui::display_update_report(ctx.root(), &update);

    let failed = update.failed().count() + report.failures.len();
    if failed > 0 {
        return Err(VandrError::PartialUpdate {
            failed,
            total: update.outcomes.len() + report.failures.len(),
        }
        .into());
    }
    Ok(next)
}

/// Gather the previous version and commits for releasing `current`.
///
/// If `current` is already tagged, the release spans from the tag before it to
/// that tag and points at the tagged commit. Otherwise it spans from the
/// highest older tag to HEAD. Git failures only produce warnings.
pub fn release_input(ctx: &Context, current: Version) -> (ReleaseInput, Vec<Warning>) {
    let mut warnings = Vec::new();
    let history: Option<&dyn GitHistory> = degrade(ctx.history().map(Some), &mut warnings);

    let mut input = ReleaseInput {
        version: current,
        previous: None,
        commits: Vec::new(),
        commit_hash: None,
        date: Utc::now(),
    };

    let history = match history {
        Some(history) => history,
        None => return (input, warnings),
    };

    let tags = degrade(git::version_tags(history), &mut warnings);
    if tags.is_empty() && warnings.is_empty() {
        warnings.push(Warning::NoVersionTags);
    }

    match tags.iter().find(|tag| tag.version == current) {
        Some(tagged) => {
            let previous = previous_tag(&tags, tagged);
            input.previous = previous.map(|tag| tag.version);
            input.commits = degrade(
                history.commits_between(previous.map(|tag| tag.name.as_str()), &tagged.name),
                &mut warnings,
            );
            input.commit_hash =
                degrade(history.commit_hash(&tagged.name).map(Some), &mut warnings);
        }
        None => {
            let base = tags.iter().rev().find(|tag| tag.version < current);
            input.previous = base.map(|tag| tag.version);
            input.commits = degrade(
                history.commits_since(base.map(|tag| tag.name.as_str())),
                &mut warnings,
            );
            input.commit_hash = degrade(history.head_hash().map(Some), &mut warnings);
        }
    }

    (input, warnings)
}

/// `release-info`: print release metadata JSON for the current version
pub fn release_info(ctx: &Context) -> Result<ReleaseMetadata> {
    let (_, summary) = scan_current(ctx)?;
    let (input, warnings) = release_input(ctx, summary.current);
    for warning in &warnings {
        ui::display_warning(warning);
    }

    let metadata = ReleaseDocBuilder::new(ctx.root(), &ctx.config.release).metadata(&input);
    println!("{}", metadata.to_json()?);
    Ok(metadata)
}

/// `release-diff <from> <to>`: commits between two version tags
pub fn release_diff(ctx: &Context, from: &str, to: &str) -> Result<Vec<CommitRecord>> {
    let from_version = Version::parse(from)?;
    let to_version = Version::parse(to)?;
    if from_version >= to_version {
        return Err(VandrError::invalid_argument(format!(
            "release-diff expects an older tag first, got {} and {}",
            from, to
        ))
        .into());
    }

    let history = ctx.history()?;
    let tags = git::version_tags(history)?;
    let from_tag = tag_for_version(&tags, &from_version)?;
    let to_tag = tag_for_version(&tags, &to_version)?;
    let commits = history.commits_between(Some(&from_tag.name), &to_tag.name)?;

    print!(
        "{}",
        render_changelog_entry(&to_version, Some(&from_version), &commits, Utc::now())
    );
    Ok(commits)
}

/// Tag whose name parses to `version`, whatever its prefix
fn tag_for_version<'t>(tags: &'t [Tag], version: &Version) -> Result<&'t Tag> {
    tags.iter()
        .find(|tag| tag.version == *version)
        .ok_or_else(|| VandrError::tag(format!("no tag found for version {}", version)).into())
}

/// `release-last`: the latest version tag and what it contains
pub fn release_last(ctx: &Context) -> Result<Option<LastRelease>> {
    let history = ctx.history()?;

    let (tag, previous) = match git::last_release(history)? {
        Some(pair) => pair,
        None => {
            ui::display_warning(&Warning::NoVersionTags);
            return Ok(None);
        }
    };

    let commits =
        history.commits_between(previous.as_ref().map(|t| t.name.as_str()), &tag.name)?;

    let title = match &previous {
        Some(previous) => format!("Latest release {} (since {})", tag.name, previous.name),
        None => format!("Latest release {}", tag.name),
    };
    ui::display_commits(&title, &commits);

    Ok(Some(LastRelease {
        tag,
        previous,
        commits,
    }))
}

/// `release-prepare`: write the changelog, release notes and metadata files.
///
/// Returns `None` on a dry run.
pub fn release_prepare(ctx: &Context) -> Result<Option<WrittenDocs>> {
    let (_, summary) = scan_current(ctx)?;
    let (input, warnings) = release_input(ctx, summary.current);
    for warning in &warnings {
        ui::display_warning(warning);
    }

    if ctx.options.dry_run {
        ui::display_status(&format!(
            "Dry run: would write {}, {} and {}",
            ctx.config.release.changelog,
            ctx.config.release.release_notes,
            ctx.config.release.metadata
        ));
        print!(
            "{}",
            render_changelog_entry(
                &input.version,
                input.previous.as_ref(),
                &input.commits,
                input.date
            )
        );
        return Ok(None);
    }

    let written = ReleaseDocBuilder::new(ctx.root(), &ctx.config.release).write_all(&input)?;
    for path in [&written.changelog, &written.release_notes, &written.metadata] {
        ui::display_success(&format!("Wrote {}", ctx.files.relative(path).display()));
    }
    Ok(Some(written))
}

/// `release-deploy`: tag HEAD with the current version and optionally push it
pub fn release_deploy(ctx: &Context, remote: Option<&str>, push: bool) -> Result<Deployment> {
    let history = ctx.history()?;
    let (_, summary) = scan_current(ctx)?;

    let tag = summary.current.to_string();
    if history.tag_exists(&tag)? {
        return Err(VandrError::tag(format!("tag '{}' already exists", tag)).into());
    }

    let remote = remote.unwrap_or(ctx.config.release.remote.as_str());
    let message = ctx.config.release.tag_message_for(&summary.current);

    if ctx.options.dry_run {
        ui::display_status(&format!("Dry run: would create tag {} ('{}')", tag, message));
        if push {
            ui::display_status(&format!("Dry run: would push {} to {}", tag, remote));
        }
        return Ok(Deployment {
            tag,
            created: false,
            pushed: false,
        });
    }

    history.create_tag(&tag, &message)?;
    ui::display_success(&format!("Created tag {}", tag));

    let pushed = push
        && (ctx.options.assume_yes
            || ui::confirm_action(&format!("Push tag {} to {}?", tag, remote))?);
    if pushed {
        history.push_tag(remote, &tag)?;
        ui::display_success(&format!("Pushed {} to {}", tag, remote));
    } else {
        ui::display_status(&format!(
            "Tag {} created locally. Push it with: git push {} {}",
            tag, remote, tag
        ));
    }

    Ok(Deployment {
        tag,
        created: true,
        pushed,
    })
}
