use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, RewriteError};
use crate::offset::OffsetString;
use crate::rewriter::{FileReport, FileStatus, TimezoneRewriter};

/// Extensions of files considered for rewriting (compared case-insensitively).
const CANDIDATE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Collect candidate JPEG files under `root`, recursively.
///
/// Files come back in directory enumeration order. Entries that cannot be read
/// are skipped.
///
/// # Example
///
/// ```rust,no_run
/// use tzfix::pipeline::collect_candidates;
/// use std::path::Path;
///
/// let photos = collect_candidates(Path::new("./photos"), true);
/// println!("Found {} candidates", photos.len());
/// ```
pub fn collect_candidates(root: &Path, follow_links: bool) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_candidate(root) {
            vec![root.to_path_buf()]
        } else {
            log::warn!("Skipping non-JPEG file: {}", root.display());
            Vec::new()
        };
    }
    if !root.is_dir() {
        log::warn!("Path does not exist: {}", root.display());
        return Vec::new();
    }

    WalkDir::new(root)
        .follow_links(follow_links)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() || entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| is_candidate(p))
        .collect()
}

/// Check if a file has a JPEG extension.
fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CANDIDATE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Format a 1-based progress index, zero-padded to the width of `total`.
pub fn progress_label(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{index:0width$}/{total}")
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub committed: usize,
    pub unchanged: usize,
    pub dry_run: usize,
    pub failed: usize,
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Committed => self.committed += 1,
            FileStatus::Unchanged => self.unchanged += 1,
            FileStatus::DryRun => self.dry_run += 1,
            FileStatus::Failed => self.failed += 1,
        }
        self.reports.push(report);
    }
}

/// Rewrite every path in order, one file at a time.
///
/// A failing file never stops the batch; it is counted in
/// [`BatchSummary::failed`] and the run moves on.
pub fn run_batch(paths: &[PathBuf], rewriter: &TimezoneRewriter) -> BatchSummary {
    let total = paths.len();
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };

    for (i, path) in paths.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("processing {} <{name}>", progress_label(i + 1, total));

        summary.record(rewriter.rewrite_file(path));
    }

    log::info!(
        "Done: {} committed, {} unchanged, {} dry run, {} failed out of {total} files",
        summary.committed,
        summary.unchanged,
        summary.dry_run,
        summary.failed
    );
    summary
}

/// Scan `root` and rewrite every candidate from `expected` to `replacement`.
///
/// Fails only when the offsets are rejected or no candidate exists; per-file
/// failures are reported in the returned summary.
///
/// # Example
///
/// ```rust,no_run
/// use tzfix::config::Config;
/// use tzfix::offset::OffsetString;
/// use tzfix::pipeline::run;
/// use std::path::Path;
///
/// let summary = run(
///     Path::new("./photos"),
///     OffsetString::new("+08:00").unwrap(),
///     OffsetString::new("+09:00").unwrap(),
///     &Config::default(),
/// )
/// .unwrap();
/// println!("{} of {} rewritten", summary.committed, summary.total);
/// ```
pub fn run(
    root: &Path,
    expected: OffsetString,
    replacement: OffsetString,
    config: &Config,
) -> Result<BatchSummary> {
    let (expected, replacement) = if config.require_canonical_offsets {
        (
            OffsetString::new_canonical(expected.as_str())?,
            OffsetString::new_canonical(replacement.as_str())?,
        )
    } else {
        for offset in [&expected, &replacement] {
            if !offset.is_canonical() {
                log::warn!("Offset {:?} is not in the ±HH:MM form, using it verbatim", offset.as_str());
            }
        }
        (expected, replacement)
    };
    let rewriter = TimezoneRewriter::new(expected, replacement, config);

    log::info!(
        "changing timezone without shifting date time from {} to {}",
        rewriter.expected(),
        rewriter.replacement()
    );
    if let (Some(from), Some(to)) = (
        rewriter.expected().utc_minutes(),
        rewriter.replacement().utc_minutes(),
    ) {
        log::debug!("recorded UTC instants move by {} minutes", from - to);
    }
    log::info!("starting file walk inside {}", root.display());

    let candidates = collect_candidates(root, config.follow_links);
    log::info!("found {} candidates", candidates.len());
    if candidates.is_empty() {
        return Err(RewriteError::NoCandidates(root.to_path_buf()));
    }
    if config.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    Ok(run_batch(&candidates, &rewriter))
}
