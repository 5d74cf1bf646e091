use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::commit::commit;
use crate::config::{Config, GatePolicy};
use crate::error::{Result, RewriteError};
use crate::exif::{ImageContainer, MetadataDirectory, OffsetTag, Tag, VerifyOutcome};
use crate::offset::OffsetString;

/// Final state of one file after [`TimezoneRewriter::rewrite_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// The serialized photo replaced the original on disk.
    Committed,
    /// No tag matched and `skip_unchanged` is set, so the file was not rewritten.
    Unchanged,
    /// Verified and serialized, but not written (dry run).
    DryRun,
    /// Load, serialize or commit failed; the original file is unchanged.
    Failed,
}

/// Outcome for one offset tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagReport {
    pub tag: OffsetTag,
    /// The tag whose value was compared against the expected offset.
    pub gate: OffsetTag,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
}

/// Everything that happened to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub tags: Vec<TagReport>,
    /// `DateTimeOriginal` as recorded in the photo, for context.
    pub date_time_original: Option<String>,
    pub error: Option<String>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Failed,
            tags: Vec::new(),
            date_time_original: None,
            error: None,
        }
    }

    pub fn applied_count(&self) -> usize {
        self.tags
            .iter()
            .filter(|t| t.outcome == VerifyOutcome::Applied)
            .count()
    }

    /// Number of tags whose own value differed from the expected offset.
    ///
    /// A tag skipped because its gate differed is not counted again; the gate
    /// tag reports that mismatch itself.
    pub fn mismatch_count(&self) -> usize {
        self.tags
            .iter()
            .filter(|t| t.tag == t.gate)
            .filter(|t| matches!(t.outcome, VerifyOutcome::SkippedMismatch { .. }))
            .count()
    }
}

/// Rewrites the offset tags of one photo at a time.
///
/// The same `(expected, replacement)` pair is used for every file. Each tag is
/// only written after its gate tag is verified to hold `expected`.
///
/// # Example
///
/// ```rust,no_run
/// use tzfix::config::Config;
/// use tzfix::offset::OffsetString;
/// use tzfix::rewriter::{FileStatus, TimezoneRewriter};
/// use std::path::Path;
///
/// let rewriter = TimezoneRewriter::new(
///     OffsetString::new("+08:00").unwrap(),
///     OffsetString::new("+09:00").unwrap(),
///     &Config::default(),
/// );
/// let report = rewriter.rewrite_file(Path::new("IMG_0001.jpg"));
/// if report.status == FileStatus::Committed {
///     println!("{} tag(s) rewritten", report.applied_count());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TimezoneRewriter {
    expected: OffsetString,
    replacement: OffsetString,
    config: Config,
}

impl TimezoneRewriter {
    pub fn new(expected: OffsetString, replacement: OffsetString, config: &Config) -> Self {
        Self {
            expected,
            replacement,
            config: config.clone(),
        }
    }

    pub fn expected(&self) -> &OffsetString {
        &self.expected
    }

    pub fn replacement(&self) -> &OffsetString {
        &self.replacement
    }

    /// The tag whose value must match before `tag` is written.
    pub fn gate_for(&self, tag: OffsetTag) -> OffsetTag {
        match (tag, self.config.gate_policy) {
            (OffsetTag::OffsetTime, GatePolicy::Digitized) => OffsetTag::OffsetTimeDigitized,
            _ => tag,
        }
    }

    /// Load, verify, serialize and commit one photo. Never panics or returns
    /// an error: failures end up in the report.
    pub fn rewrite_file(&self, path: &Path) -> FileReport {
        let mut report = FileReport::new(path);
        match self.try_rewrite(path, &mut report) {
            Ok(status) => report.status = status,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                report.status = FileStatus::Failed;
                report.error = Some(e.to_string());
            }
        }
        report
    }

    /// Run the verify step for all three tags in processing order.
    pub fn apply(&self, directory: &mut MetadataDirectory, path: &Path) -> Vec<TagReport> {
        OffsetTag::ALL
            .into_iter()
            .map(|tag| {
                let gate = self.gate_for(tag);
                let outcome =
                    directory.verify_and_set_from(gate, tag, &self.expected, &self.replacement);
                match &outcome {
                    VerifyOutcome::Applied => {
                        log::info!("writing timezone information for tag {}", tag.name());
                    }
                    VerifyOutcome::SkippedMismatch { .. } if gate != tag => {
                        log::info!(
                            "leaving {} unchanged because {} did not match",
                            tag.name(),
                            gate.name()
                        );
                    }
                    VerifyOutcome::SkippedMismatch { found } => {
                        let mismatch = RewriteError::Mismatch {
                            tag: gate.name(),
                            expected: self.expected.to_string(),
                            found: found.clone(),
                        };
                        log::warn!("{}: {mismatch}", path.display());
                    }
                    VerifyOutcome::SkippedAbsent => {
                        log::debug!("{} not present, skipping {}", gate.name(), tag.name());
                    }
                }
                TagReport { tag, gate, outcome }
            })
            .collect()
    }

    fn try_rewrite(&self, path: &Path, report: &mut FileReport) -> Result<FileStatus> {
        let mut container = ImageContainer::load(path)?;

        report.date_time_original = container.directory().lookup(Tag::DateTimeOriginal);
        if let Some(ref local) = report.date_time_original {
            log::debug!("DateTimeOriginal {local} is kept as is");
        }

        report.tags = self.apply(container.directory_mut(), path);

        if self.config.skip_unchanged && report.applied_count() == 0 {
            log::info!("no timezone tag matched, file left untouched");
            return Ok(FileStatus::Unchanged);
        }

        let bytes = container.serialize()?;

        if self.config.dry_run {
            log::info!("dry run, {} bytes not written", bytes.len());
            return Ok(FileStatus::DryRun);
        }

        commit(path, &bytes, self.config.backup_originals)?;
        log::info!("timezone information updated successfully");
        Ok(FileStatus::Committed)
    }
}
