use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rewriting timezone offsets.
///
/// `Argument` and `NoCandidates` end the run. Every other variant is scoped to
/// a single file: the batch logs it and moves on to the next candidate.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("No candidate JPEG files found under {}", .0.display())]
    NoCandidates(PathBuf),

    #[error("Unable to load image: {0}")]
    Load(String),

    #[error("Unable to read EXIF metadata: {0}")]
    ExtractMetadata(String),

    #[error("Timezone string mismatched for {tag}! expected: {expected} found: {found}")]
    Mismatch {
        tag: &'static str,
        expected: String,
        found: String,
    },

    #[error("Failed to finalize image data: {0}")]
    Serialize(String),

    #[error("Failed to write {}: {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RewriteError>;
