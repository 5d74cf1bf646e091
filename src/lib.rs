//! # tzfix
//!
//! Fix a wrong timezone offset recorded in JPEG photos without shifting their
//! local date/time. For every photo, the EXIF `OffsetTime`, `OffsetTimeDigitized`
//! and `OffsetTimeOriginal` tags are rewritten from an expected value to a
//! target value. Nothing else in the file changes: other tags, thumbnails and
//! the compressed image data are copied byte for byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tzfix::config::Config;
//! use tzfix::offset::OffsetString;
//! use tzfix::pipeline::run;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let summary = run(
//!         Path::new("./photos"),
//!         OffsetString::new("+08:00")?,
//!         OffsetString::new("+09:00")?,
//!         &Config::default(),
//!     )?;
//!     println!("{} rewritten, {} failed", summary.committed, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use tzfix::exif::{ImageContainer, OffsetTag, VerifyOutcome};
//! use tzfix::offset::OffsetString;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let expected = OffsetString::new("+08:00")?;
//!     let target = OffsetString::new("+09:00")?;
//!
//!     let mut photo = ImageContainer::load(Path::new("IMG_0001.jpg"))?;
//!     let outcome = photo
//!         .directory_mut()
//!         .verify_and_set(OffsetTag::OffsetTimeOriginal, &expected, &target);
//!     if outcome == VerifyOutcome::Applied {
//!         let bytes = photo.serialize()?;
//!         std::fs::write("IMG_0001.fixed.jpg", bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Safety
//!
//! A tag is only written after its current value is verified to equal the
//! expected offset, so a directory of mixed-origin photos can be processed
//! without touching the ones that were already right. Files are replaced by
//! writing a temporary file and renaming it over the original.
//!
//! ## Modules
//!
//! - [`offset`] — the `±HH:MM` offset value type
//! - [`exif`] — JPEG container and EXIF directory access
//! - [`rewriter`] — per-file verify, serialize and commit
//! - [`pipeline`] — candidate scanning and batch runs
//! - [`config`] — run configuration loading/saving
//! - [`error`] — error taxonomy

mod commit;
pub mod config;
pub mod error;
pub mod exif;
pub mod offset;
pub mod pipeline;
pub mod rewriter;

#[cfg(test)]
mod test_utils;
