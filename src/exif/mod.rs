//! EXIF metadata access for JPEG photos.
//!
//! - [`ImageContainer`] — loads a JPEG, keeps its segments, and re-serializes it
//!   with only the Exif APP1 segment replaced
//! - [`MetadataDirectory`] — the TIFF IFD0 + Exif sub-IFD view, addressed by [`Tag`]
//!
//! Offsets are rewritten through [`MetadataDirectory::verify_and_set`], which
//! never touches a tag whose current value is not the expected one.

mod container;
mod directory;

pub use container::{ContainerKind, ImageContainer};
pub use directory::{MetadataDirectory, OffsetTag, Tag, VerifyOutcome};
