use image::ImageFormat;
use img_parts::Bytes;
use img_parts::jpeg::{Jpeg, JpegSegment};
use serde::Serialize;
use std::path::Path;

use super::directory::MetadataDirectory;
use crate::error::{Result, RewriteError};

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const MARKER_APP1: u8 = 0xE1;

// A segment length field is 16 bits and counts its own two bytes
const MAX_SEGMENT_CONTENTS: usize = 0xFFFF - 2;

/// The container format a photo was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    Jpeg,
}

impl ContainerKind {
    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// A photo held as its original segment list plus the parsed EXIF directory.
///
/// The scan data and every segment other than the Exif APP1 are kept exactly
/// as read, so [`ImageContainer::serialize`] never touches the pixels.
pub struct ImageContainer {
    kind: ContainerKind,
    original: Bytes,
    jpeg: Jpeg,
    exif_pos: usize,
    directory: MetadataDirectory,
}

impl ImageContainer {
    /// Read and parse the photo at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| RewriteError::Load(format!("{}: {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    /// Parse a photo from an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| RewriteError::Load(format!("unrecognized image data: {e}")))?;
        let kind = ContainerKind::from_format(format)
            .ok_or_else(|| RewriteError::Load(format!("unsupported container {format:?}")))?;

        let original = Bytes::from(bytes);
        let jpeg = Jpeg::from_bytes(original.clone())
            .map_err(|e| RewriteError::Load(format!("failed to parse JPEG: {e}")))?;

        let exif_pos = find_exif_segment_pos(&jpeg)
            .ok_or_else(|| RewriteError::ExtractMetadata("no Exif APP1 segment".into()))?;
        let directory =
            MetadataDirectory::parse(&jpeg.segments()[exif_pos].contents()[EXIF_PREFIX.len()..])?;

        Ok(Self {
            kind,
            original,
            jpeg,
            exif_pos,
            directory,
        })
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn directory(&self) -> &MetadataDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut MetadataDirectory {
        &mut self.directory
    }

    /// Produce the file bytes with the current metadata.
    ///
    /// Without mutations the original bytes come back untouched. Otherwise
    /// only the Exif APP1 segment is replaced, at its original position.
    pub fn serialize(self) -> Result<Vec<u8>> {
        if !self.directory.is_modified() {
            return Ok(self.original.to_vec());
        }

        let tiff = self.directory.into_bytes();
        if EXIF_PREFIX.len() + tiff.len() > MAX_SEGMENT_CONTENTS {
            return Err(RewriteError::Serialize(format!(
                "EXIF data of {} bytes does not fit a single APP1 segment",
                tiff.len()
            )));
        }

        let mut contents = Vec::with_capacity(EXIF_PREFIX.len() + tiff.len());
        contents.extend_from_slice(EXIF_PREFIX);
        contents.extend_from_slice(&tiff);

        let mut jpeg = self.jpeg;
        jpeg.segments_mut()[self.exif_pos] =
            JpegSegment::new_with_contents(MARKER_APP1, Bytes::from(contents));
        let output = jpeg.encoder().bytes().to_vec();

        match image::guess_format(&output) {
            Ok(format) if format == self.kind.format() => Ok(output),
            _ => Err(RewriteError::Serialize(format!(
                "encoded output is no longer {:?}",
                self.kind
            ))),
        }
    }
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == MARKER_APP1 && s.contents().starts_with(EXIF_PREFIX))
}
