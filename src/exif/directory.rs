use serde::Serialize;
use std::ops::Range;

use crate::error::{Result, RewriteError};
use crate::offset::OffsetString;

// Pointer from IFD0 to the Exif sub-IFD
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

// TIFF field type for NUL-terminated 7-bit text
const FORMAT_ASCII: u16 = 2;

const ENTRY_SIZE: usize = 12;

/// The directory a tag lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ifd {
    /// IFD0, the primary image directory.
    Primary,
    /// The Exif sub-IFD referenced from IFD0 by tag 0x8769.
    Exif,
}

/// The string-valued tags this crate knows how to address by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    DateTime,
    DateTimeOriginal,
    DateTimeDigitized,
    OffsetTime,
    OffsetTimeOriginal,
    OffsetTimeDigitized,
}

impl Tag {
    pub fn code(self) -> u16 {
        match self {
            Tag::DateTime => 0x0132,
            Tag::DateTimeOriginal => 0x9003,
            Tag::DateTimeDigitized => 0x9004,
            Tag::OffsetTime => 0x9010,
            Tag::OffsetTimeOriginal => 0x9011,
            Tag::OffsetTimeDigitized => 0x9012,
        }
    }

    pub(crate) fn ifd(self) -> Ifd {
        match self {
            Tag::DateTime => Ifd::Primary,
            _ => Ifd::Exif,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::DateTime => "DateTime",
            Tag::DateTimeOriginal => "DateTimeOriginal",
            Tag::DateTimeDigitized => "DateTimeDigitized",
            Tag::OffsetTime => "OffsetTime",
            Tag::OffsetTimeOriginal => "OffsetTimeOriginal",
            Tag::OffsetTimeDigitized => "OffsetTimeDigitized",
        }
    }
}

/// The three timezone-offset tags that can be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OffsetTag {
    /// Offset of `DateTime`, the modify time.
    OffsetTime,
    /// Offset of `DateTimeDigitized`.
    OffsetTimeDigitized,
    /// Offset of `DateTimeOriginal`, the capture time.
    OffsetTimeOriginal,
}

impl OffsetTag {
    /// Processing order: modify time, digitized time, original time.
    pub const ALL: [OffsetTag; 3] = [
        OffsetTag::OffsetTime,
        OffsetTag::OffsetTimeDigitized,
        OffsetTag::OffsetTimeOriginal,
    ];

    pub fn tag(self) -> Tag {
        match self {
            OffsetTag::OffsetTime => Tag::OffsetTime,
            OffsetTag::OffsetTimeDigitized => Tag::OffsetTimeDigitized,
            OffsetTag::OffsetTimeOriginal => Tag::OffsetTimeOriginal,
        }
    }

    pub fn name(self) -> &'static str {
        self.tag().name()
    }
}

impl From<OffsetTag> for Tag {
    fn from(tag: OffsetTag) -> Self {
        tag.tag()
    }
}

/// Result of a verify-before-write step on one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// The verified value matched and the target tag now holds the replacement.
    Applied,
    /// The tag is not present; nothing was written.
    SkippedAbsent,
    /// The tag holds something other than the expected value; nothing was written.
    SkippedMismatch { found: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn read_u16(self, data: &[u8], offset: usize) -> u16 {
        let bytes = [data[offset], data[offset + 1]];
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    fn read_u32(self, data: &[u8], offset: usize) -> u32 {
        let bytes = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    fn encode_u32(self, val: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => val.to_le_bytes(),
            ByteOrder::Big => val.to_be_bytes(),
        }
    }
}

/// One 12-byte IFD entry, located by its position in the TIFF data.
#[derive(Debug, Clone, Copy)]
struct Entry {
    tag: u16,
    format: u16,
    count: u32,
    pos: usize,
}

/// Size in bytes of one component of a TIFF field type.
fn format_size(format: u16) -> usize {
    match format {
        1 | 2 | 6 | 7 => 1,
        3 | 8 => 2,
        4 | 9 | 11 => 4,
        5 | 10 | 12 => 8,
        _ => 1,
    }
}

/// The EXIF tag directory of one photo.
///
/// Wraps the raw TIFF data of the APP1 Exif segment and exposes lookup and
/// mutation by [`Tag`] name. Mutations patch the TIFF data in place: values
/// that do not fit their old slot are appended at the end and the entry is
/// re-pointed, so no other tag, thumbnail or maker note moves.
#[derive(Debug, Clone)]
pub struct MetadataDirectory {
    tiff: Vec<u8>,
    order: ByteOrder,
    primary: Vec<Entry>,
    exif: Vec<Entry>,
    modified: bool,
}

impl MetadataDirectory {
    /// Parse TIFF data (the APP1 payload after `Exif\0\0`).
    pub fn parse(tiff: &[u8]) -> Result<Self> {
        if tiff.len() < 8 {
            return Err(RewriteError::ExtractMetadata("TIFF data too short".into()));
        }

        let order = match &tiff[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => {
                return Err(RewriteError::ExtractMetadata("invalid TIFF byte order".into()));
            }
        };
        if order.read_u16(tiff, 2) != 42 {
            return Err(RewriteError::ExtractMetadata("invalid TIFF magic number".into()));
        }

        let ifd0_offset = order.read_u32(tiff, 4) as usize;
        let primary = read_ifd(tiff, order, ifd0_offset)
            .map_err(|e| RewriteError::ExtractMetadata(format!("IFD0: {e}")))?;

        let exif = match primary.iter().find(|e| e.tag == TAG_EXIF_IFD_POINTER) {
            Some(pointer) => {
                let offset = order.read_u32(tiff, pointer.pos + 8) as usize;
                read_ifd(tiff, order, offset)
                    .map_err(|e| RewriteError::ExtractMetadata(format!("Exif IFD: {e}")))?
            }
            None => {
                log::debug!("No Exif sub-IFD pointer in IFD0");
                Vec::new()
            }
        };

        log::debug!(
            "Parsed {} IFD0 and {} Exif IFD entries ({:?} endian)",
            primary.len(),
            exif.len(),
            order
        );

        Ok(Self {
            tiff: tiff.to_vec(),
            order,
            primary,
            exif,
            modified: false,
        })
    }

    /// Read a string tag. Returns `None` when the tag is absent or not ASCII.
    pub fn lookup(&self, tag: Tag) -> Option<String> {
        let entry = self.find(tag)?;
        if entry.format != FORMAT_ASCII {
            log::debug!("{} has non-ASCII type {}, ignoring", tag.name(), entry.format);
            return None;
        }
        let range = self.value_range(entry)?;
        let raw = &self.tiff[range];
        let text = raw.split(|&b| b == 0).next().unwrap_or_default();
        Some(String::from_utf8_lossy(text).into_owned())
    }

    /// Whether `tag` is present with a readable string value.
    pub fn contains(&self, tag: Tag) -> bool {
        self.lookup(tag).is_some()
    }

    /// Verify `tag` holds `expected`, then replace it with `replacement`.
    pub fn verify_and_set(
        &mut self,
        tag: OffsetTag,
        expected: &OffsetString,
        replacement: &OffsetString,
    ) -> VerifyOutcome {
        self.verify_and_set_from(tag, tag, expected, replacement)
    }

    /// Verify `source` holds `expected`, then write `replacement` into `target`.
    ///
    /// A missing `target` is reported as [`VerifyOutcome::SkippedAbsent`]:
    /// tags are only ever rewritten, never created.
    pub fn verify_and_set_from(
        &mut self,
        source: OffsetTag,
        target: OffsetTag,
        expected: &OffsetString,
        replacement: &OffsetString,
    ) -> VerifyOutcome {
        let Some(found) = self.lookup(source.tag()) else {
            return VerifyOutcome::SkippedAbsent;
        };
        if found != expected.as_str() {
            return VerifyOutcome::SkippedMismatch { found };
        }
        if !self.contains(target.tag()) {
            return VerifyOutcome::SkippedAbsent;
        }
        self.write_ascii(target.tag(), replacement.as_str());
        VerifyOutcome::Applied
    }

    /// Whether any tag has been rewritten since parsing.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The current TIFF data, including any mutations.
    pub fn as_bytes(&self) -> &[u8] {
        &self.tiff
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.tiff
    }

    fn entries(&self, ifd: Ifd) -> &[Entry] {
        match ifd {
            Ifd::Primary => &self.primary,
            Ifd::Exif => &self.exif,
        }
    }

    fn find(&self, tag: Tag) -> Option<&Entry> {
        self.entries(tag.ifd()).iter().find(|e| e.tag == tag.code())
    }

    /// Byte range of an entry's value, or `None` if it points outside the data.
    fn value_range(&self, entry: &Entry) -> Option<Range<usize>> {
        let size = (entry.count as usize).checked_mul(format_size(entry.format))?;
        let start = if size <= 4 {
            entry.pos + 8
        } else {
            self.order.read_u32(&self.tiff, entry.pos + 8) as usize
        };
        let end = start.checked_add(size)?;
        if end > self.tiff.len() {
            log::debug!("Entry 0x{:04X} value out of bounds", entry.tag);
            return None;
        }
        Some(start..end)
    }

    /// Whether an entry other than `entry` keeps its value inside `slot`.
    fn is_shared(&self, entry: &Entry, slot: &Range<usize>) -> bool {
        self.primary
            .iter()
            .chain(&self.exif)
            .filter(|other| other.pos != entry.pos)
            .filter(|other| (other.count as usize).saturating_mul(format_size(other.format)) > 4)
            .filter_map(|other| self.value_range(other))
            .any(|r| r.start < slot.end && slot.start < r.end)
    }

    /// Overwrite an existing ASCII entry with `value` plus a NUL terminator.
    fn write_ascii(&mut self, tag: Tag, value: &str) {
        let Some(entry) = self.find(tag).copied() else {
            return;
        };

        let mut data = value.as_bytes().to_vec();
        data.push(0);
        let value_field = entry.pos + 8;

        if data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..data.len()].copy_from_slice(&data);
            self.tiff[value_field..value_field + 4].copy_from_slice(&inline);
        } else {
            let old_slot = self
                .value_range(&entry)
                .filter(|r| entry.count as usize > 4 && r.len() >= data.len())
                .filter(|r| !self.is_shared(&entry, r));
            match old_slot {
                Some(slot) => {
                    let (head, tail) = self.tiff[slot].split_at_mut(data.len());
                    head.copy_from_slice(&data);
                    tail.fill(0);
                }
                None => {
                    // Keep appended values word-aligned
                    if self.tiff.len() % 2 == 1 {
                        self.tiff.push(0);
                    }
                    let offset = self.tiff.len() as u32;
                    self.tiff.extend_from_slice(&data);
                    let encoded = self.order.encode_u32(offset);
                    self.tiff[value_field..value_field + 4].copy_from_slice(&encoded);
                }
            }
        }

        let count = data.len() as u32;
        let encoded = self.order.encode_u32(count);
        self.tiff[entry.pos + 4..entry.pos + 8].copy_from_slice(&encoded);

        let entries = match tag.ifd() {
            Ifd::Primary => &mut self.primary,
            Ifd::Exif => &mut self.exif,
        };
        if let Some(e) = entries.iter_mut().find(|e| e.tag == tag.code()) {
            e.count = count;
        }
        self.modified = true;
        log::debug!("Set {} to {value:?}", tag.name());
    }
}

/// Read the entry table of the IFD at `offset`.
fn read_ifd(tiff: &[u8], order: ByteOrder, offset: usize) -> std::result::Result<Vec<Entry>, String> {
    if offset < 8 || offset + 2 > tiff.len() {
        return Err(format!("offset {offset} out of bounds"));
    }
    let count = order.read_u16(tiff, offset) as usize;
    let start = offset + 2;
    let end = start + count * ENTRY_SIZE;
    if end > tiff.len() {
        return Err(format!("{count} entries extend beyond TIFF data"));
    }

    Ok((0..count)
        .map(|i| {
            let pos = start + i * ENTRY_SIZE;
            Entry {
                tag: order.read_u16(tiff, pos),
                format: order.read_u16(tiff, pos + 2),
                count: order.read_u32(tiff, pos + 4),
                pos,
            }
        })
        .collect())
}
