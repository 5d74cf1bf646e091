//! Fixture builders shared by the unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

/// Build TIFF data with ASCII entries in IFD0 and the Exif sub-IFD.
///
/// IFD0 always carries the Exif pointer as its last entry, so callers should
/// only pass IFD0 tags below 0x8769.
pub fn build_tiff(big_endian: bool, ifd0: &[(u16, &str)], exif: &[(u16, &str)]) -> Vec<u8> {
    let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let ifd0_len = 2 + (ifd0.len() + 1) * 12 + 4;
    let exif_offset = 8 + ifd0_len;
    let exif_len = 2 + exif.len() * 12 + 4;
    let mut data_offset = exif_offset + exif_len;
    let mut data_area = Vec::new();

    let mut encode = |entries: &[(u16, &str)], out: &mut Vec<u8>| {
        for (tag, value) in entries {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            out.extend_from_slice(&u16b(*tag));
            out.extend_from_slice(&u16b(2));
            out.extend_from_slice(&u32b(bytes.len() as u32));
            if bytes.len() <= 4 {
                let mut inline = [0u8; 4];
                inline[..bytes.len()].copy_from_slice(&bytes);
                out.extend_from_slice(&inline);
            } else {
                out.extend_from_slice(&u32b(data_offset as u32));
                data_offset += bytes.len();
                data_area.extend_from_slice(&bytes);
            }
        }
    };

    let mut out = Vec::new();
    out.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    out.extend_from_slice(&u16b(42));
    out.extend_from_slice(&u32b(8));

    out.extend_from_slice(&u16b((ifd0.len() + 1) as u16));
    encode(ifd0, &mut out);
    out.extend_from_slice(&u16b(0x8769));
    out.extend_from_slice(&u16b(4));
    out.extend_from_slice(&u32b(1));
    out.extend_from_slice(&u32b(exif_offset as u32));
    out.extend_from_slice(&u32b(0));

    out.extend_from_slice(&u16b(exif.len() as u16));
    encode(exif, &mut out);
    out.extend_from_slice(&u32b(0));

    out.extend_from_slice(&data_area);
    out
}

/// The three offset tags, all holding `value`.
pub fn all_offsets(value: &str) -> Vec<(u16, &str)> {
    vec![(0x9010, value), (0x9011, value), (0x9012, value)]
}

/// TIFF data whose three offset tags hold `value`, padded with a long `Make`
/// so the Exif segment sits a few dozen bytes below the APP1 size limit.
pub fn near_full_tiff(value: &str) -> Vec<u8> {
    let make = "M".repeat(65_400);
    build_tiff(false, &[(0x010F, make.as_str())], &all_offsets(value))
}

/// Encode a small gradient as a real JPEG, optionally with an Exif APP1 segment.
pub fn sample_jpeg(tiff: Option<&[u8]>) -> Vec<u8> {
    let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 128]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Jpeg)
        .unwrap();

    let mut jpeg = Jpeg::from_bytes(Bytes::from(cursor.into_inner())).unwrap();
    if let Some(tiff) = tiff {
        jpeg.set_exif(Some(Bytes::copy_from_slice(tiff)));
    }
    jpeg.encoder().bytes().to_vec()
}

/// Everything from the SOS marker to the end of the file.
pub fn scan_payload(jpeg: &[u8]) -> &[u8] {
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        assert_eq!(jpeg[pos], 0xFF, "expected a marker at {pos}");
        if jpeg[pos + 1] == 0xDA {
            return &jpeg[pos..];
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        pos += 2 + len;
    }
    panic!("no SOS marker found");
}
