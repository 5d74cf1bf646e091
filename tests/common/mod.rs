#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Little-endian TIFF with `Make` in IFD0 and the given ASCII tags in the Exif IFD.
pub fn exif_tiff(exif_tags: &[(u16, &str)]) -> Vec<u8> {
    let make = b"Canon\0";
    let exif_offset = 8 + 2 + 2 * 12 + 4;
    let mut data_offset = exif_offset + 2 + exif_tags.len() * 12 + 4;

    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8u32.to_le_bytes());

    // IFD0: Make, ExifIFD pointer
    out.extend_from_slice(&2u16.to_le_bytes());
    push_entry(&mut out, 0x010F, 2, make.len() as u32, data_offset as u32);
    data_offset += make.len();
    push_entry(&mut out, 0x8769, 4, 1, exif_offset as u32);
    out.extend_from_slice(&0u32.to_le_bytes());

    let mut data = make.to_vec();
    out.extend_from_slice(&(exif_tags.len() as u16).to_le_bytes());
    for (tag, value) in exif_tags {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        assert!(bytes.len() > 4, "fixture values must be stored out of line");
        push_entry(&mut out, *tag, 2, bytes.len() as u32, data_offset as u32);
        data_offset += bytes.len();
        data.extend_from_slice(&bytes);
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
    out
}

fn push_entry(out: &mut Vec<u8>, tag: u16, format: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&format.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

/// A real 32x24 JPEG, with an Exif segment when `tiff` is given.
pub fn jpeg_with_exif(tiff: Option<&[u8]>) -> Vec<u8> {
    let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 64]));
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

/// Write a photo whose three offset tags hold the given values.
pub fn write_photo(path: &Path, time: &str, digitized: &str, original: &str) {
    let tiff = exif_tiff(&[(0x9010, time), (0x9011, original), (0x9012, digitized)]);
    std::fs::write(path, jpeg_with_exif(Some(&tiff))).unwrap();
}

/// Everything from the SOS marker to the end of the file.
pub fn scan_payload(jpeg: &[u8]) -> Vec<u8> {
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos + 1] == 0xDA {
            return jpeg[pos..].to_vec();
        }
        pos += 2 + u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
    }
    panic!("no SOS marker found");
}

/// Read `(OffsetTime, OffsetTimeDigitized, OffsetTimeOriginal, Make)` with an
/// independent EXIF reader.
pub fn read_tags(path: &Path) -> [Option<String>; 4] {
    let file = std::fs::File::open(path).unwrap();
    let exif = exif::Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .unwrap();
    let text = |tag: exif::Tag| {
        exif.get_field(tag, exif::In::PRIMARY).map(|f| match &f.value {
            exif::Value::Ascii(parts) => String::from_utf8_lossy(&parts[0]).into_owned(),
            other => panic!("unexpected value {other:?}"),
        })
    };
    [
        text(exif::Tag::OffsetTime),
        text(exif::Tag::OffsetTimeDigitized),
        text(exif::Tag::OffsetTimeOriginal),
        text(exif::Tag::Make),
    ]
}
