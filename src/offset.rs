use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::RewriteError;

/// A UTC-offset value as it is stored in the EXIF `OffsetTime*` tags.
///
/// The text is kept verbatim: two offsets are equal only when their strings
/// are byte-for-byte equal, so `+08:00` and `+8:00` never match each other.
/// Construction only rejects text that cannot live in an EXIF ASCII field;
/// use [`OffsetString::is_canonical`] to check the `±HH:MM` shape.
///
/// # Example
///
/// ```rust
/// use tzfix::offset::OffsetString;
///
/// let offset: OffsetString = "+09:00".parse().unwrap();
/// assert!(offset.is_canonical());
/// assert_eq!(offset.hours(), Some(9));
/// assert_eq!(offset.as_str(), "+09:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OffsetString(String);

impl OffsetString {
    /// Wrap `text` as an offset value.
    pub fn new(text: impl Into<String>) -> Result<Self, RewriteError> {
        let text = text.into();
        if text.is_empty() {
            return Err(RewriteError::Argument("offset must not be empty".to_string()));
        }
        if !text.is_ascii() {
            return Err(RewriteError::Argument(format!(
                "offset {text:?} contains non-ASCII characters"
            )));
        }
        if text.contains('\0') {
            return Err(RewriteError::Argument(format!(
                "offset {text:?} contains a NUL byte"
            )));
        }
        Ok(Self(text))
    }

    /// Like [`OffsetString::new`], but also requires the `±HH:MM` form.
    pub fn new_canonical(text: impl Into<String>) -> Result<Self, RewriteError> {
        let offset = Self::new(text)?;
        if !offset.is_canonical() {
            return Err(RewriteError::Argument(format!(
                "offset {:?} is not in the ±HH:MM form",
                offset.0
            )));
        }
        Ok(offset)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the text is exactly `±HH:MM` with `HH <= 23` and `MM <= 59`.
    pub fn is_canonical(&self) -> bool {
        self.components().is_some()
    }

    /// `'+'` or `'-'` for canonical values.
    pub fn sign(&self) -> Option<char> {
        self.components().map(|(sign, _, _)| sign)
    }

    pub fn hours(&self) -> Option<u8> {
        self.components().map(|(_, hours, _)| hours)
    }

    pub fn minutes(&self) -> Option<u8> {
        self.components().map(|(_, _, minutes)| minutes)
    }

    /// Signed distance from UTC in minutes, for canonical values.
    pub fn utc_minutes(&self) -> Option<i32> {
        let magnitude = i32::from(self.hours()?) * 60 + i32::from(self.minutes()?);
        match self.sign()? {
            '-' => Some(-magnitude),
            _ => Some(magnitude),
        }
    }

    fn components(&self) -> Option<(char, u8, u8)> {
        let b = self.0.as_bytes();
        if b.len() != 6 || b[3] != b':' {
            return None;
        }
        let sign = match b[0] {
            b'+' => '+',
            b'-' => '-',
            _ => return None,
        };
        let hours = two_digits(b[1], b[2])?;
        let minutes = two_digits(b[4], b[5])?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some((sign, hours, minutes))
    }
}

fn two_digits(hi: u8, lo: u8) -> Option<u8> {
    if hi.is_ascii_digit() && lo.is_ascii_digit() {
        Some((hi - b'0') * 10 + (lo - b'0'))
    } else {
        None
    }
}

impl FromStr for OffsetString {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for OffsetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for OffsetString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OffsetString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
