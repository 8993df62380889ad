//! Text encodings for reading sources and writing pages.
//!
//! Only three encodings are supported: UTF-8 and the two Western European
//! single-byte sets. ISO-8859-15 differs from ISO-8859-1 in eight positions.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::GenerateError;

/// ISO-8859-15 code points that differ from ISO-8859-1, as `(byte, char)`.
const LATIN9_DIFFERENCES: [(u8, char); 8] = [
    (0xA4, '\u{20AC}'),
    (0xA6, '\u{0160}'),
    (0xA8, '\u{0161}'),
    (0xB4, '\u{017D}'),
    (0xB8, '\u{017E}'),
    (0xBC, '\u{0152}'),
    (0xBD, '\u{0153}'),
    (0xBE, '\u{0178}'),
];

/// A supported text encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// ISO-8859-15.
    Latin9,
}

impl TextEncoding {
    /// Look up an encoding by label, ignoring case.
    ///
    /// Accepts the canonical names and the aliases `utf8`, `latin1`,
    /// `latin9`, `iso8859-1` and `iso8859-15`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let encoding = match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Self::Utf8,
            "iso-8859-1" | "iso8859-1" | "iso_8859_1" | "latin1" => Self::Latin1,
            "iso-8859-15" | "iso8859-15" | "iso_8859_15" | "latin9" => Self::Latin9,
            _ => return None,
        };
        Some(encoding)
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Latin9 => "ISO-8859-15",
        }
    }

    /// Decode bytes. Returns `None` for invalid UTF-8.
    ///
    /// Single-byte encodings decode every byte sequence.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Latin9 => Some(bytes.iter().map(|&b| latin9_char(b)).collect()),
        }
    }

    /// Encode text.
    ///
    /// Characters a single-byte encoding cannot represent are written as
    /// HTML numeric character references (`&#8364;`).
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 | Self::Latin9 => {
                let mut out = Vec::with_capacity(text.len());
                for c in text.chars() {
                    match self.encode_char(c) {
                        Some(byte) => out.push(byte),
                        None => out.extend_from_slice(format!("&#{};", u32::from(c)).as_bytes()),
                    }
                }
                out
            }
        }
    }

    fn encode_char(self, c: char) -> Option<u8> {
        if self == Self::Latin9 {
            if let Some(&(byte, _)) = LATIN9_DIFFERENCES.iter().find(|(_, ch)| *ch == c) {
                return Some(byte);
            }
            // Bytes reassigned in Latin-9 no longer carry their Latin-1 characters.
            if let Ok(byte) = u8::try_from(c)
                && LATIN9_DIFFERENCES.iter().any(|(b, _)| *b == byte)
            {
                return None;
            }
        }
        u8::try_from(c).ok()
    }

    /// Read and decode a file.
    pub fn read_file(self, path: &Path) -> Result<String, GenerateError> {
        let bytes = std::fs::read(path).map_err(|e| GenerateError::read(path, e))?;
        self.decode(&bytes).ok_or_else(|| GenerateError::Decode {
            path: path.to_path_buf(),
            encoding: self.name(),
        })
    }
}

fn latin9_char(byte: u8) -> char {
    LATIN9_DIFFERENCES
        .iter()
        .find(|(b, _)| *b == byte)
        .map_or_else(|| char::from(byte), |&(_, c)| c)
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| GenerateError::UnknownEncoding(s.trim().to_owned()))
    }
}
