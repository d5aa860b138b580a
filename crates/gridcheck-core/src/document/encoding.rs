//! Text decoding with an encoding-fallback ladder.
//!
//! Exported sheets come from many locales, so the bytes are tried against
//! a fixed list of encodings in order. If none of them decodes cleanly the
//! file is read as UTF-8 with replacement characters and a warning is
//! logged. Only a missing or unreadable file is an error.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextEncoding {
    /// UTF-8 without a byte order mark.
    Utf8,
    /// UTF-8 with a leading byte order mark, which is dropped.
    Utf8Sig,
    Latin1,
    Windows1252,
    Gbk,
    Cp1251,
    Iso8859_1,
}

pub const FALLBACK_ORDER: [TextEncoding; 7] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
    TextEncoding::Gbk,
    TextEncoding::Cp1251,
    TextEncoding::Iso8859_1,
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Gbk => "gbk",
            TextEncoding::Cp1251 => "cp1251",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Strict decode: `None` if any byte sequence is invalid.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM)?;
                std::str::from_utf8(body).ok().map(str::to_string)
            }
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(bytes.iter().map(|&b| b as char).collect())
            }
            TextEncoding::Windows1252 => decode_with(encoding_rs::WINDOWS_1252, bytes),
            TextEncoding::Gbk => decode_with(encoding_rs::GBK, bytes),
            TextEncoding::Cp1251 => decode_with(encoding_rs::WINDOWS_1251, bytes),
        }
    }
}

fn decode_with(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Decoded file content plus the encoding that produced it (`None` for the
/// permissive fallback).
#[derive(Clone, Debug)]
pub struct DecodedText {
    pub text: String,
    pub encoding: Option<TextEncoding>,
}

pub fn decode_bytes(bytes: &[u8], origin: &Path) -> DecodedText {
    for encoding in FALLBACK_ORDER {
        match encoding.decode(bytes) {
            Some(text) => {
                if matches!(encoding, TextEncoding::Utf8 | TextEncoding::Utf8Sig) {
                    debug!(path = %origin.display(), encoding = encoding.label(), "decoded text file");
                } else {
                    warn!(path = %origin.display(), encoding = encoding.label(), "text file is not UTF-8");
                }
                return DecodedText {
                    text,
                    encoding: Some(encoding),
                };
            }
            None => {
                debug!(path = %origin.display(), encoding = encoding.label(), "decode attempt failed");
            }
        }
    }

    warn!(path = %origin.display(), "read text file with UTF-8 and error replacement");
    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: None,
    }
}

/// Read a whole text file through the fallback ladder.
pub fn read_text(path: &Path) -> Result<DecodedText> {
    let bytes = std::fs::read(path)?;
    Ok(decode_bytes(&bytes, path))
}

/// Read a text file as lines, split by [`split_lines`].
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(split_lines(&read_text(path)?.text))
}

/// Split on every Unicode line boundary: `\n`, `\r\n`, a lone `\r`, the
/// vertical tab and form feed, the file/group/record separators, NEL, and
/// the line and paragraph separators. A final break does not produce an
/// empty last line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}' => {
                lines.push(std::mem::take(&mut current))
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Drop blank lines from the end only; leading blanks are kept.
pub fn trim_trailing_blank_lines(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}
