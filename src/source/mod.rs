//! Reading CoffeeScript sources from disk.
//!
//! Files are decoded strictly with the encoding the caller names: bytes that
//! are not valid in that encoding are an error, never replacement characters.
//! Labels resolve through the WHATWG table of `encoding_rs`, except where that
//! table would loosen the named codec:
//!
//! - ASCII labels map to windows-1252 there. Here they stay 7-bit.
//! - Bare UTF-16 labels map to UTF-16LE there. Here the byte order mark picks
//!   the endianness and is dropped, little-endian when there is none.
//! - Shift_JIS maps its user-defined rows to the Private Use Area there.
//!   Here those rows are malformed.
//!
//! Apart from bare UTF-16, no byte order mark is sniffed; a UTF-8 BOM stays in
//! the text as U+FEFF.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, SHIFT_JIS, UTF_16BE, UTF_16LE};

use crate::error::{Error, Result};

/// Placed between files compiled together.
pub const SEPARATOR: &str = "\n\n";

const ASCII_LABELS: &[&str] = &[
    "ascii",
    "us-ascii",
    "us_ascii",
    "ansi_x3.4-1968",
    "iso646-us",
    "iso-ir-6",
    "us",
    "646",
    "cp367",
    "ibm367",
    "csascii",
];

const UTF_16_LABELS: &[&str] = &[
    "utf-16",
    "utf_16",
    "utf16",
    "unicode",
    "csunicode",
    "ucs-2",
    "iso-10646-ucs-2",
];

/// Where Shift_JIS rows F0-F9 land when decoded.
const SHIFT_JIS_USER_DEFINED: std::ops::RangeInclusive<char> = '\u{E000}'..='\u{E757}';

/// A resolved encoding label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// 7-bit ASCII: any byte above 0x7F is malformed.
    Ascii,
    /// UTF-16 in the byte order its BOM announces.
    Utf16,
    Codec(&'static Encoding),
}

impl SourceEncoding {
    pub fn name(&self) -> &'static str {
        match *self {
            SourceEncoding::Ascii => "US-ASCII",
            SourceEncoding::Utf16 => "UTF-16",
            SourceEncoding::Codec(encoding) => encoding.name(),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match *self {
            SourceEncoding::Ascii => std::str::from_utf8(bytes)
                .ok()
                .filter(|text| text.is_ascii())
                .map(str::to_string),
            SourceEncoding::Utf16 => {
                let (encoding, body) = match bytes {
                    [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                    [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                    _ => (UTF_16LE, bytes),
                };
                strict(encoding, body)
            }
            SourceEncoding::Codec(encoding) => {
                let text = strict(encoding, bytes)?;
                if encoding == SHIFT_JIS
                    && text.chars().any(|c| SHIFT_JIS_USER_DEFINED.contains(&c))
                {
                    return None;
                }
                Some(text)
            }
        }
    }
}

impl From<&'static Encoding> for SourceEncoding {
    fn from(encoding: &'static Encoding) -> Self {
        SourceEncoding::Codec(encoding)
    }
}

fn strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Resolve an encoding label such as `utf-8`, `shift-jis` or `euc-jp`.
pub fn lookup_encoding(label: &str) -> Result<SourceEncoding> {
    let key = label.trim().to_ascii_lowercase();
    if ASCII_LABELS.contains(&key.as_str()) {
        return Ok(SourceEncoding::Ascii);
    }
    if UTF_16_LABELS.contains(&key.as_str()) {
        return Ok(SourceEncoding::Utf16);
    }
    Encoding::for_label(key.as_bytes())
        .map(SourceEncoding::Codec)
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Decode `bytes` read from `path`, failing on the first malformed sequence.
pub fn decode(path: &Path, bytes: &[u8], encoding: impl Into<SourceEncoding>) -> Result<String> {
    let encoding = encoding.into();
    encoding.decode(bytes).ok_or_else(|| Error::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })
}

fn read_with(path: &Path, encoding: SourceEncoding) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(path, &bytes, encoding)
}

/// Read a whole file as text in the encoding named by `label`.
pub fn read_source(path: impl AsRef<Path>, label: &str) -> Result<String> {
    let encoding = lookup_encoding(label)?;
    read_with(path.as_ref(), encoding)
}

/// Read every file in order and join them with [`SEPARATOR`].
///
/// Stops at the first file that cannot be read or decoded; nothing after it
/// is touched. An empty list yields the empty string.
pub fn read_sources<I, P>(paths: I, label: &str) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let encoding = lookup_encoding(label)?;
    let texts = paths
        .into_iter()
        .map(|path| read_with(path.as_ref(), encoding))
        .collect::<Result<Vec<_>>>()?;
    Ok(texts.join(SEPARATOR))
}
