//! Text encodings and decode-error policies for [`Resources::text_with`].
//!
//! [`Resources::text_with`]: crate::resource::Resources::text_with

use std::fmt;
use std::str::FromStr;

use crate::error::SupportError;

/// A text encoding resources can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    /// Canonical label, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
            Encoding::Utf16Le => "utf-16-le",
            Encoding::Utf16Be => "utf-16-be",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = SupportError;

    /// Accepts common spellings: case-insensitive, `-`/`_` interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase().replace('_', "-");
        match label.as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            "utf-16-le" | "utf-16le" | "utf16le" => Ok(Encoding::Utf16Le),
            "utf-16-be" | "utf-16be" | "utf16be" => Ok(Encoding::Utf16Be),
            _ => Err(SupportError::UnknownEncoding(s.to_string())),
        }
    }
}

/// What to do with bytes that are invalid under the chosen encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodeErrors {
    /// Fail with [`SupportError::Decode`].
    #[default]
    Strict,
    /// Substitute U+FFFD for each invalid sequence.
    Replace,
    /// Drop invalid sequences.
    Ignore,
}

impl FromStr for DecodeErrors {
    type Err = SupportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(DecodeErrors::Strict),
            "replace" => Ok(DecodeErrors::Replace),
            "ignore" => Ok(DecodeErrors::Ignore),
            _ => Err(SupportError::UnknownDecodePolicy(s.to_string())),
        }
    }
}

/// Offset of the first invalid byte, reported to the caller for strict decoding.
#[derive(Debug)]
pub(crate) struct InvalidAt(pub usize);

/// Decode `bytes` under `encoding`, applying `errors` to invalid input.
pub(crate) fn decode(
    bytes: &[u8],
    encoding: Encoding,
    errors: DecodeErrors,
) -> Result<String, InvalidAt> {
    match encoding {
        Encoding::Utf8 => decode_utf8(bytes, errors),
        Encoding::Ascii => {
            let mut out = String::with_capacity(bytes.len());
            for (i, &b) in bytes.iter().enumerate() {
                if b.is_ascii() {
                    out.push(char::from(b));
                } else {
                    invalid(&mut out, errors, i)?;
                }
            }
            Ok(out)
        }
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Encoding::Utf16Le => decode_utf16(bytes, errors, u16::from_le_bytes),
        Encoding::Utf16Be => decode_utf16(bytes, errors, u16::from_be_bytes),
    }
}

fn decode_utf8(bytes: &[u8], errors: DecodeErrors) -> Result<String, InvalidAt> {
    let mut out = String::with_capacity(bytes.len());
    let mut offset = 0;
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        offset += chunk.valid().len();
        if !chunk.invalid().is_empty() {
            invalid(&mut out, errors, offset)?;
            offset += chunk.invalid().len();
        }
    }
    Ok(out)
}

fn decode_utf16(
    bytes: &[u8],
    errors: DecodeErrors,
    unit: fn([u8; 2]) -> u16,
) -> Result<String, InvalidAt> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut out = String::with_capacity(bytes.len() / 2);
    let mut offset = 0;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                out.push(c);
                offset += 2 * c.len_utf16();
            }
            Err(_) => {
                invalid(&mut out, errors, offset)?;
                offset += 2;
            }
        }
    }
    if bytes.len() % 2 == 1 {
        invalid(&mut out, errors, bytes.len() - 1)?;
    }
    Ok(out)
}

fn invalid(out: &mut String, errors: DecodeErrors, offset: usize) -> Result<(), InvalidAt> {
    match errors {
        DecodeErrors::Strict => Err(InvalidAt(offset)),
        DecodeErrors::Replace => {
            out.push(char::REPLACEMENT_CHARACTER);
            Ok(())
        }
        DecodeErrors::Ignore => Ok(()),
    }
}
