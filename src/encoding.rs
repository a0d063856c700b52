//! Text encodings for binary values on the command line.
//!
//! Every command that prints or accepts raw bytes (random bytes, keys,
//! digests, Diffie-Hellman numbers) goes through `Encoding`.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine;

use crate::errors::{CryptkitError, Result};

/// Supported binary-to-text encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Base64,
    Base64Url,
    /// One char per byte (`U+0000`..`U+00FF`). Also accepted as `binary`.
    Latin1,
    /// 7-bit text; the high bit of every byte is dropped on output.
    Ascii,
    Utf8,
    /// Little-endian UTF-16. Also accepted as `ucs2`.
    Utf16Le,
}

impl Encoding {
    /// Encode raw bytes into a string.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => BASE64.encode(bytes),
            Self::Base64Url => BASE64_URL.encode(bytes),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Ascii => bytes.iter().map(|&b| char::from(b & 0x7f)).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            // A trailing odd byte is not a code unit and is dropped.
            Self::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
        }
    }

    /// Decode a string back into raw bytes.
    pub fn decode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Hex => hex::decode(text.trim())
                .map_err(|e| CryptkitError::InvalidParameter(format!("malformed hex input: {e}"))),
            Self::Base64 => BASE64.decode(text.trim()).map_err(|e| {
                CryptkitError::InvalidParameter(format!("malformed base64 input: {e}"))
            }),
            Self::Base64Url => BASE64_URL
                .decode(text.trim().trim_end_matches('='))
                .map_err(|e| {
                    CryptkitError::InvalidParameter(format!("malformed base64url input: {e}"))
                }),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        CryptkitError::InvalidParameter(format!(
                            "character '{c}' cannot be represented in latin1"
                        ))
                    })
                })
                .collect(),
            Self::Ascii => text
                .chars()
                .map(|c| {
                    if c.is_ascii() {
                        Ok(c as u8)
                    } else {
                        Err(CryptkitError::InvalidParameter(format!(
                            "character '{c}' is not ascii"
                        )))
                    }
                })
                .collect(),
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        }
    }
}

impl FromStr for Encoding {
    type Err = CryptkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ascii" => Ok(Self::Ascii),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Self::Utf16Le),
            other => Err(CryptkitError::InvalidParameter(format!(
                "unknown encoding '{other}' — supported: hex, base64, base64url, latin1, ascii, utf8, utf16le"
            ))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
        };
        f.write_str(name)
    }
}
