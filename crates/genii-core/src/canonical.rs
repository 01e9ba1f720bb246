//! Canonical payload encoding
//!
//! Attestations are digests over bytes, so two parties can only agree on a
//! signature if they agree on the bytes. This module fixes those bytes:
//!
//! - mapping keys sorted by code point, entries joined by `", "`, key and
//!   value separated by `": "`
//! - sequences joined by `", "`
//! - strings escaped to pure ASCII (`\uXXXX`, lowercase hex, surrogate pairs
//!   above the BMP); only printable ASCII passes through unescaped
//! - integers in plain decimal
//! - floats in shortest round-trip form, integral values with a trailing
//!   `.0`, exponent notation (`1e-05`, `1e+16`) below `1e-4` and from `1e16`
//!
//! The layout is byte-identical to the legacy swarm signer, which serialized
//! payloads as sorted-key JSON, so entries it attested still verify.

use crate::crypto::hash;
use crate::payload::{Payload, PayloadNumber, PayloadValue};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Maximum nesting depth of mappings and sequences
pub const MAX_DEPTH: usize = 64;

/// Payload could not be canonicalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EncodingError {
    /// NaN or infinite float
    #[error("non-finite number at {path}")]
    NonFiniteNumber {
        /// Location of the value, e.g. `$.limits.daily`
        path: String,
    },

    /// Nesting deeper than [`MAX_DEPTH`]
    #[error("nesting deeper than {limit} levels at {path}")]
    DepthExceeded {
        /// Location where the limit was crossed
        path: String,
        /// The configured limit
        limit: usize,
    },

    /// Top-level payload is not a mapping
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// Payload text is not valid JSON
    #[error("invalid payload JSON: {0}")]
    Json(String),
}

/// Canonical encoding of a payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Borrow the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the encoding is empty (never true for an encoded payload)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// SHA-256 of the encoding as lowercase hex
    pub fn digest(&self) -> String {
        hex::encode(hash::hash(&self.0))
    }

    /// Consume into the underlying bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Output is ASCII by construction
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Encode a payload canonically
pub fn encode(payload: &Payload) -> Result<CanonicalBytes, EncodingError> {
    let mut out = String::with_capacity(64);
    let mut path = String::from("$");
    write_mapping(&mut out, payload, &mut path, 1)?;
    Ok(CanonicalBytes(out.into_bytes()))
}

/// Canonical encoding as text
pub fn encode_to_string(payload: &Payload) -> Result<String, EncodingError> {
    let bytes = encode(payload)?.into_bytes();
    String::from_utf8(bytes).map_err(|e| EncodingError::Json(e.to_string()))
}

fn write_mapping(
    out: &mut String,
    payload: &Payload,
    path: &mut String,
    depth: usize,
) -> Result<(), EncodingError> {
    if depth > MAX_DEPTH {
        return Err(EncodingError::DepthExceeded {
            path: path.clone(),
            limit: MAX_DEPTH,
        });
    }

    let mut entries: Vec<(&String, &PayloadValue)> = payload.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");

        let mark = path.len();
        path.push('.');
        path.push_str(key);
        write_value(out, value, path, depth)?;
        path.truncate(mark);
    }
    out.push('}');
    Ok(())
}

fn write_value(
    out: &mut String,
    value: &PayloadValue,
    path: &mut String,
    depth: usize,
) -> Result<(), EncodingError> {
    match value {
        PayloadValue::Null => out.push_str("null"),
        PayloadValue::Bool(true) => out.push_str("true"),
        PayloadValue::Bool(false) => out.push_str("false"),
        PayloadValue::Number(number) => write_number(out, number, path)?,
        PayloadValue::String(s) => write_string(out, s),
        PayloadValue::Sequence(items) => {
            if depth + 1 > MAX_DEPTH {
                return Err(EncodingError::DepthExceeded {
                    path: path.clone(),
                    limit: MAX_DEPTH,
                });
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let mark = path.len();
                let _ = write!(path, "[{i}]");
                write_value(out, item, path, depth + 1)?;
                path.truncate(mark);
            }
            out.push(']');
        }
        PayloadValue::Mapping(nested) => write_mapping(out, nested, path, depth + 1)?,
    }
    Ok(())
}

fn write_number(
    out: &mut String,
    number: &PayloadNumber,
    path: &str,
) -> Result<(), EncodingError> {
    match *number {
        PayloadNumber::Signed(n) => {
            let _ = write!(out, "{n}");
        }
        PayloadNumber::Unsigned(n) => {
            let _ = write!(out, "{n}");
        }
        PayloadNumber::Float(f) if f.is_finite() => write_float(out, f),
        PayloadNumber::Float(_) => {
            return Err(EncodingError::NonFiniteNumber {
                path: path.to_string(),
            })
        }
    }
    Ok(())
}

/// Shortest round-trip digits, positional for decimal exponents in `-4..16`
/// and `d.ddde±XX` outside it. Integral values keep a trailing `.0`.
fn write_float(out: &mut String, f: f64) {
    let scientific = format!("{f:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mantissa = match mantissa.strip_prefix('-') {
        Some(rest) => {
            out.push('-');
            rest
        }
        None => mantissa,
    };

    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "{mantissa}e{sign}{:02}", exponent.unsigned_abs());
        return;
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    if exponent < 0 {
        out.push_str("0.");
        for _ in 1..exponent.unsigned_abs() {
            out.push('0');
        }
        out.push_str(&digits);
        return;
    }

    let point = exponent.unsigned_abs() as usize + 1;
    if digits.len() <= point {
        out.push_str(&digits);
        for _ in digits.len()..point {
            out.push('0');
        }
        out.push_str(".0");
    } else {
        let (whole, fraction) = digits.split_at(point);
        let _ = write!(out, "{whole}.{fraction}");
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
