//! Attestation tokens
//!
//! `token = SHA-256(canonical_payload || secret || role_identity)`, rendered
//! as 64 lowercase hex characters. Tokens from the legacy signer use the same
//! construction and compare equal.

use super::hash;
use super::keys::LedgerSecret;
use crate::canonical::CanonicalBytes;
use crate::errors::{LedgerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Length of a token in hex characters
pub const TOKEN_HEX_LEN: usize = hash::HASH_LEN * 2;

/// Compute the attestation token of `role_identity` over a canonical payload
pub fn sign(
    canonical: &CanonicalBytes,
    role_identity: &str,
    secret: &LedgerSecret,
) -> AttestationToken {
    let mut h = hash::hasher();
    h.update(canonical.as_bytes());
    h.update(secret.expose());
    h.update(role_identity.as_bytes());
    AttestationToken(h.finalize())
}

/// Fixed-length attestation token
///
/// Equality is constant-time so comparing a stored token against a
/// recomputed one does not leak how many leading bytes matched.
#[derive(Clone, Copy)]
pub struct AttestationToken([u8; hash::HASH_LEN]);

impl AttestationToken {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; hash::HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; hash::HASH_LEN] {
        &self.0
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Constant-time comparison
    pub fn ct_eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl PartialEq for AttestationToken {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other)
    }
}

impl Eq for AttestationToken {}

impl fmt::Debug for AttestationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "AttestationToken({}..)", &hex[..8])
    }
}

impl fmt::Display for AttestationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for AttestationToken {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != TOKEN_HEX_LEN {
            return Err(LedgerError::invalid(format!(
                "attestation token must be {TOKEN_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; hash::HASH_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| LedgerError::invalid(format!("attestation token is not hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for AttestationToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AttestationToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
