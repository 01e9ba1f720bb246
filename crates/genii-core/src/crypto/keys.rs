//! Shared secrets and the versioned key ring
//!
//! The secret is process-wide configuration: loaded once at startup, never
//! logged, never serialized. Rotation adds a new version to the ring; entries
//! remember the version they were signed under and verification selects the
//! matching secret.

use crate::errors::{LedgerError, Result};
use crate::identifiers::KeyVersion;
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shared ledger secret, zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LedgerSecret(Vec<u8>);

impl LedgerSecret {
    /// Wrap secret material; empty secrets are rejected
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = secret.into();
        if bytes.is_empty() {
            return Err(LedgerError::config("ledger secret must not be empty"));
        }
        Ok(Self(bytes))
    }

    /// Secret bytes, for digest input only
    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for LedgerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LedgerSecret(<redacted>)")
    }
}

/// Ordered set of secrets keyed by version
pub struct KeyRing {
    secrets: BTreeMap<KeyVersion, LedgerSecret>,
    current: KeyVersion,
}

impl KeyRing {
    /// Build a ring; the highest version becomes current
    pub fn new(entries: impl IntoIterator<Item = (KeyVersion, LedgerSecret)>) -> Result<Self> {
        let mut secrets = BTreeMap::new();
        for (version, secret) in entries {
            if secrets.insert(version, secret).is_some() {
                return Err(LedgerError::config(format!(
                    "duplicate secret for key version {version}"
                )));
            }
        }
        let current = *secrets
            .keys()
            .next_back()
            .ok_or_else(|| LedgerError::config("key ring must hold at least one secret"))?;
        Ok(Self { secrets, current })
    }

    /// Ring holding a single secret as version 1
    pub fn single(secret: LedgerSecret) -> Self {
        let mut secrets = BTreeMap::new();
        secrets.insert(KeyVersion::new(1), secret);
        Self {
            secrets,
            current: KeyVersion::new(1),
        }
    }

    /// Pin the version used for new entries
    pub fn with_current(mut self, version: KeyVersion) -> Result<Self> {
        if !self.secrets.contains_key(&version) {
            return Err(LedgerError::config(format!(
                "current key version {version} has no secret"
            )));
        }
        self.current = version;
        Ok(self)
    }

    /// Version used to sign new entries
    pub fn current_version(&self) -> KeyVersion {
        self.current
    }

    /// Secret used to sign new entries
    pub fn current(&self) -> (KeyVersion, &LedgerSecret) {
        // current is validated at construction
        (self.current, &self.secrets[&self.current])
    }

    /// Secret for a specific version
    pub fn get(&self, version: KeyVersion) -> Option<&LedgerSecret> {
        self.secrets.get(&version)
    }

    /// Known versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = KeyVersion> + '_ {
        self.secrets.keys().copied()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("versions", &self.secrets.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}
