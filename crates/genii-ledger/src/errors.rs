//! Ledger error taxonomy
//!
//! - [`EntryError`]: an entry could not be created (nothing exists afterwards)
//! - [`SignatureError`]: one signing attempt was rejected (the entry is unchanged)
//! - [`ConfigError`]: startup configuration is unusable
//!
//! Verification outcomes are not errors; see
//! [`VerificationFailure`](crate::verification::VerificationFailure).

use std::path::PathBuf;

use genii_authorization::{AttestationRole, CapabilityError};
use genii_core::{AgentId, EncodingError, EntryId, KeyVersion, LedgerError, TenantId};

use crate::entry::EntryState;

/// Entry creation failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    /// A party is not authorized for its role
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Payload cannot be canonicalized
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Entry to compensate belongs to another tenant
    #[error("entry {entry_id} belongs to {actual}, not {expected}")]
    ForeignEntry {
        /// Entry that was referenced
        entry_id: EntryId,
        /// Tenant of this ledger
        expected: TenantId,
        /// Tenant of the referenced entry
        actual: TenantId,
    },
}

/// A signing attempt was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureError {
    /// Entry belongs to another tenant
    #[error("entry {entry_id} belongs to {actual}, not {expected}")]
    TenantMismatch {
        /// Entry being signed
        entry_id: EntryId,
        /// Tenant of this ledger
        expected: TenantId,
        /// Tenant of the entry
        actual: TenantId,
    },

    /// Role is not the next to sign in the entry's current state
    #[error("{role} cannot sign an entry in state {state}")]
    InvalidTransition {
        /// Current state
        state: EntryState,
        /// Role that tried to sign
        role: AttestationRole,
    },

    /// Identity presented is not the one bound to the role
    #[error("{role} slot is bound to {expected}, not {presented}")]
    IdentityMismatch {
        /// Slot being signed
        role: AttestationRole,
        /// Identity recorded on the entry
        expected: AgentId,
        /// Identity that tried to sign
        presented: AgentId,
    },

    /// Signer no longer holds the capability for its role
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Registry binds a different auditor than the one recorded on the entry
    #[error("entry is bound to auditor {bound} but the registry resolves {resolved}")]
    AuditorRebound {
        /// Auditor recorded on the entry
        bound: AgentId,
        /// Auditor the registry currently resolves
        resolved: AgentId,
    },

    /// Payload no longer matches the digest fixed at creation
    #[error("payload of entry {entry_id} changed after creation")]
    PayloadAltered {
        /// Affected entry
        entry_id: EntryId,
    },

    /// Payload cannot be canonicalized
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// No secret for the entry's key version
    #[error("no secret for key version {0}")]
    UnknownKeyVersion(KeyVersion),
}

/// Configuration could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config schema
    #[error("invalid config: {0}")]
    Parse(String),

    /// A key version has no secret available
    #[error("no secret for key version {version}{}", env_hint(.env))]
    MissingSecret {
        /// Key version lacking a secret
        version: KeyVersion,
        /// Environment variable that was consulted
        env: Option<String>,
    },

    /// Values are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Registry section failed validation
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

fn env_hint(env: &Option<String>) -> String {
    env.as_ref()
        .map(|e| format!(" (environment variable {e} is unset)"))
        .unwrap_or_default()
}

impl From<EntryError> for LedgerError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Encoding(e) => LedgerError::Encoding(e),
            other => LedgerError::permission_denied(other.to_string()),
        }
    }
}

impl From<SignatureError> for LedgerError {
    fn from(err: SignatureError) -> Self {
        LedgerError::signature(err.to_string())
    }
}

impl From<ConfigError> for LedgerError {
    fn from(err: ConfigError) -> Self {
        LedgerError::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_names_env() {
        let err = ConfigError::MissingSecret {
            version: KeyVersion::new(1),
            env: Some("LEDGER_SECRET".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "no secret for key version v1 (environment variable LEDGER_SECRET is unset)"
        );
    }

    #[test]
    fn test_conversion_to_ledger_error() {
        let err: LedgerError = SignatureError::UnknownKeyVersion(KeyVersion::new(2)).into();
        assert!(matches!(err, LedgerError::Signature { .. }));

        let err: LedgerError = EntryError::Encoding(EncodingError::NotAnObject).into();
        assert!(matches!(err, LedgerError::Encoding(EncodingError::NotAnObject)));
    }
}
