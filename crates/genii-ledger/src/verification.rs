//! Verification engine
//!
//! Recomputes every attestation of an entry from its stored payload and
//! compares it with the stored token in constant time. The auditor slot is
//! checked against the auditor the registry currently binds to the action
//! class, so a revoked or replaced auditor is reported even when its raw
//! digest still matches.
//!
//! Verification is a pure function of (entry, registry snapshot, key ring).
//! It never mutates anything and may be repeated freely.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use genii_authorization::{AttestationRole, RegistrySnapshot};
use genii_core::{
    encode, sign, ActionClass, AgentId, EncodingError, EntryId, KeyRing, KeyVersion, TenantId,
};
use tracing::{debug, warn};

use crate::entry::LedgerEntry;

/// One reason an entry cannot be trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Entry belongs to a tenant other than the registry's
    TenantMismatch {
        /// Registry tenant
        expected: TenantId,
        /// Entry tenant
        actual: TenantId,
    },
    /// One or more signatures are absent
    Incomplete {
        /// Slots without a signature
        missing: Vec<AttestationRole>,
    },
    /// Actor and recipient are the same identity and the action forbids it
    SelfActionForbidden {
        /// The identity on both sides
        agent: AgentId,
        /// Action class of the entry
        action: ActionClass,
    },
    /// No secret for the entry's key version; digests were not checked
    UnknownKeyVersion(KeyVersion),
    /// Stored payload can no longer be canonicalized; digests were not checked
    Encoding(EncodingError),
    /// Actor token does not match
    ActorMismatch,
    /// Recipient token does not match
    RecipientMismatch,
    /// Auditor token does not match
    AuditorMismatch,
    /// Registry does not currently bind this auditor to the action class
    AuditorNotAuthorized {
        /// Auditor recorded on the entry
        auditor: AgentId,
        /// Action class of the entry
        action: ActionClass,
        /// Why the registry rejected it
        reason: String,
    },
}

/// Discriminant of a [`Finding`], for matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// See [`Finding::TenantMismatch`]
    TenantMismatch,
    /// See [`Finding::Incomplete`]
    Incomplete,
    /// See [`Finding::SelfActionForbidden`]
    SelfActionForbidden,
    /// See [`Finding::UnknownKeyVersion`]
    UnknownKeyVersion,
    /// See [`Finding::Encoding`]
    Encoding,
    /// See [`Finding::ActorMismatch`]
    ActorMismatch,
    /// See [`Finding::RecipientMismatch`]
    RecipientMismatch,
    /// See [`Finding::AuditorMismatch`]
    AuditorMismatch,
    /// See [`Finding::AuditorNotAuthorized`]
    AuditorNotAuthorized,
}

impl Finding {
    /// Discriminant
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::TenantMismatch { .. } => FindingKind::TenantMismatch,
            Finding::Incomplete { .. } => FindingKind::Incomplete,
            Finding::SelfActionForbidden { .. } => FindingKind::SelfActionForbidden,
            Finding::UnknownKeyVersion(_) => FindingKind::UnknownKeyVersion,
            Finding::Encoding(_) => FindingKind::Encoding,
            Finding::ActorMismatch => FindingKind::ActorMismatch,
            Finding::RecipientMismatch => FindingKind::RecipientMismatch,
            Finding::AuditorMismatch => FindingKind::AuditorMismatch,
            Finding::AuditorNotAuthorized { .. } => FindingKind::AuditorNotAuthorized,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::TenantMismatch { expected, actual } => {
                write!(f, "entry belongs to {actual}, registry to {expected}")
            }
            Finding::Incomplete { missing } => {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                write!(f, "missing signatures: {}", names.join(", "))
            }
            Finding::SelfActionForbidden { agent, action } => {
                write!(f, "{agent} cannot transact with itself for '{action}'")
            }
            Finding::UnknownKeyVersion(v) => write!(f, "unknown key version {v}"),
            Finding::Encoding(e) => write!(f, "payload not encodable: {e}"),
            Finding::ActorMismatch => f.write_str("actor signature mismatch"),
            Finding::RecipientMismatch => f.write_str("recipient signature mismatch"),
            Finding::AuditorMismatch => f.write_str("auditor signature mismatch"),
            Finding::AuditorNotAuthorized {
                auditor,
                action,
                reason,
            } => write!(f, "auditor {auditor} not authorized for '{action}': {reason}"),
        }
    }
}

/// Structured rejection of an entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entry_id} failed verification: {}", join_findings(.findings))]
pub struct VerificationFailure {
    /// Rejected entry
    pub entry_id: EntryId,
    /// Every check that failed, in check order; never empty
    pub findings: Vec<Finding>,
}

fn join_findings(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl VerificationFailure {
    /// First failed check
    pub fn primary(&self) -> Option<&Finding> {
        self.findings.first()
    }

    /// Whether a check of this kind failed
    pub fn contains(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.kind() == kind)
    }

    /// Kinds of all failed checks, in check order
    pub fn kinds(&self) -> Vec<FindingKind> {
        self.findings.iter().map(Finding::kind).collect()
    }

    /// Whether the failure indicates forged or altered content, as opposed to
    /// stale authorization or incomplete signing
    pub fn is_forgery(&self) -> bool {
        self.findings.iter().any(|f| {
            matches!(
                f,
                Finding::ActorMismatch | Finding::RecipientMismatch | Finding::AuditorMismatch
            )
        })
    }
}

/// An entry that passed verification
///
/// Only obtainable from [`Verifier::admit`], so accepting this type at a
/// persistence boundary guarantees nothing unverified is written.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedEntry(LedgerEntry);

impl VerifiedEntry {
    /// Borrow the entry
    pub fn entry(&self) -> &LedgerEntry {
        &self.0
    }

    /// Unwrap the entry
    pub fn into_inner(self) -> LedgerEntry {
        self.0
    }
}

impl Deref for VerifiedEntry {
    type Target = LedgerEntry;

    fn deref(&self) -> &LedgerEntry {
        &self.0
    }
}

/// Stateless verifier over one registry snapshot and key ring
#[derive(Debug, Clone)]
pub struct Verifier {
    keys: Arc<KeyRing>,
    registry: Arc<RegistrySnapshot>,
}

impl Verifier {
    /// Verifier for a fixed snapshot
    pub fn new(keys: Arc<KeyRing>, registry: Arc<RegistrySnapshot>) -> Self {
        Self { keys, registry }
    }

    /// Registry snapshot this verifier checks against
    pub fn registry(&self) -> &RegistrySnapshot {
        &self.registry
    }

    /// Check every attestation of `entry`
    pub fn verify(&self, entry: &LedgerEntry) -> Result<(), VerificationFailure> {
        let findings = self.findings(entry);
        if findings.is_empty() {
            debug!(entry = %entry.id(), "entry verified");
            return Ok(());
        }

        let failure = VerificationFailure {
            entry_id: entry.id(),
            findings,
        };
        warn!(
            entry = %entry.id(),
            tenant = %entry.tenant_id(),
            findings = ?failure.kinds(),
            "entry failed verification"
        );
        Err(failure)
    }

    /// Verify and wrap for persistence; partial entries are rejected
    pub fn admit(&self, entry: LedgerEntry) -> Result<VerifiedEntry, VerificationFailure> {
        self.verify(&entry)?;
        Ok(VerifiedEntry(entry))
    }

    fn findings(&self, entry: &LedgerEntry) -> Vec<Finding> {
        let mut findings = Vec::new();

        if entry.tenant_id() != self.registry.tenant_id() {
            findings.push(Finding::TenantMismatch {
                expected: self.registry.tenant_id(),
                actual: entry.tenant_id(),
            });
        }

        let missing = entry.missing_signatures();
        if !missing.is_empty() {
            findings.push(Finding::Incomplete { missing });
        }

        if entry.actor_id() == entry.recipient_id()
            && !self
                .registry
                .policy(entry.action())
                .is_some_and(|p| p.allow_self_action)
        {
            findings.push(Finding::SelfActionForbidden {
                agent: entry.actor_id().clone(),
                action: entry.action().clone(),
            });
        }

        match self.registry.resolve_auditor(entry.action()) {
            Ok(resolved) if &resolved == entry.auditor_id() => {}
            Ok(resolved) => findings.push(Finding::AuditorNotAuthorized {
                auditor: entry.auditor_id().clone(),
                action: entry.action().clone(),
                reason: format!("registry binds {resolved}"),
            }),
            Err(err) => findings.push(Finding::AuditorNotAuthorized {
                auditor: entry.auditor_id().clone(),
                action: entry.action().clone(),
                reason: err.to_string(),
            }),
        }

        let canonical = match encode(entry.payload()) {
            Ok(bytes) => bytes,
            Err(err) => {
                findings.push(Finding::Encoding(err));
                return findings;
            }
        };
        let Some(secret) = self.keys.get(entry.key_version()) else {
            findings.push(Finding::UnknownKeyVersion(entry.key_version()));
            return findings;
        };

        for role in AttestationRole::ORDER {
            let Some(stored) = entry.signature(role) else {
                continue;
            };
            let expected = sign(&canonical, entry.identity(role).as_str(), secret);
            if !stored.ct_eq(&expected) {
                findings.push(match role {
                    AttestationRole::Actor => Finding::ActorMismatch,
                    AttestationRole::Recipient => Finding::RecipientMismatch,
                    AttestationRole::Auditor => Finding::AuditorMismatch,
                });
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genii_authorization::{RegistryBuilder, Role};
    use genii_core::{LedgerSecret, Payload, Timestamp};

    fn agent(id: &str) -> AgentId {
        AgentId::new(id).unwrap()
    }

    fn lane() -> ActionClass {
        ActionClass::new("route_shipment").unwrap()
    }

    fn snapshot(tenant: TenantId) -> Arc<RegistrySnapshot> {
        let snapshot = RegistryBuilder::new(tenant)
            .grant(agent("OPS_LOG_001"), Role::Originate, lane())
            .grant(agent("CARRIER_API"), Role::Receive, lane())
            .grant(agent("FIN_AC_001"), Role::Audit, lane())
            .assign_auditor(lane(), agent("FIN_AC_001"))
            .build()
            .unwrap();
        Arc::new(snapshot)
    }

    fn keys() -> Arc<KeyRing> {
        Arc::new(KeyRing::single(LedgerSecret::new("verify-secret").unwrap()))
    }

    fn attested(tenant: TenantId, payload: Payload) -> LedgerEntry {
        let mut entry = LedgerEntry {
            id: EntryId::new(),
            tenant_id: tenant,
            timestamp: Timestamp::from_millis(10),
            key_version: KeyVersion::new(1),
            action: lane(),
            actor_id: agent("OPS_LOG_001"),
            recipient_id: agent("CARRIER_API"),
            auditor_id: agent("FIN_AC_001"),
            payload_digest: String::new(),
            payload,
            compensates: None,
            signatures: [None, None, None],
        };
        if let Ok(canonical) = encode(&entry.payload) {
            entry.payload_digest = canonical.digest();
            let ring = keys();
            let (_, secret) = ring.current();
            for role in AttestationRole::ORDER {
                let token = sign(&canonical, entry.identity(role).as_str(), secret);
                entry.set_signature(role, token);
            }
        }
        entry
    }

    #[test]
    fn test_valid_entry_passes() {
        let tenant = TenantId::new();
        let verifier = Verifier::new(keys(), snapshot(tenant));
        let entry = attested(tenant, Payload::new().with("qty", 4));
        assert!(verifier.verify(&entry).is_ok());
        assert_eq!(verifier.admit(entry.clone()).unwrap().into_inner(), entry);
    }

    #[test]
    fn test_findings_accumulate() {
        let tenant = TenantId::new();
        let verifier = Verifier::new(keys(), snapshot(TenantId::new()));
        let mut entry = attested(tenant, Payload::new().with("qty", 4));
        entry.signatures[2] = None;
        entry.payload.insert("qty", 40);

        let failure = verifier.verify(&entry).unwrap_err();
        assert_eq!(
            failure.kinds(),
            vec![
                FindingKind::TenantMismatch,
                FindingKind::Incomplete,
                FindingKind::ActorMismatch,
                FindingKind::RecipientMismatch,
            ]
        );
        assert_eq!(failure.primary().map(Finding::kind), Some(FindingKind::TenantMismatch));
        assert!(failure.to_string().contains("missing signatures: auditor"));
    }

    #[test]
    fn test_self_dealing_entry_is_rejected() {
        let tenant = TenantId::new();
        let verifier = Verifier::new(keys(), snapshot(tenant));
        let mut entry = attested(tenant, Payload::new().with("qty", 4));
        entry.recipient_id = agent("OPS_LOG_001");
        let canonical = encode(&entry.payload).unwrap();
        let ring = keys();
        let token = sign(&canonical, "OPS_LOG_001", ring.current().1);
        entry.set_signature(AttestationRole::Recipient, token);

        let failure = verifier.verify(&entry).unwrap_err();
        assert_eq!(
            failure.findings,
            vec![Finding::SelfActionForbidden {
                agent: agent("OPS_LOG_001"),
                action: lane(),
            }]
        );
        assert!(!failure.is_forgery());
    }

    #[test]
    fn test_unknown_key_version_skips_digests() {
        let tenant = TenantId::new();
        let verifier = Verifier::new(keys(), snapshot(tenant));
        let mut entry = attested(tenant, Payload::new());
        entry.key_version = KeyVersion::new(9);

        let failure = verifier.verify(&entry).unwrap_err();
        assert_eq!(failure.findings, vec![Finding::UnknownKeyVersion(KeyVersion::new(9))]);
        assert!(!failure.is_forgery());
    }

    #[test]
    fn test_unencodable_payload_is_reported() {
        let tenant = TenantId::new();
        let verifier = Verifier::new(keys(), snapshot(tenant));
        let entry = attested(tenant, Payload::new().with("ratio", f64::NAN));

        let failure = verifier.verify(&entry).unwrap_err();
        assert!(failure.contains(FindingKind::Encoding));
    }

    #[test]
    fn test_missing_policy_is_not_authorized() {
        let tenant = TenantId::new();
        let bare = RegistryBuilder::new(tenant).build().unwrap();
        let verifier = Verifier::new(keys(), Arc::new(bare));
        let entry = attested(tenant, Payload::new());

        let failure = verifier.verify(&entry).unwrap_err();
        assert_eq!(failure.kinds(), vec![FindingKind::AuditorNotAuthorized]);
    }
}
