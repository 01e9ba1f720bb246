//! Signing workflow
//!
//! [`TrustLedger`] is the only place entries are created or signed. Every
//! operation checks the parties against the current registry snapshot, and
//! each signature is computed by the ledger itself from the entry's stored
//! payload, so a caller can never hand in a token of its own.

use std::sync::Arc;

use genii_authorization::{AttestationRole, CapabilityError, CapabilityRegistry};
use genii_core::{
    encode, sign, ActionClass, AgentId, EntryId, KeyRing, Payload, TenantClock, TenantId,
};
use tracing::{debug, info};

use crate::entry::LedgerEntry;
use crate::errors::{EntryError, SignatureError};
use crate::verification::{VerificationFailure, VerifiedEntry, Verifier};

/// Triple-entry ledger for one tenant
#[derive(Debug)]
pub struct TrustLedger {
    keys: Arc<KeyRing>,
    registry: Arc<CapabilityRegistry>,
    clock: TenantClock,
}

impl TrustLedger {
    /// Ledger over the registry's tenant
    pub fn new(keys: Arc<KeyRing>, registry: Arc<CapabilityRegistry>, clock: TenantClock) -> Self {
        Self {
            keys,
            registry,
            clock,
        }
    }

    /// Tenant this ledger serves
    pub fn tenant_id(&self) -> TenantId {
        self.registry.tenant_id()
    }

    /// Shared registry handle, for administrative updates
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Key ring entries are signed under
    pub fn keys(&self) -> &Arc<KeyRing> {
        &self.keys
    }

    /// Record a new unattested entry
    ///
    /// Fails without creating anything if any party lacks its capability,
    /// no auditor resolves for `action`, or the payload cannot be encoded.
    pub fn create_entry(
        &self,
        action: &ActionClass,
        actor: &AgentId,
        recipient: &AgentId,
        payload: Payload,
    ) -> Result<LedgerEntry, EntryError> {
        self.build_entry(action, actor, recipient, payload, None)
    }

    /// Record an entry that corrects an earlier, verified one
    ///
    /// The new entry reuses the original's action class and must be signed
    /// by its own parties; the original is left untouched.
    pub fn create_compensating_entry(
        &self,
        original: &VerifiedEntry,
        actor: &AgentId,
        recipient: &AgentId,
        payload: Payload,
    ) -> Result<LedgerEntry, EntryError> {
        if original.tenant_id() != self.tenant_id() {
            return Err(EntryError::ForeignEntry {
                entry_id: original.id(),
                expected: self.tenant_id(),
                actual: original.tenant_id(),
            });
        }
        self.build_entry(original.action(), actor, recipient, payload, Some(original.id()))
    }

    fn build_entry(
        &self,
        action: &ActionClass,
        actor: &AgentId,
        recipient: &AgentId,
        payload: Payload,
        compensates: Option<EntryId>,
    ) -> Result<LedgerEntry, EntryError> {
        let snapshot = self.registry.snapshot();
        let auditor = snapshot.authorize_parties(actor, recipient, action)?;
        let canonical = encode(&payload)?;

        let entry = LedgerEntry {
            id: EntryId::new(),
            tenant_id: self.tenant_id(),
            timestamp: self.clock.next(),
            key_version: self.keys.current_version(),
            action: action.clone(),
            actor_id: actor.clone(),
            recipient_id: recipient.clone(),
            auditor_id: auditor,
            payload_digest: canonical.digest(),
            payload,
            compensates,
            signatures: [None, None, None],
        };
        info!(
            entry = %entry.id,
            tenant = %entry.tenant_id,
            action = %entry.action,
            actor = %entry.actor_id,
            recipient = %entry.recipient_id,
            auditor = %entry.auditor_id,
            compensates = ?entry.compensates,
            "ledger entry created"
        );
        Ok(entry)
    }

    /// Add the signature for `role`, presented by `identity`
    ///
    /// Returns the updated entry; on error the input is unchanged.
    pub fn sign_as(
        &self,
        entry: &LedgerEntry,
        role: AttestationRole,
        identity: &AgentId,
    ) -> Result<LedgerEntry, SignatureError> {
        if entry.tenant_id() != self.tenant_id() {
            return Err(SignatureError::TenantMismatch {
                entry_id: entry.id(),
                expected: self.tenant_id(),
                actual: entry.tenant_id(),
            });
        }

        let state = entry.state();
        if state.next_role() != Some(role) {
            return Err(SignatureError::InvalidTransition { state, role });
        }

        let bound = entry.identity(role);
        if bound != identity {
            return Err(SignatureError::IdentityMismatch {
                role,
                expected: bound.clone(),
                presented: identity.clone(),
            });
        }

        let snapshot = self.registry.snapshot();
        if entry.actor_id() == entry.recipient_id()
            && !snapshot
                .policy(entry.action())
                .is_some_and(|p| p.allow_self_action)
        {
            return Err(CapabilityError::SelfActionForbidden {
                agent: entry.actor_id().clone(),
                action: entry.action().clone(),
            }
            .into());
        }
        match role {
            AttestationRole::Auditor => {
                let resolved = snapshot.resolve_auditor(entry.action())?;
                if &resolved != bound {
                    return Err(SignatureError::AuditorRebound {
                        bound: bound.clone(),
                        resolved,
                    });
                }
            }
            AttestationRole::Actor | AttestationRole::Recipient => {
                snapshot.require(identity, role.required_capability(), entry.action())?;
            }
        }

        let canonical = encode(entry.payload())?;
        if canonical.digest() != entry.payload_digest() {
            return Err(SignatureError::PayloadAltered {
                entry_id: entry.id(),
            });
        }
        let secret = self
            .keys
            .get(entry.key_version())
            .ok_or(SignatureError::UnknownKeyVersion(entry.key_version()))?;

        let mut signed = entry.clone();
        signed.set_signature(role, sign(&canonical, identity.as_str(), secret));
        debug!(
            entry = %signed.id,
            role = %role,
            state = %signed.state(),
            "attestation added"
        );
        Ok(signed)
    }

    /// Collect every remaining signature in order, each by its bound identity
    ///
    /// Only for orchestrators that legitimately act for all three parties.
    pub fn attest_all(&self, entry: &LedgerEntry) -> Result<LedgerEntry, SignatureError> {
        let mut current = entry.clone();
        while let Some(role) = current.state().next_role() {
            let identity = current.identity(role).clone();
            current = self.sign_as(&current, role, &identity)?;
        }
        Ok(current)
    }

    /// Verifier bound to the current registry snapshot
    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.keys.clone(), self.registry.snapshot())
    }

    /// Verify against the current registry snapshot
    pub fn verify(&self, entry: &LedgerEntry) -> Result<(), VerificationFailure> {
        self.verifier().verify(entry)
    }

    /// Verify and wrap for persistence
    pub fn admit(&self, entry: LedgerEntry) -> Result<VerifiedEntry, VerificationFailure> {
        self.verifier().admit(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryState;
    use crate::verification::FindingKind;
    use genii_authorization::{RegistryBuilder, Role};
    use genii_core::{LedgerSecret, TimeSource};

    struct Frozen;

    impl TimeSource for Frozen {
        fn now_ms(&self) -> u64 {
            1_000
        }
    }

    fn agent(id: &str) -> AgentId {
        AgentId::new(id).unwrap()
    }

    fn spend() -> ActionClass {
        ActionClass::new("pause_campaign").unwrap()
    }

    fn ledger() -> TrustLedger {
        let snapshot = RegistryBuilder::new(TenantId::new())
            .grant(agent("MKT_PA_001"), Role::Originate, spend())
            .grant(agent("META_ADS_API"), Role::Receive, spend())
            .grant(agent("FIN_AC_001"), Role::Audit, spend())
            .assign_auditor(spend(), agent("FIN_AC_001"))
            .build()
            .unwrap();
        let keys = KeyRing::single(LedgerSecret::new("workflow-secret").unwrap());
        TrustLedger::new(
            Arc::new(keys),
            Arc::new(CapabilityRegistry::new(snapshot)),
            TenantClock::new(Arc::new(Frozen)),
        )
    }

    fn draft(ledger: &TrustLedger) -> LedgerEntry {
        ledger
            .create_entry(
                &spend(),
                &agent("MKT_PA_001"),
                &agent("META_ADS_API"),
                Payload::new().with("campaign", "summer").with("spend", 500),
            )
            .unwrap()
    }

    #[test]
    fn test_create_binds_registry_auditor() {
        let ledger = ledger();
        let entry = draft(&ledger);
        assert_eq!(entry.state(), EntryState::Draft);
        assert_eq!(entry.auditor_id(), &agent("FIN_AC_001"));
        assert_eq!(entry.tenant_id(), ledger.tenant_id());
        assert_eq!(entry.key_version().value(), 1);
        assert_eq!(entry.payload_digest(), encode(entry.payload()).unwrap().digest());
    }

    #[test]
    fn test_timestamps_increase_under_frozen_clock() {
        let ledger = ledger();
        let a = draft(&ledger);
        let b = draft(&ledger);
        assert!(b.timestamp() > a.timestamp());
    }

    #[test]
    fn test_unauthorized_actor_creates_nothing() {
        let ledger = ledger();
        let err = ledger
            .create_entry(
                &spend(),
                &agent("SLS_BD_001"),
                &agent("META_ADS_API"),
                Payload::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EntryError::Capability(CapabilityError::Unauthorized { role: Role::Originate, .. })
        ));
    }

    #[test]
    fn test_sign_in_order_then_verify() {
        let ledger = ledger();
        let entry = draft(&ledger);
        let entry = ledger
            .sign_as(&entry, AttestationRole::Actor, &agent("MKT_PA_001"))
            .unwrap();
        let entry = ledger
            .sign_as(&entry, AttestationRole::Recipient, &agent("META_ADS_API"))
            .unwrap();
        let entry = ledger
            .sign_as(&entry, AttestationRole::Auditor, &agent("FIN_AC_001"))
            .unwrap();
        assert!(entry.is_fully_attested());
        assert!(ledger.verify(&entry).is_ok());
    }

    #[test]
    fn test_out_of_order_signing_rejected() {
        let ledger = ledger();
        let entry = draft(&ledger);
        let err = ledger
            .sign_as(&entry, AttestationRole::Recipient, &agent("META_ADS_API"))
            .unwrap_err();
        assert_eq!(
            err,
            SignatureError::InvalidTransition {
                state: EntryState::Draft,
                role: AttestationRole::Recipient,
            }
        );

        let done = ledger.attest_all(&entry).unwrap();
        let err = ledger
            .sign_as(&done, AttestationRole::Auditor, &agent("FIN_AC_001"))
            .unwrap_err();
        assert!(matches!(
            err,
            SignatureError::InvalidTransition {
                state: EntryState::FullyAttested,
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_identity_rejected() {
        let ledger = ledger();
        let entry = draft(&ledger);
        let err = ledger
            .sign_as(&entry, AttestationRole::Actor, &agent("FIN_AC_001"))
            .unwrap_err();
        assert!(matches!(err, SignatureError::IdentityMismatch { .. }));
        assert_eq!(entry.state(), EntryState::Draft);
    }

    #[test]
    fn test_altered_payload_cannot_be_signed() {
        let ledger = ledger();
        let mut entry = draft(&ledger);
        entry.payload.insert("spend", 5000);
        let err = ledger
            .sign_as(&entry, AttestationRole::Actor, &agent("MKT_PA_001"))
            .unwrap_err();
        assert_eq!(err, SignatureError::PayloadAltered { entry_id: entry.id() });
    }

    #[test]
    fn test_partial_entry_is_not_admitted() {
        let ledger = ledger();
        let entry = draft(&ledger);
        let entry = ledger
            .sign_as(&entry, AttestationRole::Actor, &agent("MKT_PA_001"))
            .unwrap();
        let failure = ledger.admit(entry).unwrap_err();
        assert_eq!(failure.kinds(), vec![FindingKind::Incomplete]);
    }

    #[test]
    fn test_compensating_entry_references_original() {
        let ledger = ledger();
        let original = ledger.admit(ledger.attest_all(&draft(&ledger)).unwrap()).unwrap();
        let correction = ledger
            .create_compensating_entry(
                &original,
                &agent("MKT_PA_001"),
                &agent("META_ADS_API"),
                Payload::new().with("spend", -500),
            )
            .unwrap();
        assert_eq!(correction.compensates(), Some(original.id()));
        assert_eq!(correction.action(), original.action());
        assert!(ledger.admit(ledger.attest_all(&correction).unwrap()).is_ok());
    }

    #[test]
    fn test_foreign_entry_cannot_be_compensated() {
        let ours = ledger();
        let theirs = ledger();
        let original = theirs
            .admit(theirs.attest_all(&draft(&theirs)).unwrap())
            .unwrap();
        let err = ours
            .create_compensating_entry(
                &original,
                &agent("MKT_PA_001"),
                &agent("META_ADS_API"),
                Payload::new(),
            )
            .unwrap_err();
        assert!(matches!(err, EntryError::ForeignEntry { .. }));
    }
}
