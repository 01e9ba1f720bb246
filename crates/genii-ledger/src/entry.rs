//! Ledger entry model
//!
//! An entry is created unattested and collects signatures strictly in the
//! order actor, recipient, auditor. Its payload and parties are fixed at
//! creation; only [`TrustLedger`](crate::TrustLedger) can add signatures.

use std::fmt;

use genii_authorization::AttestationRole;
use genii_core::{
    ActionClass, AgentId, AttestationToken, EntryId, KeyVersion, Payload, TenantId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Signing progress of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// No signatures yet
    Draft,
    /// Actor has signed
    ActorSigned,
    /// Actor and recipient have signed
    RecipientSigned,
    /// All three parties have signed; terminal
    FullyAttested,
}

impl EntryState {
    /// Role allowed to sign next, `None` once fully attested
    pub fn next_role(self) -> Option<AttestationRole> {
        match self {
            EntryState::Draft => Some(AttestationRole::Actor),
            EntryState::ActorSigned => Some(AttestationRole::Recipient),
            EntryState::RecipientSigned => Some(AttestationRole::Auditor),
            EntryState::FullyAttested => None,
        }
    }

    fn from_signed_count(count: usize) -> Self {
        match count {
            0 => EntryState::Draft,
            1 => EntryState::ActorSigned,
            2 => EntryState::RecipientSigned,
            _ => EntryState::FullyAttested,
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryState::Draft => "draft",
            EntryState::ActorSigned => "actor_signed",
            EntryState::RecipientSigned => "recipient_signed",
            EntryState::FullyAttested => "fully_attested",
        })
    }
}

/// A recorded action and its attestations
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub(crate) id: EntryId,
    pub(crate) tenant_id: TenantId,
    pub(crate) timestamp: Timestamp,
    pub(crate) key_version: KeyVersion,
    pub(crate) action: ActionClass,
    pub(crate) actor_id: AgentId,
    pub(crate) recipient_id: AgentId,
    pub(crate) auditor_id: AgentId,
    pub(crate) payload: Payload,
    pub(crate) payload_digest: String,
    pub(crate) compensates: Option<EntryId>,
    /// Indexed by signing order; always a prefix of actor, recipient, auditor
    pub(crate) signatures: [Option<AttestationToken>; 3],
}

impl LedgerEntry {
    /// Entry identifier
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Owning tenant
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Creation time, strictly increasing per tenant
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Version of the secret the entry is signed under
    pub fn key_version(&self) -> KeyVersion {
        self.key_version
    }

    /// Action class
    pub fn action(&self) -> &ActionClass {
        &self.action
    }

    /// Originating party
    pub fn actor_id(&self) -> &AgentId {
        &self.actor_id
    }

    /// Receiving party
    pub fn recipient_id(&self) -> &AgentId {
        &self.recipient_id
    }

    /// Auditor bound at creation
    pub fn auditor_id(&self) -> &AgentId {
        &self.auditor_id
    }

    /// Action details
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// SHA-256 hex of the canonical payload, fixed at creation
    pub fn payload_digest(&self) -> &str {
        &self.payload_digest
    }

    /// Entry this one corrects, if any
    pub fn compensates(&self) -> Option<EntryId> {
        self.compensates
    }

    /// Identity bound to a signature slot
    pub fn identity(&self, role: AttestationRole) -> &AgentId {
        match role {
            AttestationRole::Actor => &self.actor_id,
            AttestationRole::Recipient => &self.recipient_id,
            AttestationRole::Auditor => &self.auditor_id,
        }
    }

    /// Signature in a slot, if present
    pub fn signature(&self, role: AttestationRole) -> Option<&AttestationToken> {
        self.signatures[slot(role)].as_ref()
    }

    /// Signing progress
    pub fn state(&self) -> EntryState {
        EntryState::from_signed_count(self.signatures.iter().filter(|s| s.is_some()).count())
    }

    /// Whether all three signatures are present
    ///
    /// Presence is not validity: only [`Verifier::verify`](crate::Verifier::verify)
    /// decides whether an entry can be trusted.
    pub fn is_fully_attested(&self) -> bool {
        self.state() == EntryState::FullyAttested
    }

    /// Slots still lacking a signature
    pub fn missing_signatures(&self) -> Vec<AttestationRole> {
        AttestationRole::ORDER
            .into_iter()
            .filter(|role| self.signature(*role).is_none())
            .collect()
    }

    pub(crate) fn set_signature(&mut self, role: AttestationRole, token: AttestationToken) {
        self.signatures[slot(role)] = Some(token);
    }
}

fn slot(role: AttestationRole) -> usize {
    match role {
        AttestationRole::Actor => 0,
        AttestationRole::Recipient => 1,
        AttestationRole::Auditor => 2,
    }
}
