//! Flat record form for storage and transport collaborators
//!
//! Every field is a scalar so the record maps onto a table row or a JSON
//! line. The payload is stored as its canonical JSON text. Parsing a record
//! never re-signs or repairs anything; tampered records load fine and fail
//! verification.

use std::str::FromStr;

use genii_authorization::AttestationRole;
use genii_core::{
    canonical, ActionClass, AgentId, AttestationToken, EntryId, KeyVersion, LedgerError, Payload,
    Result, TenantId, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::entry::LedgerEntry;

/// Flat mapping of a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Entry UUID
    pub id: String,
    /// Tenant UUID
    pub tenant_id: String,
    /// Unix milliseconds
    pub timestamp: u64,
    /// Secret version
    pub key_version: u32,
    /// Action class label
    pub action: String,
    /// Originating identity
    pub actor_id: String,
    /// Receiving identity
    pub recipient_id: String,
    /// Bound auditor identity
    pub auditor_id: String,
    /// Canonical payload JSON
    pub payload: String,
    /// SHA-256 hex of the canonical payload at creation
    pub payload_digest: String,
    /// UUID of the entry this one compensates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensates: Option<String>,
    /// Actor attestation, hex
    #[serde(default)]
    pub actor_sig: Option<String>,
    /// Recipient attestation, hex
    #[serde(default)]
    pub recipient_sig: Option<String>,
    /// Auditor attestation, hex
    #[serde(default)]
    pub auditor_sig: Option<String>,
}

impl LedgerEntry {
    /// Flatten for a persistence collaborator
    pub fn to_record(&self) -> Result<EntryRecord> {
        let sig = |role| self.signature(role).map(AttestationToken::to_hex);
        Ok(EntryRecord {
            id: self.id.uuid().to_string(),
            tenant_id: self.tenant_id.uuid().to_string(),
            timestamp: self.timestamp.as_millis(),
            key_version: self.key_version.value(),
            action: self.action.to_string(),
            actor_id: self.actor_id.to_string(),
            recipient_id: self.recipient_id.to_string(),
            auditor_id: self.auditor_id.to_string(),
            payload: canonical::encode_to_string(&self.payload)?,
            payload_digest: self.payload_digest.clone(),
            compensates: self.compensates.map(|id| id.uuid().to_string()),
            actor_sig: sig(AttestationRole::Actor),
            recipient_sig: sig(AttestationRole::Recipient),
            auditor_sig: sig(AttestationRole::Auditor),
        })
    }
}

fn parse_token(field: &str, value: Option<&String>) -> Result<Option<AttestationToken>> {
    value
        .map(|hex| {
            AttestationToken::from_str(hex)
                .map_err(|e| LedgerError::invalid(format!("{field}: {e}")))
        })
        .transpose()
}

impl TryFrom<EntryRecord> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(record: EntryRecord) -> Result<Self> {
        let signatures = [
            parse_token("actor_sig", record.actor_sig.as_ref())?,
            parse_token("recipient_sig", record.recipient_sig.as_ref())?,
            parse_token("auditor_sig", record.auditor_sig.as_ref())?,
        ];
        let signed = signatures.iter().take_while(|s| s.is_some()).count();
        if signatures[signed..].iter().any(Option::is_some) {
            return Err(LedgerError::invalid(
                "signatures must be collected in actor, recipient, auditor order",
            ));
        }

        let digest = record.payload_digest.trim().to_ascii_lowercase();
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LedgerError::invalid("payload_digest must be 64 hex characters"));
        }

        Ok(LedgerEntry {
            id: record.id.parse()?,
            tenant_id: record.tenant_id.parse()?,
            timestamp: Timestamp::from_millis(record.timestamp),
            key_version: KeyVersion::new(record.key_version),
            action: ActionClass::new(record.action)?,
            actor_id: AgentId::new(record.actor_id)?,
            recipient_id: AgentId::new(record.recipient_id)?,
            auditor_id: AgentId::new(record.auditor_id)?,
            payload: Payload::from_json_str(&record.payload)?,
            payload_digest: digest,
            compensates: record
                .compensates
                .as_deref()
                .map(EntryId::from_str)
                .transpose()?,
            signatures,
        })
    }
}
