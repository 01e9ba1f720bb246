//! Capability roles and attestation roles
//!
//! A [`Role`] is what the registry grants. An [`AttestationRole`] is the slot
//! a party signs on an entry. Each attestation slot requires exactly one
//! capability role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability an agent can hold for an action class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May originate the action
    Originate,
    /// May receive the action
    Receive,
    /// May audit the action
    Audit,
}

impl Role {
    /// All roles
    pub const ALL: [Role; 3] = [Role::Originate, Role::Receive, Role::Audit];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Originate => "originate",
            Role::Receive => "receive",
            Role::Audit => "audit",
        })
    }
}

/// Signature slot on a ledger entry, in signing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationRole {
    /// Party that initiated the action
    Actor,
    /// Party that received the action
    Recipient,
    /// Independent auditor bound to the action class
    Auditor,
}

impl AttestationRole {
    /// Slots in signing order
    pub const ORDER: [AttestationRole; 3] = [
        AttestationRole::Actor,
        AttestationRole::Recipient,
        AttestationRole::Auditor,
    ];

    /// Capability the signer of this slot must hold
    pub fn required_capability(self) -> Role {
        match self {
            AttestationRole::Actor => Role::Originate,
            AttestationRole::Recipient => Role::Receive,
            AttestationRole::Auditor => Role::Audit,
        }
    }

    /// Slot that signs after this one
    pub fn next(self) -> Option<AttestationRole> {
        match self {
            AttestationRole::Actor => Some(AttestationRole::Recipient),
            AttestationRole::Recipient => Some(AttestationRole::Auditor),
            AttestationRole::Auditor => None,
        }
    }
}

impl fmt::Display for AttestationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttestationRole::Actor => "actor",
            AttestationRole::Recipient => "recipient",
            AttestationRole::Auditor => "auditor",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_map_to_capabilities() {
        assert_eq!(AttestationRole::Actor.required_capability(), Role::Originate);
        assert_eq!(AttestationRole::Recipient.required_capability(), Role::Receive);
        assert_eq!(AttestationRole::Auditor.required_capability(), Role::Audit);
    }

    #[test]
    fn test_signing_order() {
        assert_eq!(AttestationRole::Actor.next(), Some(AttestationRole::Recipient));
        assert_eq!(AttestationRole::Recipient.next(), Some(AttestationRole::Auditor));
        assert_eq!(AttestationRole::Auditor.next(), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Audit).unwrap(), "\"audit\"");
        assert_eq!(
            serde_json::from_str::<AttestationRole>("\"recipient\"").unwrap(),
            AttestationRole::Recipient
        );
    }
}
