//! Authorization errors

use genii_core::{ActionClass, AgentId, LedgerError, TenantId};

use crate::role::Role;

/// A role, identity and action triple was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// The agent does not hold the capability
    #[error("{agent} is not authorized to {role} '{action}'")]
    Unauthorized {
        /// Rejected identity
        agent: AgentId,
        /// Role it tried to play
        role: Role,
        /// Action class involved
        action: ActionClass,
    },

    /// No policy names an auditor for the action class
    #[error("no auditor assigned for '{action}'")]
    NoAuditorAssigned {
        /// Action class without a policy
        action: ActionClass,
    },

    /// A policy names an auditor the registry does not know
    #[error("auditor {auditor} assigned to '{action}' is not a registered agent")]
    UnknownAuditor {
        /// Action class of the policy
        action: ActionClass,
        /// Unregistered auditor
        auditor: AgentId,
    },

    /// Actor and recipient are the same and the action forbids it
    #[error("{agent} cannot transact with itself for '{action}'")]
    SelfActionForbidden {
        /// The identity on both sides
        agent: AgentId,
        /// Action class involved
        action: ActionClass,
    },

    /// Snapshot belongs to another tenant
    #[error("registry for {expected} cannot accept a snapshot for {actual}")]
    TenantMismatch {
        /// Tenant of the registry
        expected: TenantId,
        /// Tenant of the offered snapshot
        actual: TenantId,
    },

    /// Offered snapshot is not newer than the installed one
    #[error("snapshot revision {proposed} is not newer than installed revision {current}")]
    StaleRevision {
        /// Installed revision
        current: u64,
        /// Offered revision
        proposed: u64,
    },
}

impl From<CapabilityError> for LedgerError {
    fn from(err: CapabilityError) -> Self {
        LedgerError::permission_denied(err.to_string())
    }
}
