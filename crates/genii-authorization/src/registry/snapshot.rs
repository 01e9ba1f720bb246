//! Immutable registry snapshot

use std::collections::{BTreeMap, BTreeSet};

use genii_core::{ActionClass, AgentId, TenantId};
use serde::Serialize;

use super::builder::RegistryBuilder;
use crate::errors::CapabilityError;
use crate::policy::ActionPolicy;
use crate::role::Role;

/// Grants held by one agent
pub type AgentGrants = BTreeMap<Role, BTreeSet<ActionClass>>;

/// Point-in-time view of a tenant's capabilities
///
/// Snapshots are never mutated. Updates go through [`RegistryBuilder`] and
/// produce a new snapshot with a higher revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub(crate) tenant_id: TenantId,
    pub(crate) revision: u64,
    pub(crate) grants: BTreeMap<AgentId, AgentGrants>,
    pub(crate) policies: BTreeMap<ActionClass, ActionPolicy>,
}

impl RegistrySnapshot {
    /// Tenant this snapshot governs
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Monotonic revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `agent` holds `role` for `action`
    pub fn authorize(&self, agent: &AgentId, role: Role, action: &ActionClass) -> bool {
        self.grants
            .get(agent)
            .and_then(|roles| roles.get(&role))
            .is_some_and(|actions| actions.contains(action))
    }

    /// Like [`authorize`](Self::authorize) but names the failing triple
    pub fn require(
        &self,
        agent: &AgentId,
        role: Role,
        action: &ActionClass,
    ) -> Result<(), CapabilityError> {
        if self.authorize(agent, role, action) {
            Ok(())
        } else {
            Err(CapabilityError::Unauthorized {
                agent: agent.clone(),
                role,
                action: action.clone(),
            })
        }
    }

    /// Auditor bound to `action`, if it currently holds the audit capability
    pub fn resolve_auditor(&self, action: &ActionClass) -> Result<AgentId, CapabilityError> {
        let policy = self
            .policies
            .get(action)
            .ok_or_else(|| CapabilityError::NoAuditorAssigned {
                action: action.clone(),
            })?;
        self.require(&policy.auditor, Role::Audit, action)?;
        Ok(policy.auditor.clone())
    }

    /// Check every party of a proposed entry and return the bound auditor
    ///
    /// Order: self-action, actor, recipient, auditor. The first failure is
    /// returned.
    pub fn authorize_parties(
        &self,
        actor: &AgentId,
        recipient: &AgentId,
        action: &ActionClass,
    ) -> Result<AgentId, CapabilityError> {
        if actor == recipient && !self.policy(action).is_some_and(|p| p.allow_self_action) {
            return Err(CapabilityError::SelfActionForbidden {
                agent: actor.clone(),
                action: action.clone(),
            });
        }
        self.require(actor, Role::Originate, action)?;
        self.require(recipient, Role::Receive, action)?;
        self.resolve_auditor(action)
    }

    /// Policy for an action class
    pub fn policy(&self, action: &ActionClass) -> Option<&ActionPolicy> {
        self.policies.get(action)
    }

    /// All policies by action class
    pub fn policies(&self) -> impl Iterator<Item = (&ActionClass, &ActionPolicy)> {
        self.policies.iter()
    }

    /// Registered agents
    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.grants.keys()
    }

    /// Grants held by an agent
    pub fn grants_for(&self, agent: &AgentId) -> Option<&AgentGrants> {
        self.grants.get(agent)
    }

    /// Start an update from this snapshot
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder::from_snapshot(self)
    }
}
