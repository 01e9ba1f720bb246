//! Registry construction and administrative edits

use std::collections::BTreeMap;

use genii_core::{ActionClass, AgentId, TenantId};

use super::snapshot::{AgentGrants, RegistrySnapshot};
use crate::errors::CapabilityError;
use crate::policy::ActionPolicy;
use crate::role::Role;

/// Mutable draft of a registry snapshot
///
/// Used at bootstrap and inside [`CapabilityRegistry::update`](super::CapabilityRegistry::update).
/// Nothing here is visible to readers until [`build`](Self::build) produces a
/// snapshot and it is installed.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    tenant_id: TenantId,
    base_revision: u64,
    grants: BTreeMap<AgentId, AgentGrants>,
    policies: BTreeMap<ActionClass, ActionPolicy>,
}

impl RegistryBuilder {
    /// Empty registry for a tenant
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            base_revision: 0,
            grants: BTreeMap::new(),
            policies: BTreeMap::new(),
        }
    }

    pub(crate) fn from_snapshot(snapshot: &RegistrySnapshot) -> Self {
        Self {
            tenant_id: snapshot.tenant_id,
            base_revision: snapshot.revision,
            grants: snapshot.grants.clone(),
            policies: snapshot.policies.clone(),
        }
    }

    /// Register an agent without granting anything
    pub fn register(&mut self, agent: AgentId) -> &mut Self {
        self.grants.entry(agent).or_default();
        self
    }

    /// Grant `role` for `action` to `agent`, registering the agent if needed
    pub fn grant(&mut self, agent: AgentId, role: Role, action: ActionClass) -> &mut Self {
        self.grants
            .entry(agent)
            .or_default()
            .entry(role)
            .or_default()
            .insert(action);
        self
    }

    /// Withdraw one grant; the agent stays registered
    pub fn revoke(&mut self, agent: &AgentId, role: Role, action: &ActionClass) -> &mut Self {
        if let Some(roles) = self.grants.get_mut(agent) {
            if let Some(actions) = roles.get_mut(&role) {
                actions.remove(action);
                if actions.is_empty() {
                    roles.remove(&role);
                }
            }
        }
        self
    }

    /// Remove an agent and all of its grants
    pub fn revoke_agent(&mut self, agent: &AgentId) -> &mut Self {
        self.grants.remove(agent);
        self
    }

    /// Bind `auditor` to `action`, keeping the existing self-action flag
    pub fn assign_auditor(&mut self, action: ActionClass, auditor: AgentId) -> &mut Self {
        match self.policies.get_mut(&action) {
            Some(policy) => policy.auditor = auditor,
            None => {
                self.policies.insert(action, ActionPolicy::new(auditor));
            }
        }
        self
    }

    /// Install a full policy for an action class
    pub fn set_policy(&mut self, action: ActionClass, policy: ActionPolicy) -> &mut Self {
        self.policies.insert(action, policy);
        self
    }

    /// Permit or forbid actor == recipient for an action class with a policy
    pub fn allow_self_action(&mut self, action: &ActionClass, allow: bool) -> &mut Self {
        if let Some(policy) = self.policies.get_mut(action) {
            policy.allow_self_action = allow;
        }
        self
    }

    /// Validate and produce the next snapshot
    ///
    /// Every policy must name a registered agent as auditor.
    pub fn build(&self) -> Result<RegistrySnapshot, CapabilityError> {
        for (action, policy) in &self.policies {
            if !self.grants.contains_key(&policy.auditor) {
                return Err(CapabilityError::UnknownAuditor {
                    action: action.clone(),
                    auditor: policy.auditor.clone(),
                });
            }
        }
        Ok(RegistrySnapshot {
            tenant_id: self.tenant_id,
            revision: self.base_revision + 1,
            grants: self.grants.clone(),
            policies: self.policies.clone(),
        })
    }
}
