//! Per-action-class policy

use genii_core::AgentId;
use serde::{Deserialize, Serialize};

/// Policy attached to an action class
///
/// Names the auditor bound to every entry of the class. Auditor assignment
/// is configuration, so different tenants and different action classes can
/// be audited by different agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPolicy {
    /// Auditor bound to entries of this class
    pub auditor: AgentId,

    /// Whether actor and recipient may be the same identity (e.g. internal audits)
    #[serde(default)]
    pub allow_self_action: bool,
}

impl ActionPolicy {
    /// Policy with the given auditor and self-action forbidden
    pub fn new(auditor: AgentId) -> Self {
        Self {
            auditor,
            allow_self_action: false,
        }
    }

    /// Permit actor == recipient
    pub fn allowing_self_action(mut self) -> Self {
        self.allow_self_action = true;
        self
    }
}
