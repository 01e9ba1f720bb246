//! Capability registry handle
//!
//! Readers take an `Arc` of the current snapshot and work against it for the
//! whole check. Administrators replace the snapshot wholesale under a write
//! lock; in-flight readers keep the snapshot they started with.

mod builder;
mod snapshot;

pub use builder::RegistryBuilder;
pub use snapshot::{AgentGrants, RegistrySnapshot};

use std::sync::Arc;

use genii_core::{ActionClass, AgentId, TenantId};
use parking_lot::RwLock;
use tracing::info;

use crate::errors::CapabilityError;
use crate::role::Role;

/// Shared, atomically swappable registry for one tenant
#[derive(Debug)]
pub struct CapabilityRegistry {
    tenant_id: TenantId,
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl CapabilityRegistry {
    /// Install the bootstrap snapshot
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            tenant_id: snapshot.tenant_id(),
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Tenant governed by this registry
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.read().clone()
    }

    /// Whether `agent` holds `role` for `action` in the current snapshot
    pub fn authorize(&self, agent: &AgentId, role: Role, action: &ActionClass) -> bool {
        self.snapshot().authorize(agent, role, action)
    }

    /// Auditor bound to `action` in the current snapshot
    pub fn resolve_auditor(&self, action: &ActionClass) -> Result<AgentId, CapabilityError> {
        self.snapshot().resolve_auditor(action)
    }

    /// Replace the snapshot with a newer one for the same tenant
    pub fn replace(&self, snapshot: RegistrySnapshot) -> Result<(), CapabilityError> {
        if snapshot.tenant_id() != self.tenant_id {
            return Err(CapabilityError::TenantMismatch {
                expected: self.tenant_id,
                actual: snapshot.tenant_id(),
            });
        }
        let mut current = self.current.write();
        if snapshot.revision() <= current.revision() {
            return Err(CapabilityError::StaleRevision {
                current: current.revision(),
                proposed: snapshot.revision(),
            });
        }
        info!(
            tenant = %self.tenant_id,
            revision = snapshot.revision(),
            "capability registry replaced"
        );
        *current = Arc::new(snapshot);
        Ok(())
    }

    /// Apply an administrative edit to the current snapshot and install it
    ///
    /// Concurrent updates serialize on the write lock, so no edit is lost.
    /// If the edited draft fails validation nothing is installed.
    pub fn update<F>(&self, edit: F) -> Result<Arc<RegistrySnapshot>, CapabilityError>
    where
        F: FnOnce(&mut RegistryBuilder),
    {
        let mut current = self.current.write();
        let mut builder = current.to_builder();
        edit(&mut builder);
        let next = Arc::new(builder.build()?);
        info!(
            tenant = %self.tenant_id,
            revision = next.revision(),
            "capability registry updated"
        );
        *current = next.clone();
        Ok(next)
    }
}
