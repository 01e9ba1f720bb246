//! The legacy agent swarm as a capability registry
//!
//! | action | originate | receive | audit |
//! |---|---|---|---|
//! | `request_creative`, `pause_campaign`, `ledger_verify` | `MKT_PA_001` | `META_ADS_API` | `FIN_AC_001` |
//! | `enrich_lead`, `book_meeting` | `SLS_BD_001` | `CRM_API` | `FIN_AC_001` |
//! | `route_shipment`, `inventory_check` | `OPS_LOG_001` | `CARRIER_API` | `FIN_AC_001` |
//! | `audit_transaction`, `compliance_check` | `FIN_AC_001` | `ERP_API` | `LEGAL_CO_001` |
//! | `internal_audit` (self-action allowed) | `FIN_AC_001` | `FIN_AC_001` | `LEGAL_CO_001` |

use genii_authorization::{RegistryBuilder, RegistrySnapshot, Role};
use genii_core::{ActionClass, AgentId, TenantId};

/// Performance marketing agent
pub const MKT_PA_001: &str = "MKT_PA_001";
/// Finance and accounting agent, default auditor
pub const FIN_AC_001: &str = "FIN_AC_001";
/// Sales and business development agent
pub const SLS_BD_001: &str = "SLS_BD_001";
/// Logistics agent
pub const OPS_LOG_001: &str = "OPS_LOG_001";
/// Legal and compliance agent, auditor of finance actions
pub const LEGAL_CO_001: &str = "LEGAL_CO_001";
/// External ads platform
pub const META_ADS_API: &str = "META_ADS_API";
/// External CRM
pub const CRM_API: &str = "CRM_API";
/// External carrier
pub const CARRIER_API: &str = "CARRIER_API";
/// External accounting system
pub const ERP_API: &str = "ERP_API";

const LANES: &[(&[&str], &str, &str, &str)] = &[
    (
        &["request_creative", "pause_campaign", "ledger_verify"],
        MKT_PA_001,
        META_ADS_API,
        FIN_AC_001,
    ),
    (&["enrich_lead", "book_meeting"], SLS_BD_001, CRM_API, FIN_AC_001),
    (&["route_shipment", "inventory_check"], OPS_LOG_001, CARRIER_API, FIN_AC_001),
    (&["audit_transaction", "compliance_check"], FIN_AC_001, ERP_API, LEGAL_CO_001),
    (&["internal_audit"], FIN_AC_001, FIN_AC_001, LEGAL_CO_001),
];

/// Agent id from a fixture constant
pub fn agent(id: &str) -> AgentId {
    AgentId::new(id).unwrap()
}

/// Action class from a label
pub fn action(label: &str) -> ActionClass {
    ActionClass::new(label).unwrap()
}

/// Builder preloaded with the swarm, for tests that tweak it before building
pub fn swarm_builder(tenant: TenantId) -> RegistryBuilder {
    let mut builder = RegistryBuilder::new(tenant);
    for (actions, actor, recipient, auditor) in LANES {
        for label in *actions {
            builder
                .grant(agent(actor), Role::Originate, action(label))
                .grant(agent(recipient), Role::Receive, action(label))
                .grant(agent(auditor), Role::Audit, action(label))
                .assign_auditor(action(label), agent(auditor));
        }
    }
    builder.allow_self_action(&action("internal_audit"), true);
    builder
}

/// The full swarm registry for `tenant`
pub fn swarm_registry(tenant: TenantId) -> RegistrySnapshot {
    swarm_builder(tenant).build().expect("swarm registry is consistent")
}
