//! Identifier types used across the trust ledger
//!
//! Tenants and entries are identified by UUIDs. Agents and action classes are
//! free-form labels chosen by the deployment (e.g. `MKT_PA_001`,
//! `ad_spend_change`) and are validated to be non-empty.

use crate::errors::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

fn parse_prefixed_uuid(prefix: &str, s: &str) -> Result<Uuid> {
    let raw = s.strip_prefix(prefix).unwrap_or(s);
    Uuid::parse_str(raw).map_err(|e| LedgerError::invalid(format!("invalid {prefix}id '{s}': {e}")))
}

/// Tenant identifier
///
/// Every entry and every registry belongs to exactly one tenant; nothing is
/// shared across tenant boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    /// Create a new random tenant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant-{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        parse_prefixed_uuid("tenant-", s).map(Self)
    }
}

impl From<Uuid> for TenantId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Ledger entry identifier, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Create a new random entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        parse_prefixed_uuid("entry-", s).map(Self)
    }
}

impl From<Uuid> for EntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Identity of an agent or external system taking part in an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Create an agent identity; empty or whitespace-only labels are rejected
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::invalid("agent id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the identity string as signed into attestations
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AgentId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for AgentId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// Action class label; decides which capabilities an entry requires
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionClass(String);

impl ActionClass {
    /// Create an action class; empty or whitespace-only labels are rejected
    pub fn new(action: impl Into<String>) -> Result<Self> {
        let action = action.into();
        let trimmed = action.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::invalid("action class must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ActionClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ActionClass {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ActionClass> for String {
    fn from(action: ActionClass) -> Self {
        action.0
    }
}

/// Version tag of the secret an entry was signed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyVersion(pub u32);

impl KeyVersion {
    /// Create a key version
    pub fn new(version: u32) -> Self {
        Self(version)
    }

    /// Get the inner value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for KeyVersion {
    fn from(version: u32) -> Self {
        Self(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_rejects_blank() {
        assert!(AgentId::new("").is_err());
        assert!(AgentId::new("   ").is_err());
        assert_eq!(AgentId::new(" MKT_PA_001 ").unwrap().as_str(), "MKT_PA_001");
    }

    #[test]
    fn test_action_class_serde_validates() {
        let ok: ActionClass = serde_json::from_str("\"ledger_verify\"").unwrap();
        assert_eq!(ok.as_str(), "ledger_verify");
        assert!(serde_json::from_str::<ActionClass>("\"\"").is_err());
    }

    #[test]
    fn test_tenant_id_parses_both_forms() {
        let tenant = TenantId::from_uuid(Uuid::from_bytes([7u8; 16]));
        let displayed = tenant.to_string();
        assert!(displayed.starts_with("tenant-"));
        assert_eq!(displayed.parse::<TenantId>().unwrap(), tenant);
        assert_eq!(tenant.uuid().to_string().parse::<TenantId>().unwrap(), tenant);
    }

    #[test]
    fn test_entry_id_rejects_garbage() {
        assert!("entry-not-a-uuid".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_key_version_ordering() {
        assert!(KeyVersion::new(2) > KeyVersion::new(1));
        assert_eq!(KeyVersion::new(3).to_string(), "v3");
    }
}
