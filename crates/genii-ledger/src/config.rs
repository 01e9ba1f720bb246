//! Ledger configuration
//!
//! One TOML file describes a tenant: its key versions, its agents and their
//! capabilities, and the auditor policy of each action class. Secrets are
//! either inline or read from named environment variables; there is no
//! built-in fallback secret.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use genii_authorization::{
    ActionPolicy, CapabilityRegistry, RegistryBuilder, RegistrySnapshot, Role,
};
use genii_core::{ActionClass, AgentId, KeyRing, KeyVersion, LedgerSecret, TenantClock, TenantId};
use serde::Deserialize;
use tracing::info;

use crate::errors::ConfigError;
use crate::workflow::TrustLedger;

/// Environment variable consulted when no `[[keys]]` are configured
pub const DEFAULT_SECRET_ENV: &str = "LEDGER_SECRET";

/// One secret version
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    /// Version tag recorded on entries
    pub version: KeyVersion,
    /// Inline secret
    #[serde(default)]
    pub secret: Option<String>,
    /// Environment variable holding the secret
    #[serde(default)]
    pub secret_env: Option<String>,
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("version", &self.version)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secret_env", &self.secret_env)
            .finish()
    }
}

/// One agent and the action classes it may act on per role
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Agent identity
    pub id: AgentId,
    /// Actions the agent may originate
    #[serde(default)]
    pub originate: Vec<ActionClass>,
    /// Actions the agent may receive
    #[serde(default)]
    pub receive: Vec<ActionClass>,
    /// Actions the agent may audit
    #[serde(default)]
    pub audit: Vec<ActionClass>,
}

impl AgentConfig {
    fn grants(&self) -> impl Iterator<Item = (Role, &ActionClass)> {
        let originate = self.originate.iter().map(|a| (Role::Originate, a));
        let receive = self.receive.iter().map(|a| (Role::Receive, a));
        let audit = self.audit.iter().map(|a| (Role::Audit, a));
        originate.chain(receive).chain(audit)
    }
}

/// Configuration of one tenant's ledger
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Tenant served by this ledger
    pub tenant_id: TenantId,
    /// Version new entries are signed under; defaults to the highest
    #[serde(default)]
    pub current_key_version: Option<KeyVersion>,
    /// Secret versions
    #[serde(default)]
    pub keys: Vec<KeyConfig>,
    /// Agents and their capabilities
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
    /// Policy per action class
    #[serde(default)]
    pub actions: BTreeMap<ActionClass, ActionPolicy>,
}

impl LedgerConfig {
    /// Read, parse and validate a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            tenant = %config.tenant_id,
            agents = config.agents.len(),
            actions = config.actions.len(),
            "ledger config loaded"
        );
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency; secrets are resolved later
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut versions = BTreeSet::new();
        for key in &self.keys {
            if !versions.insert(key.version) {
                return Err(ConfigError::Invalid(format!(
                    "key version {} is listed twice",
                    key.version
                )));
            }
            match (&key.secret, &key.secret_env) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::Invalid(format!(
                        "key {} sets both secret and secret_env",
                        key.version
                    )))
                }
                (None, None) => {
                    return Err(ConfigError::Invalid(format!(
                        "key {} needs secret or secret_env",
                        key.version
                    )))
                }
                _ => {}
            }
        }

        if let Some(current) = self.current_key_version {
            let known = if self.keys.is_empty() {
                current == KeyVersion::new(1)
            } else {
                versions.contains(&current)
            };
            if !known {
                return Err(ConfigError::Invalid(format!(
                    "current_key_version {current} is not a configured key"
                )));
            }
        }

        let mut agents = BTreeSet::new();
        for agent in &self.agents {
            if !agents.insert(&agent.id) {
                return Err(ConfigError::Invalid(format!("agent {} is listed twice", agent.id)));
            }
        }
        Ok(())
    }

    /// Resolve secrets from the process environment
    pub fn key_ring(&self) -> Result<KeyRing, ConfigError> {
        self.key_ring_with_env(|name| std::env::var(name).ok())
    }

    /// Resolve secrets through `lookup` instead of the process environment
    pub fn key_ring_with_env<F>(&self, lookup: F) -> Result<KeyRing, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut secrets = Vec::new();
        if self.keys.is_empty() {
            let version = KeyVersion::new(1);
            let secret = lookup(DEFAULT_SECRET_ENV).ok_or_else(|| ConfigError::MissingSecret {
                version,
                env: Some(DEFAULT_SECRET_ENV.to_string()),
            })?;
            secrets.push((version, secret_from(version, secret)?));
        }
        for key in &self.keys {
            let secret = match (&key.secret, &key.secret_env) {
                (Some(inline), _) => Some(inline.clone()),
                (None, Some(env)) => lookup(env),
                (None, None) => None,
            };
            let secret = secret.ok_or_else(|| ConfigError::MissingSecret {
                version: key.version,
                env: key.secret_env.clone(),
            })?;
            secrets.push((key.version, secret_from(key.version, secret)?));
        }

        let ring = KeyRing::new(secrets).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        match self.current_key_version {
            Some(current) => ring
                .with_current(current)
                .map_err(|e| ConfigError::Invalid(e.to_string())),
            None => Ok(ring),
        }
    }

    /// Build the bootstrap registry snapshot
    pub fn registry_snapshot(&self) -> Result<RegistrySnapshot, ConfigError> {
        let mut builder = RegistryBuilder::new(self.tenant_id);
        for agent in &self.agents {
            builder.register(agent.id.clone());
            for (role, action) in agent.grants() {
                builder.grant(agent.id.clone(), role, action.clone());
            }
        }
        for (action, policy) in &self.actions {
            builder.set_policy(action.clone(), policy.clone());
        }
        Ok(builder.build()?)
    }

    /// Ledger over the configured registry, key ring and the system clock
    pub fn build_ledger(&self) -> Result<TrustLedger, ConfigError> {
        let keys = self.key_ring()?;
        let registry = CapabilityRegistry::new(self.registry_snapshot()?);
        Ok(TrustLedger::new(
            Arc::new(keys),
            Arc::new(registry),
            TenantClock::system(),
        ))
    }
}

fn secret_from(version: KeyVersion, secret: String) -> Result<LedgerSecret, ConfigError> {
    LedgerSecret::new(secret)
        .map_err(|_| ConfigError::Invalid(format!("secret for key {version} is empty")))
}
