//! Genii Core - Trust Ledger Foundations
//!
//! This crate holds the leaf components of the triple-entry trust ledger:
//! everything that is a pure function of its inputs and carries no
//! authorization or workflow state.
//!
//! # Components
//!
//! - [`payload`]: closed, insertion-ordered payload model
//! - [`canonical`]: deterministic byte encoding of payloads
//! - [`crypto`]: attestation digests, constant-time token comparison, key ring
//! - [`identifiers`]: tenant, entry, agent and action identifiers
//! - [`time`]: per-tenant monotonic timestamps
//! - [`errors`]: unified error type
//!
//! Signing and verification built on these types are synchronous and free of
//! shared mutable state, so any number of entries may be processed in parallel.

#![forbid(unsafe_code)]

/// Deterministic payload encoding
pub mod canonical;

/// Attestation digests and secret management
pub mod crypto;

/// Unified error handling
pub mod errors;

/// Tenant, entry, agent and action identifiers
pub mod identifiers;

/// Typed payload model
pub mod payload;

/// Timestamps and clocks
pub mod time;

pub use canonical::{encode, CanonicalBytes, EncodingError, MAX_DEPTH};
pub use crypto::{sign, AttestationToken, KeyRing, LedgerSecret};
pub use errors::{LedgerError, Result};
pub use identifiers::{ActionClass, AgentId, EntryId, KeyVersion, TenantId};
pub use payload::{Payload, PayloadNumber, PayloadValue};
pub use time::{SystemTimeSource, TenantClock, TimeSource, Timestamp};
