//! Capability registry for the Genii trust ledger
//!
//! Decides which agent may play which role for which action class, and which
//! auditor is bound to each action class. The registry is an immutable
//! [`RegistrySnapshot`] behind a [`CapabilityRegistry`] handle that swaps
//! snapshots wholesale, so a single check never observes a half-applied
//! administrative update.

#![forbid(unsafe_code)]

pub mod errors;
pub mod policy;
pub mod registry;
pub mod role;

pub use errors::CapabilityError;
pub use policy::ActionPolicy;
pub use registry::{CapabilityRegistry, RegistryBuilder, RegistrySnapshot};
pub use role::{AttestationRole, Role};
