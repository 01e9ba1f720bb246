//! Genii Trust Ledger
//!
//! Records actions taken by autonomous agents so that no single party can
//! forge, repudiate, or silently alter them. Every entry carries three
//! attestations over the same canonical payload:
//!
//! 1. the **actor** that originated the action,
//! 2. the **recipient** that received it,
//! 3. the **auditor** the capability registry binds to the action class.
//!
//! # Lifecycle
//!
//! ```text
//! create_entry ──► Draft ──actor──► ActorSigned ──recipient──► RecipientSigned ──auditor──► FullyAttested
//! ```
//!
//! Only fully attested entries that pass [`Verifier::verify`] are trusted.
//! Entries are never edited; a mistake is corrected by a compensating entry
//! that references the original's id.
//!
//! Nothing here is a global: construct a [`TrustLedger`] from a key ring, a
//! capability registry and a clock, and pass it to whatever orchestrates
//! agent actions.

#![forbid(unsafe_code)]

pub mod config;
pub mod entry;
pub mod errors;
pub mod record;
pub mod verification;
pub mod workflow;

pub use config::LedgerConfig;
pub use entry::{EntryState, LedgerEntry};
pub use errors::{ConfigError, EntryError, SignatureError};
pub use record::EntryRecord;
pub use verification::{Finding, FindingKind, VerificationFailure, VerifiedEntry, Verifier};
pub use workflow::TrustLedger;
