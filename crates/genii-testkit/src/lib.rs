//! Genii Testing Infrastructure
//!
//! Shared fixtures for ledger tests: the legacy agent swarm as a capability
//! registry, deterministic key rings and clocks, and a ready-made ledger.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust,no_run
//! use genii_testkit::*;
//!
//! let ledger = test_ledger();
//! let entry = attested_entry(&ledger, "ledger_verify", MKT_PA_001, META_ADS_API, spend(500));
//! assert!(ledger.verify(&entry).is_ok());
//! ```

pub mod fixtures;
pub mod swarm;
pub mod time;

pub use fixtures::*;
pub use swarm::*;
pub use time::FixedTimeSource;
