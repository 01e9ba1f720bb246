//! Ledger, key ring and entry fixtures

use std::sync::Arc;

use genii_authorization::CapabilityRegistry;
use genii_core::{KeyRing, KeyVersion, LedgerSecret, Payload, TenantClock, TenantId};
use genii_ledger::{LedgerEntry, TrustLedger};

use crate::swarm::{action, agent, swarm_registry};
use crate::time::FixedTimeSource;

/// Secret of the legacy deployment; only ever used in tests
pub const LEGACY_TEST_SECRET: &str = "genii-sovereign-secret";

/// Fixed start time of test clocks
pub const TEST_EPOCH_MS: u64 = 1_700_000_000_000;

/// Single-version ring holding [`LEGACY_TEST_SECRET`]
pub fn test_key_ring() -> KeyRing {
    KeyRing::single(LedgerSecret::new(LEGACY_TEST_SECRET).unwrap())
}

/// Ring with versions 1 and 2; version 2 is current
pub fn rotated_key_ring() -> KeyRing {
    KeyRing::new([
        (KeyVersion::new(1), LedgerSecret::new(LEGACY_TEST_SECRET).unwrap()),
        (KeyVersion::new(2), LedgerSecret::new("genii-rotated-secret").unwrap()),
    ])
    .unwrap()
}

/// Ledger over the swarm registry for a fresh tenant
pub fn test_ledger() -> TrustLedger {
    test_ledger_with(TenantId::new(), test_key_ring())
}

/// Ledger over the swarm registry with a chosen tenant and key ring
pub fn test_ledger_with(tenant: TenantId, keys: KeyRing) -> TrustLedger {
    swarm_ledger(tenant, keys, Arc::new(FixedTimeSource::at(TEST_EPOCH_MS)))
}

/// Ledger for a fresh tenant whose clock the caller drives through `time`
pub fn test_ledger_on(time: Arc<FixedTimeSource>) -> TrustLedger {
    swarm_ledger(TenantId::new(), test_key_ring(), time)
}

fn swarm_ledger(tenant: TenantId, keys: KeyRing, time: Arc<FixedTimeSource>) -> TrustLedger {
    TrustLedger::new(
        Arc::new(keys),
        Arc::new(CapabilityRegistry::new(swarm_registry(tenant))),
        TenantClock::new(time),
    )
}

/// `{"spend": amount}`
pub fn spend(amount: i64) -> Payload {
    Payload::new().with("spend", amount)
}

/// Create and fully attest an entry, panicking on any failure
pub fn attested_entry(
    ledger: &TrustLedger,
    action_label: &str,
    actor: &str,
    recipient: &str,
    payload: Payload,
) -> LedgerEntry {
    let entry = ledger
        .create_entry(&action(action_label), &agent(actor), &agent(recipient), payload)
        .expect("entry creation");
    ledger.attest_all(&entry).expect("attestation")
}
