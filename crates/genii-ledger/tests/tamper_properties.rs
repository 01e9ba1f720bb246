//! Property tests: any change to a stored payload is detected

#![allow(clippy::expect_used, clippy::unwrap_used)]

use genii_ledger::{FindingKind, LedgerEntry};
use genii_testkit::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn altered_spend_is_detected(original in any::<i64>(), altered in any::<i64>()) {
        prop_assume!(original != altered);
        let ledger = test_ledger();
        let entry = attested_entry(&ledger, "ledger_verify", MKT_PA_001, META_ADS_API, spend(original));

        let mut record = entry.to_record().unwrap();
        record.payload = format!(r#"{{"spend": {altered}}}"#);
        let tampered = LedgerEntry::try_from(record).unwrap();

        let failure = ledger.verify(&tampered).unwrap_err();
        prop_assert!(failure.contains(FindingKind::ActorMismatch));
        prop_assert!(failure.contains(FindingKind::RecipientMismatch));
        prop_assert!(failure.contains(FindingKind::AuditorMismatch));
    }

    #[test]
    fn reordered_keys_still_verify(keys in proptest::collection::btree_set("[a-z]{1,8}", 1..6)) {
        let ledger = test_ledger();
        let payload: genii_core::Payload =
            keys.iter().enumerate().map(|(i, k)| (k.clone(), i as i64)).collect();
        let entry = attested_entry(&ledger, "ledger_verify", MKT_PA_001, META_ADS_API, payload);

        let reversed: genii_core::Payload =
            keys.iter().enumerate().rev().map(|(i, k)| (k.clone(), i as i64)).collect();
        let mut record = entry.to_record().unwrap();
        record.payload = serde_json::to_string(&reversed.to_json()).unwrap();
        let reloaded = LedgerEntry::try_from(record).unwrap();

        prop_assert!(ledger.verify(&reloaded).is_ok());
    }
}
