//! Command tests against exported swarm entries

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::{Cursor, Write};

use genii_cli::commands::{encode, registry, verify};
use genii_core::TenantId;
use genii_ledger::LedgerConfig;
use genii_testkit::*;

fn config_for(tenant: TenantId) -> LedgerConfig {
    let text = format!(
        r#"
tenant_id = "{uuid}"

[[keys]]
version = 1
secret = "{LEGACY_TEST_SECRET}"

[[agents]]
id = "MKT_PA_001"
originate = ["ledger_verify"]

[[agents]]
id = "META_ADS_API"
receive = ["ledger_verify"]

[[agents]]
id = "FIN_AC_001"
audit = ["ledger_verify"]

[actions.ledger_verify]
auditor = "FIN_AC_001"
"#,
        uuid = tenant.uuid()
    );
    LedgerConfig::from_toml_str(&text).unwrap()
}

fn export(ledger: &genii_ledger::TrustLedger, amount: i64) -> String {
    let entry = attested_entry(ledger, "ledger_verify", MKT_PA_001, META_ADS_API, spend(amount));
    serde_json::to_string(&entry.to_record().unwrap()).unwrap()
}

#[test]
fn verify_reports_each_line() {
    let tenant = TenantId::new();
    let ledger = test_ledger_with(tenant, test_key_ring());
    let good = export(&ledger, 500);
    let tampered = export(&ledger, 700).replace(r#"{\"spend\": 700}"#, r#"{\"spend\": 7000}"#);
    let input = format!("{good}\n\n{tampered}\nnot json\n");

    let mut out = Vec::new();
    let summary = verify::run(&config_for(tenant), Cursor::new(input), &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);
    assert!(!summary.all_passed());
    let lines: Vec<&str> = report.lines().collect();
    assert!(lines[0].starts_with("OK entry-"));
    assert!(lines[1].starts_with("FAIL entry-"));
    assert!(lines[1].contains("failed verification"));
    assert!(lines[1].contains("actor signature mismatch"));
    assert!(lines[2].starts_with("FAIL line 4:"));
}

#[test]
fn verify_passes_clean_export() {
    let tenant = TenantId::new();
    let ledger = test_ledger_with(tenant, test_key_ring());
    let input = format!("{}\n{}\n", export(&ledger, 1), export(&ledger, 2));

    let mut out = Vec::new();
    let summary = verify::run(&config_for(tenant), Cursor::new(input), &mut out).unwrap();
    assert!(summary.all_passed());
    assert_eq!(summary.passed, 2);
}

#[test]
fn encode_prints_canonical_form() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"spend": 500, "campaign": "summer"}"#).unwrap();

    let mut out = Vec::new();
    encode::run(file.path(), &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some(r#"{"campaign": "summer", "spend": 500}"#));
    assert!(lines.next().unwrap().starts_with("sha256: "));
}

#[test]
fn encode_rejects_non_objects() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[1, 2, 3]").unwrap();
    assert!(encode::run(file.path(), &mut Vec::new()).is_err());
}

#[test]
fn registry_lists_auditors() {
    let config = config_for(TenantId::new());
    let mut out = Vec::new();
    registry::run(&config, false, &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("  ledger_verify: audited by FIN_AC_001"));
    assert!(report.contains("    originate: ledger_verify"));

    let mut out = Vec::new();
    registry::run(&config, true, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["revision"], 1);
}
