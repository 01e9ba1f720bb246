//! `verify`: offline verification of exported entry records
//!
//! Input is newline-delimited JSON, one [`EntryRecord`] per line. Blank
//! lines are skipped. A line that cannot be parsed counts as a failure.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use genii_ledger::{EntryRecord, LedgerConfig, LedgerEntry, Verifier};
use tracing::info;

/// Outcome counts of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Entries that verified
    pub passed: usize,
    /// Entries or lines that did not
    pub failed: usize,
}

impl Summary {
    /// Whether every entry verified
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Verify every record read from `input` against `config`
pub fn run(config: &LedgerConfig, input: impl BufRead, out: &mut impl Write) -> Result<Summary> {
    let keys = Arc::new(config.key_ring()?);
    let verifier = Verifier::new(keys, Arc::new(config.registry_snapshot()?));
    let mut summary = Summary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = match parse(&line) {
            Ok(entry) => entry,
            Err(err) => {
                summary.failed += 1;
                writeln!(out, "FAIL line {}: {err}", index + 1)?;
                continue;
            }
        };
        match verifier.verify(&entry) {
            Ok(()) => {
                summary.passed += 1;
                writeln!(out, "OK {}", entry.id())?;
            }
            Err(failure) => {
                summary.failed += 1;
                writeln!(out, "FAIL {failure}")?;
            }
        }
    }

    info!(passed = summary.passed, failed = summary.failed, "verification finished");
    Ok(summary)
}

fn parse(line: &str) -> Result<LedgerEntry> {
    let record: EntryRecord = serde_json::from_str(line)?;
    Ok(LedgerEntry::try_from(record)?)
}
