//! `encode`: canonical bytes and digest of a payload file

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use genii_core::{encode, Payload};

/// Print the canonical encoding of the JSON object in `path` and its digest
pub fn run(path: &Path, out: &mut impl Write) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    let payload = Payload::from_json_str(&text)
        .with_context(|| format!("{} is not a payload object", path.display()))?;
    let canonical = encode(&payload)?;

    out.write_all(canonical.as_bytes())?;
    writeln!(out)?;
    writeln!(out, "sha256: {}", canonical.digest())?;
    Ok(())
}
