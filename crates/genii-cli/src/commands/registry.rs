//! `registry`: show agents, grants and auditor assignments

use std::io::Write;

use anyhow::Result;
use genii_ledger::LedgerConfig;

/// Print the registry described by `config`, as text or JSON
pub fn run(config: &LedgerConfig, json: bool, out: &mut impl Write) -> Result<()> {
    let snapshot = config.registry_snapshot()?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &snapshot)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "tenant {} (revision {})", snapshot.tenant_id(), snapshot.revision())?;
    writeln!(out, "agents:")?;
    for agent in snapshot.agents() {
        writeln!(out, "  {agent}")?;
        if let Some(grants) = snapshot.grants_for(agent) {
            for (role, actions) in grants {
                let labels: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
                writeln!(out, "    {role}: {}", labels.join(", "))?;
            }
        }
    }
    writeln!(out, "actions:")?;
    for (action, policy) in snapshot.policies() {
        let auditor = match snapshot.resolve_auditor(action) {
            Ok(auditor) => auditor.to_string(),
            Err(err) => format!("{} (unresolved: {err})", policy.auditor),
        };
        let self_action = if policy.allow_self_action {
            ", self-action allowed"
        } else {
            ""
        };
        writeln!(out, "  {action}: audited by {auditor}{self_action}")?;
    }
    Ok(())
}
