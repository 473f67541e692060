//! Plain-text summary for `--summary`.

use std::fmt::{self, Write};
use sweeprs_core::{ReviewSession, SecurityAnalysis};

/// Summarize the groups and security findings of a session.
pub fn summary(session: &ReviewSession, analysis: &SecurityAnalysis) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, session, analysis)?;
    Ok(out)
}

fn write_summary(
    out: &mut impl Write,
    session: &ReviewSession,
    analysis: &SecurityAnalysis,
) -> fmt::Result {
    let reused = analysis.reused_entry_count();
    let weak = analysis.weak.len();

    writeln!(out, "Entries:          {}", analysis.total)?;
    writeln!(out, "Sites:            {}", session.groups().len())?;
    writeln!(out, "Without a site:   {}", session.unresolved().len())?;
    writeln!(out, "Unique passwords: {}", analysis.unique_passwords)?;
    writeln!(
        out,
        "Reused:           {} ({}%)",
        reused,
        analysis.percent_of_total(reused)
    )?;
    writeln!(out, "Weak:             {} ({}%)", weak, analysis.percent_of_total(weak))?;

    if !analysis.reused.is_empty() {
        writeln!(out, "\nReused passwords:")?;
        for cluster in &analysis.reused {
            let members: Vec<String> = session
                .resolve(&cluster.entries)
                .map(|e| format!("{} ({})", e.domain(), e.username))
                .collect();
            writeln!(out, "  {} entries: {}", cluster.len(), members.join(", "))?;
        }
    }

    if !analysis.weak.is_empty() {
        writeln!(out, "\nWeak passwords:")?;
        for entry in session.resolve(&analysis.weak) {
            writeln!(out, "  {} ({})", entry.domain(), entry.username)?;
        }
    }

    writeln!(out, "\nSites:")?;
    for group in session.groups() {
        writeln!(out, "  {} ({})", group.domain, group.len())?;
    }

    Ok(())
}
