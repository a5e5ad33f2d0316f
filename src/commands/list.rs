//! Command: print the task table.
use std::fmt::Write as _;

use anyhow::Result;

use crate::tasks::{Registry, TaskKind};

/// Render one line per task: name, description, and group composition.
#[must_use]
pub fn render(registry: &Registry) -> String {
    let width = registry.iter().map(|d| d.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for def in registry.iter() {
        let shape = match &def.kind {
            TaskKind::Leaf(_) => String::new(),
            TaskKind::Parallel(members) => format!("  [parallel: {}]", members.join(", ")),
            TaskKind::Series(members) => format!("  [series: {}]", members.join(" -> ")),
        };
        let _ = writeln!(out, "{:<width$}  {}{shape}", def.name, def.description);
    }
    out
}

/// Print the standard task table to stdout.
///
/// # Errors
///
/// Returns an error if the built-in task declarations are inconsistent.
#[allow(clippy::print_stdout)]
pub fn run() -> Result<()> {
    let registry = Registry::standard()?;
    print!("{}", render(&registry));
    Ok(())
}
