//! `clean:dist` and `clean:logs`.
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};

/// Remove package-manager debug logs from the project root.
#[derive(Debug)]
pub struct CleanLogs;

impl Task for CleanLogs {
    fn name(&self) -> &str {
        "clean:logs"
    }

    fn description(&self) -> &str {
        "Remove package-manager log files"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let base = glob::Pattern::escape(&root.to_string_lossy());
        let mut stats = TaskStats::new();

        for pattern in &ctx.config.settings.log_patterns {
            let full = format!("{base}/{pattern}");
            let matches =
                glob::glob(&full).with_context(|| format!("invalid log pattern '{pattern}'"))?;
            let mut matched = false;
            for path in matches {
                let path = path.context("reading project root")?;
                if !path.is_file() {
                    continue;
                }
                matched = true;
                stats.changed += 1;
                if ctx.dry_run {
                    ctx.log
                        .dry_run(&format!("would remove {}", display_rel(&root, &path)));
                    continue;
                }
                std::fs::remove_file(&path)
                    .with_context(|| format!("removing {}", path.display()))?;
                ctx.log.debug(&format!("removed {}", display_rel(&root, &path)));
            }
            if !matched {
                stats.already_ok += 1;
            }
        }

        Ok(stats.finish(ctx))
    }
}

/// Remove the output directory and everything in it.
#[derive(Debug)]
pub struct CleanDist;

impl Task for CleanDist {
    fn name(&self) -> &str {
        "clean:dist"
    }

    fn description(&self) -> &str {
        "Remove the output directory"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let out_dir = ctx.config.out_dir();
        let mut stats = TaskStats::new();

        if !out_dir.exists() {
            ctx.log
                .debug(&format!("{} does not exist", out_dir.display()));
            stats.already_ok += 1;
        } else if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would remove {}", out_dir.display()));
            stats.changed += 1;
        } else {
            std::fs::remove_dir_all(&out_dir)
                .with_context(|| format!("removing {}", out_dir.display()))?;
            ctx.log.debug(&format!("removed {}", out_dir.display()));
            stats.changed += 1;
        }

        Ok(stats.finish(ctx))
    }
}

fn display_rel(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
