//! `lint:es` and `lint:es:watch`.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::error::ProcessError;
use crate::exec;

/// Run the configured linter over the project.
///
/// The strict variant fails when the linter reports problems. The watch
/// variant turns that failure into a warning so a watch loop keeps going;
/// a linter that cannot be started fails both.
#[derive(Debug)]
pub struct Lint {
    watch: bool,
}

impl Lint {
    /// Linting that fails the task on problems.
    #[must_use]
    pub const fn strict() -> Self {
        Self { watch: false }
    }

    /// Linting that only warns on problems.
    #[must_use]
    pub const fn watch() -> Self {
        Self { watch: true }
    }
}

impl Task for Lint {
    fn name(&self) -> &str {
        if self.watch { "lintw:es" } else { "lint:es" }
    }

    fn description(&self) -> &str {
        if self.watch {
            "Run the linter, warning on problems"
        } else {
            "Run the linter, failing on problems"
        }
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let spec = &ctx.config.settings.lint;
        let program = exec::resolve_or_bare(ctx.executor.as_ref(), &root, &spec.program);
        let command_line = std::iter::once(spec.program.as_str())
            .chain(spec.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run {command_line}"));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.debug(&format!("running {}", program.display()));
        match ctx.executor.run_inherited(&root, &program, &spec.args) {
            Ok(()) => Ok(TaskResult::Ok),
            Err(e @ ProcessError::ExitStatus { .. }) if self.watch => {
                Ok(TaskResult::Warned(format!("lint failed: {e}")))
            }
            Err(e) => Err(e).with_context(|| format!("running {command_line}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{RecordingExecutor, empty_config, make_context_with};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    #[test]
    fn names_distinguish_variants() {
        assert_eq!(Lint::strict().name(), "lint:es");
        assert_eq!(Lint::watch().name(), "lintw:es");
    }

    #[test]
    fn runs_configured_command_in_root() {
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = make_context_with(empty_config(Path::new("/site")), executor.clone());

        assert_eq!(Lint::strict().run(&ctx).unwrap(), TaskResult::Ok);
        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("eslint"));
        assert_eq!(calls[0].1, vec!["."]);
    }

    #[test]
    fn strict_lint_propagates_failure() {
        let executor = Arc::new(RecordingExecutor::failing(1));
        let ctx = make_context_with(empty_config(Path::new("/site")), executor);

        let err = Lint::strict().run(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("exited with code 1"));
    }

    #[test]
    fn watch_lint_warns_instead_of_failing() {
        let executor = Arc::new(RecordingExecutor::failing(1));
        let ctx = make_context_with(empty_config(Path::new("/site")), executor);

        let result = Lint::watch().run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Warned(ref m) if m.contains("lint failed")));
    }

    #[test]
    fn dry_run_does_not_spawn() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut ctx = make_context_with(empty_config(Path::new("/site")), executor.clone());
        ctx.dry_run = true;

        assert_eq!(Lint::strict().run(&ctx).unwrap(), TaskResult::DryRun);
        assert_eq!(executor.call_count(), 0);
    }
}
