//! Command: run named tasks.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, RunOpts};
use crate::config::Mode;
use crate::error::TaskError;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::tasks::{Context, Registry};

/// Run the requested tasks in order.
///
/// Every name is checked before anything runs. The first failing task stops
/// the run; the leaves of the tasks after it are recorded as skipped.
///
/// # Errors
///
/// Returns an error if setup fails, a task name is unknown, or any task
/// failed.
pub fn run(global: &GlobalOpts, opts: &RunOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("sitebuild {}", super::version::version()));
    let setup = CommandSetup::init(global, log)?;

    if let Some(unknown) = opts.tasks.iter().find(|n| setup.registry.get(n).is_none()) {
        return Err(TaskError::UnknownTask(unknown.clone()).into());
    }

    let mode = global.mode.unwrap_or_else(Mode::from_env);
    log.info(&format!("mode: {mode}"));
    if global.dry_run {
        log.info("dry run: no files will be written and no tools spawned");
    }

    let ctx = Context::new(
        Arc::clone(&setup.config),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
        mode,
        global.dry_run,
        global.parallel,
    );
    run_tasks_to_completion(&setup.registry, &opts.tasks, &ctx, log)
}

/// Run `names` in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns the first failure, with the number of failed leaf tasks attached.
pub fn run_tasks_to_completion(
    registry: &Registry,
    names: &[String],
    ctx: &Context,
    log: &Arc<Logger>,
) -> Result<()> {
    let mut failure = None;
    for (i, name) in names.iter().enumerate() {
        if let Err(e) = registry.run(name, ctx, log) {
            let reason = format!("skipped: '{name}' failed");
            for rest in names.iter().skip(i + 1) {
                for leaf in registry.leaves(rest) {
                    ctx.log.record_task(leaf, TaskStatus::Skipped, Some(&reason));
                }
            }
            failure = Some(e);
            break;
        }
    }

    log.print_summary(ctx.color);

    match failure {
        Some(e) => {
            let count = log.failure_count();
            Err(anyhow::Error::from(e).context(format!("{count} task(s) failed")))
        }
        None => Ok(()),
    }
}
