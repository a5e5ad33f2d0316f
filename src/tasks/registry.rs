//! The task registry: named leaf tasks plus parallel and series groups.
//!
//! Groups refer to their members by name, so one leaf can appear in several
//! groups (`clean` and `build` are shared by `all` and `watched`). The
//! registry is validated once on construction and is immutable afterwards.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Context, Task, clean, graph, lint, scripts, templates};
use crate::error::TaskError;
use crate::logging::{BufferedLog, Log, Logger, TaskStatus};

/// How a registered task runs.
pub enum TaskKind {
    /// A single unit of work.
    Leaf(Box<dyn Task>),
    /// Members start together; the group fails if any member fails, and a
    /// failing member never cancels its siblings.
    Parallel(Vec<String>),
    /// Members run in order; the first failure stops the group.
    Series(Vec<String>),
}

impl fmt::Debug for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(task) => f.debug_tuple("Leaf").field(&task.name()).finish(),
            Self::Parallel(members) => f.debug_tuple("Parallel").field(members).finish(),
            Self::Series(members) => f.debug_tuple("Series").field(members).finish(),
        }
    }
}

/// A named entry in the registry.
#[derive(Debug)]
pub struct TaskDef {
    /// Name used on the command line.
    pub name: String,
    /// One-line description for `sitebuild list`.
    pub description: String,
    /// Leaf task or group shape.
    pub kind: TaskKind,
}

impl TaskDef {
    /// Register a leaf task under its own name.
    #[must_use]
    pub fn leaf(task: impl Task + 'static) -> Self {
        Self {
            name: task.name().to_string(),
            description: task.description().to_string(),
            kind: TaskKind::Leaf(Box::new(task)),
        }
    }

    /// Register a group whose members run concurrently.
    #[must_use]
    pub fn parallel(name: &str, description: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: TaskKind::Parallel(members.iter().map(ToString::to_string).collect()),
        }
    }

    /// Register a group whose members run one after another.
    #[must_use]
    pub fn series(name: &str, description: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: TaskKind::Series(members.iter().map(ToString::to_string).collect()),
        }
    }

    /// Member names of a group; empty for a leaf.
    #[must_use]
    pub fn members(&self) -> &[String] {
        match &self.kind {
            TaskKind::Leaf(_) => &[],
            TaskKind::Parallel(members) | TaskKind::Series(members) => members,
        }
    }
}

/// A validated set of task definitions.
pub struct Registry {
    defs: Vec<TaskDef>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.defs.iter().map(|d| d.name.as_str()))
            .finish()
    }
}

impl Registry {
    /// Build a registry from `defs`, keeping their order for listing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Duplicate`] if a name is declared twice,
    /// [`TaskError::UnknownMember`] if a group names an unregistered task,
    /// and [`TaskError::Cycle`] if groups reference each other in a loop.
    pub fn new(defs: Vec<TaskDef>) -> Result<Self, TaskError> {
        let mut index = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if index.insert(def.name.clone(), i).is_some() {
                return Err(TaskError::Duplicate(def.name.clone()));
            }
        }

        for def in &defs {
            if let Some(member) = def.members().iter().find(|m| !index.contains_key(*m)) {
                return Err(TaskError::UnknownMember {
                    group: def.name.clone(),
                    member: member.clone(),
                });
            }
        }

        let refs: Vec<Vec<&str>> = defs
            .iter()
            .map(|d| d.members().iter().map(String::as_str).collect())
            .collect();
        let nodes: Vec<(&str, &[&str])> = defs
            .iter()
            .zip(&refs)
            .map(|(d, r)| (d.name.as_str(), r.as_slice()))
            .collect();
        let stuck = graph::unresolved(&nodes);
        if !stuck.is_empty() {
            return Err(TaskError::Cycle(stuck.join(", ")));
        }

        Ok(Self { defs, index })
    }

    /// The built-in task set.
    ///
    /// # Errors
    ///
    /// Only fails if the declarations below are inconsistent.
    pub fn standard() -> Result<Self, TaskError> {
        Self::new(vec![
            TaskDef::leaf(clean::CleanLogs),
            TaskDef::leaf(clean::CleanDist),
            TaskDef::parallel(
                "clean",
                "Remove log files and the output directory",
                &["clean:logs", "clean:dist"],
            ),
            TaskDef::leaf(lint::Lint::strict()),
            TaskDef::parallel("lint", "Lint sources, failing on problems", &["lint:es"]),
            TaskDef::leaf(lint::Lint::watch()),
            TaskDef::parallel("lintw", "Lint sources, warning on problems", &["lintw:es"]),
            TaskDef::leaf(templates::BuildTemplates),
            TaskDef::leaf(scripts::BuildScripts),
            TaskDef::parallel(
                "build",
                "Render templates and bundle scripts",
                &["build:tpl", "build:res"],
            ),
            TaskDef::series("all", "Clean, lint, then build", &["clean", "lint", "build"]),
            TaskDef::series(
                "watched",
                "Clean, lint tolerantly, then build",
                &["clean", "lintw", "build"],
            ),
        ])
    }

    /// Look up a task or group by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.index.get(name).and_then(|&i| self.defs.get(i))
    }

    /// All definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskDef> {
        self.defs.iter()
    }

    /// Leaf names reachable from `name`, depth first, each listed once.
    #[must_use]
    pub fn leaves(&self, name: &str) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(name, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, name: &str, out: &mut Vec<&'a str>) {
        let Some(def) = self.get(name) else {
            return;
        };
        match &def.kind {
            TaskKind::Leaf(_) => {
                if !out.contains(&def.name.as_str()) {
                    out.push(def.name.as_str());
                }
            }
            TaskKind::Parallel(members) | TaskKind::Series(members) => {
                for member in members {
                    self.collect_leaves(member, out);
                }
            }
        }
    }

    /// Run the task called `name`.
    ///
    /// Leaf results are recorded through `ctx.log`. Parallel members each get
    /// a [`BufferedLog`] over `log` so their output is flushed as a block.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::UnknownTask`] for an unregistered name, or the
    /// failure of the task or group.
    pub fn run(&self, name: &str, ctx: &Context, log: &Arc<Logger>) -> Result<(), TaskError> {
        let def = self
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;

        match &def.kind {
            TaskKind::Leaf(task) => super::execute(task.as_ref(), ctx),
            TaskKind::Series(members) => self.run_series(name, members, ctx, log),
            TaskKind::Parallel(members) => self.run_parallel(name, members, ctx, log),
        }
    }

    fn run_series(
        &self,
        name: &str,
        members: &[String],
        ctx: &Context,
        log: &Arc<Logger>,
    ) -> Result<(), TaskError> {
        ctx.log
            .debug(&format!("{name}: running {} in series", members.join(", ")));
        for (i, member) in members.iter().enumerate() {
            if let Err(e) = self.run(member, ctx, log) {
                let reason = format!("skipped: '{member}' failed");
                for rest in members.iter().skip(i + 1) {
                    for leaf in self.leaves(rest) {
                        ctx.log.record_task(leaf, TaskStatus::Skipped, Some(&reason));
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn run_parallel(
        &self,
        name: &str,
        members: &[String],
        ctx: &Context,
        log: &Arc<Logger>,
    ) -> Result<(), TaskError> {
        let results: Vec<(&str, Result<(), TaskError>)> = if ctx.parallel {
            ctx.log
                .debug(&format!("{name}: running {} in parallel", members.join(", ")));
            std::thread::scope(|s| {
                let handles: Vec<_> = members
                    .iter()
                    .map(|member| {
                        let member = member.as_str();
                        let handle = s.spawn(move || {
                            let buf = Arc::new(BufferedLog::new(Arc::clone(log)));
                            let member_ctx = ctx.with_log(Arc::clone(&buf) as Arc<dyn Log>);
                            let result = self.run(member, &member_ctx, log);
                            buf.flush();
                            result
                        });
                        (member, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(member, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(TaskError::Failed {
                                task: member.to_string(),
                                reason: "panicked".to_string(),
                            })
                        });
                        (member, result)
                    })
                    .collect()
            })
        } else {
            ctx.log
                .debug(&format!("{name}: running {} one by one", members.join(", ")));
            members
                .iter()
                .map(|member| (member.as_str(), self.run(member, ctx, log)))
                .collect()
        };

        let failed: Vec<&str> = results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(member, _)| *member)
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Failed {
                task: name.to_string(),
                reason: format!(
                    "{} of {} members failed: {}",
                    failed.len(),
                    members.len(),
                    failed.join(", ")
                ),
            })
        }
    }
}
