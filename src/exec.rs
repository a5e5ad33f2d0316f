//! External process execution.
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::ProcessError;

/// Result of a command execution with captured output.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, absent when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so tasks can be tested without
/// spawning real tools.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` in `dir`, capturing output. Never fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Spawn`] if the program cannot be started.
    fn run_captured(
        &self,
        dir: &Path,
        program: &Path,
        args: &[String],
    ) -> Result<ExecResult, ProcessError>;

    /// Run `program` in `dir` with inherited standard streams.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Spawn`] if the program cannot be started and
    /// [`ProcessError::ExitStatus`] if it exits non-zero.
    fn run_inherited(&self, dir: &Path, program: &Path, args: &[String])
    -> Result<(), ProcessError>;

    /// Resolve `program` for a project rooted at `root`.
    ///
    /// Project-local executables in `node_modules/.bin` win over `PATH`.
    /// Returns `None` if the program is found nowhere.
    fn resolve(&self, root: &Path, program: &str) -> Option<PathBuf>;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_captured(
        &self,
        dir: &Path,
        program: &Path,
        args: &[String],
    ) -> Result<ExecResult, ProcessError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcessError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        Ok(ExecResult::from(output))
    }

    fn run_inherited(
        &self,
        dir: &Path,
        program: &Path,
        args: &[String],
    ) -> Result<(), ProcessError> {
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|source| ProcessError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::ExitStatus {
                program: program.display().to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    }

    fn resolve(&self, root: &Path, program: &str) -> Option<PathBuf> {
        let local_bin = root.join("node_modules").join(".bin");
        which::which_in(program, Some(&local_bin), root)
            .or_else(|_| which::which(program))
            .ok()
    }
}

/// Resolve `program`, falling back to the bare name so the spawn error
/// names what the user configured.
#[must_use]
pub fn resolve_or_bare(executor: &dyn Executor, root: &Path, program: &str) -> PathBuf {
    executor
        .resolve(root, program)
        .unwrap_or_else(|| PathBuf::from(program))
}
