//! Domain-specific error types for the build runner.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`], [`BundleError`])
//! while tasks and command handlers convert them to [`anyhow::Error`] via the
//! standard `?` operator.
//!
//! # Error domains
//!
//! ```text
//! ConfigError:   .babelrc / .browserslistrc / sitebuild.toml
//! BundleError:   entry discovery, bundler invocation, compilation
//! TemplateError: template discovery, rendering, output writes
//! ProcessError:  external commands such as the linter
//! TaskError:     registry lookups and group failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Config file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path to the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error other than "not found" occurred while reading.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The transpiler config has no environment preset to inject targets into.
    #[error("Preset '{preset}' not found in {}", path.display())]
    MissingPreset {
        /// Name of the preset that was expected.
        preset: String,
        /// Transpiler config path.
        path: PathBuf,
    },
}

/// Errors that arise from discovering entries and running the bundler.
#[derive(Error, Debug)]
pub enum BundleError {
    /// Two entry files map to the same output name.
    #[error("Entry name '{name}' is produced by both {} and {}", first.display(), second.display())]
    EntryCollision {
        /// Shared output basename.
        name: String,
        /// First file claiming the name.
        first: PathBuf,
        /// Second file claiming the name.
        second: PathBuf,
    },

    /// The entry glob pattern was invalid or a directory entry was unreadable.
    #[error("Entry discovery failed: {0}")]
    Glob(String),

    /// The bundle options could not be serialised for the bundler.
    #[error("Failed to write bundle options: {0}")]
    Options(String),

    /// The bundler reported at least one compilation error.
    #[error("Compilation failed: {0}")]
    Compilation(String),

    /// The bundler process could not be started.
    #[error("Failed to run bundler '{program}': {source}")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The bundler exited unsuccessfully without reporting compilation errors.
    #[error("Bundler exited with code {code}: {stderr}")]
    Failed {
        /// Exit code (`-1` when killed by a signal).
        code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Errors that arise from rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template glob pattern was invalid or a directory entry was unreadable.
    #[error("Template discovery failed: {0}")]
    Glob(String),

    /// A template failed to load or render.
    #[error("Failed to render {}: {source}", path.display())]
    Render {
        /// Template source path.
        path: PathBuf,
        /// Template engine error.
        source: minijinja::Error,
    },

    /// A rendered file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from external commands.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("Failed to execute '{program}': {source}")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The program exited with a non-zero status.
    #[error("'{program}' exited with code {code}")]
    ExitStatus {
        /// Program that was executed.
        program: String,
        /// Exit code (`-1` when killed by a signal).
        code: i32,
    },
}

/// Errors that arise from the task graph.
#[derive(Error, Debug)]
pub enum TaskError {
    /// No task with the requested name exists.
    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    /// A group refers to a task that is not registered.
    #[error("Task '{group}' refers to unknown task '{member}'")]
    UnknownMember {
        /// Group declaring the reference.
        group: String,
        /// Missing member name.
        member: String,
    },

    /// The task declarations reference each other in a cycle.
    #[error("Task reference cycle detected: {0}")]
    Cycle(String),

    /// Two tasks were declared with the same name.
    #[error("Task '{0}' declared more than once")]
    Duplicate(String),

    /// One or more members of a group failed.
    #[error("Task '{task}' failed: {reason}")]
    Failed {
        /// Name of the task that failed.
        task: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}
