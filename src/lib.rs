//! Build runner for static front-end projects.
//!
//! Cleans outputs, lints sources, renders templates and bundles scripts
//! and styles through an external bundler, with the steps composed into
//! named parallel and series task groups.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: project settings plus the cached `.babelrc` and `.browserslistrc`
//! - **[`bundle`]**: entry discovery, bundle options, and the bundler seam
//! - **[`tasks`]**: named leaf tasks and the registry that groups them
//! - **[`commands`]**: top-level subcommand orchestration (`run`, `list`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod bundle;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod tasks;
