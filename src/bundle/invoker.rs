//! Running the external bundler and judging its report.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::options::BundleOptions;
use super::stats::BundleStats;
use crate::error::{BundleError, ProcessError};
use crate::exec::{ExecResult, Executor};
use crate::logging::Log;

/// Raw outcome of one bundler process.
#[derive(Debug, Clone, Default)]
pub struct BundleRun {
    /// Stats parsed from stdout, if stdout held a stats document.
    pub stats: Option<BundleStats>,
    /// Captured stdout when it could not be parsed as stats.
    pub raw_output: String,
    /// Captured stderr.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, absent when killed by a signal.
    pub code: Option<i32>,
}

impl From<ExecResult> for BundleRun {
    fn from(result: ExecResult) -> Self {
        let stats = BundleStats::parse(result.stdout.trim()).ok();
        let raw_output = if stats.is_some() {
            String::new()
        } else {
            result.stdout
        };
        Self {
            stats,
            raw_output,
            stderr: result.stderr,
            success: result.success,
            code: result.code,
        }
    }
}

/// Something that can turn [`BundleOptions`] into bundles.
#[cfg_attr(test, mockall::automock)]
pub trait Bundler: Send + Sync {
    /// Run one compilation.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Options`] if the options cannot be handed over
    /// and [`BundleError::Spawn`] if the bundler cannot be started. A
    /// compilation that reports errors is not an `Err` here.
    fn run(&self, options: &BundleOptions) -> Result<BundleRun, BundleError>;
}

/// File name of the serialised [`BundleOptions`] inside the hand-over
/// directory.
pub const OPTIONS_FILE: &str = "options.json";

/// File name of the configuration module passed to the bundler.
pub const ADAPTER_FILE: &str = "webpack.config.js";

/// webpack configuration module that loads [`OPTIONS_FILE`] from its own
/// directory, compiles rule conditions into regular expressions and
/// instantiates the named plugins from the project's `node_modules`.
pub const ADAPTER: &str = include_str!("../../assets/webpack.config.js");

/// Bundler driven through a command line.
///
/// Each run gets a fresh temporary directory holding [`OPTIONS_FILE`] and
/// [`ADAPTER`]. The bundler is called as `<program> <args> --config
/// <dir>/webpack.config.js --json` from the project root, and the stats
/// document is read back from stdout.
#[derive(Debug)]
pub struct ExternalBundler {
    root: PathBuf,
    program: PathBuf,
    args: Vec<String>,
    executor: Arc<dyn Executor>,
}

impl ExternalBundler {
    /// A bundler running `program args...` inside `root`.
    #[must_use]
    pub fn new(
        root: &Path,
        program: PathBuf,
        args: Vec<String>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            program,
            args,
            executor,
        }
    }
}

impl Bundler for ExternalBundler {
    fn run(&self, options: &BundleOptions) -> Result<BundleRun, BundleError> {
        let json = options
            .to_json()
            .map_err(|e| BundleError::Options(e.to_string()))?;
        let handover = tempfile::Builder::new()
            .prefix("sitebuild-bundle-")
            .tempdir()
            .map_err(|e| BundleError::Options(e.to_string()))?;
        let adapter = handover.path().join(ADAPTER_FILE);
        std::fs::write(handover.path().join(OPTIONS_FILE), json)
            .and_then(|()| std::fs::write(&adapter, ADAPTER))
            .map_err(|e| BundleError::Options(e.to_string()))?;

        let mut args = self.args.clone();
        args.push("--config".to_string());
        args.push(adapter.display().to_string());
        args.push("--json".to_string());

        tracing::debug!(
            "running bundler: {} {}",
            self.program.display(),
            args.join(" ")
        );
        let result = self
            .executor
            .run_captured(&self.root, &self.program, &args)
            .map_err(|e| match e {
                ProcessError::Spawn { program, source } => BundleError::Spawn { program, source },
                ProcessError::ExitStatus { code, .. } => BundleError::Failed {
                    code,
                    stderr: String::new(),
                },
            })?;
        Ok(BundleRun::from(result))
    }
}

/// Run `bundler`, log its summary and decide whether the build succeeded.
///
/// The summary is always logged, even when the compilation failed. Warnings
/// never fail the build.
///
/// # Errors
///
/// Returns [`BundleError::Compilation`] with the first reported error if the
/// stats contain any, [`BundleError::Failed`] if the process failed without
/// stats, or whatever [`Bundler::run`] returned.
pub fn invoke(
    bundler: &dyn Bundler,
    options: &BundleOptions,
    log: &dyn Log,
    color: bool,
) -> Result<BundleStats, BundleError> {
    let run = bundler.run(options)?;

    for line in run.raw_output.lines().filter(|l| !l.trim().is_empty()) {
        log.info(line);
    }
    for line in run.stderr.lines().filter(|l| !l.trim().is_empty()) {
        log.debug(line);
    }

    let Some(stats) = run.stats else {
        if run.success {
            log.warn("bundler produced no stats report");
            return Ok(BundleStats::default());
        }
        return Err(BundleError::Failed {
            code: run.code.unwrap_or(-1),
            stderr: run.stderr.trim().to_string(),
        });
    };

    for line in stats.render(color) {
        log.info(&line);
    }

    if let Some(first) = stats.first_error() {
        return Err(BundleError::Compilation(first.to_string()));
    }
    if !run.success {
        return Err(BundleError::Failed {
            code: run.code.unwrap_or(-1),
            stderr: run.stderr.trim().to_string(),
        });
    }
    Ok(stats)
}
