// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed front-end project and a fluent
// builder so each integration test can set up an isolated site without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use sitebuild::cli::{GlobalOpts, RunOpts};
use sitebuild::commands;
use sitebuild::config::Mode;
use sitebuild::logging::Logger;

/// Transpiler config with the environment preset the bundle options need.
pub const BABELRC: &str = r#"{"presets": [["@babel/preset-env", {"modules": false}]]}"#;

/// Bundler stand-in that prints an empty, successful stats report.
pub const OK_BUNDLER: &str = r#"printf '{"errors":[],"warnings":[],"assets":[{"name":"main.js","size":12}]}'"#;

/// Bundler stand-in that reports a compilation error and exits non-zero.
pub const FAILING_BUNDLER: &str = r#"printf '{"errors":["Module not found: ./missing"]}'; exit 2"#;

/// Write the minimal project layout into `root`.
///
/// Creates:
/// - `.babelrc`        : environment preset only
/// - `.browserslistrc` : a single target query
/// - `tpl/`            : empty template directory
/// - `res/main.ts`     : one script entry
/// - `sitebuild.toml`  : linter and bundler wired to `sh -c` stand-ins
pub fn setup_minimal_project(root: &Path) {
    std::fs::write(root.join(".babelrc"), BABELRC).expect("write .babelrc");
    std::fs::write(root.join(".browserslistrc"), "> 1%\nlast 2 versions\n")
        .expect("write .browserslistrc");
    std::fs::create_dir_all(root.join("tpl")).expect("create tpl dir");
    std::fs::create_dir_all(root.join("res")).expect("create res dir");
    std::fs::write(root.join("res").join("main.ts"), "export {};\n").expect("write main.ts");
    write_settings(root, "exit 0", OK_BUNDLER);
}

fn write_settings(root: &Path, lint: &str, bundler: &str) {
    let settings = format!(
        "[lint]\nprogram = \"sh\"\nargs = [\"-c\", {lint:?}]\n\n\
         [bundler]\nprogram = \"sh\"\nargs = [\"-c\", {bundler:?}, \"sh\"]\n"
    );
    std::fs::write(root.join("sitebuild.toml"), settings).expect("write sitebuild.toml");
}

/// An isolated test project backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing the test project.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new context with a minimal but complete project.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        setup_minimal_project(root.path());
        Self { root }
    }

    /// Like [`new`](Self::new), but the project lives under `parent`.
    pub fn new_in(parent: &Path) -> Self {
        let root = tempfile::tempdir_in(parent).expect("create temp dir");
        setup_minimal_project(root.path());
        Self { root }
    }

    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Global options pointing at this project, production mode.
    pub fn global_opts(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: Some(self.root.path().to_path_buf()),
            parallel: true,
            mode: Some(Mode::Production),
        }
    }

    /// Run `tasks` the way `sitebuild run` would, returning the logger so
    /// callers can inspect recorded task statuses.
    pub fn run(&self, tasks: &[&str]) -> (Result<()>, Arc<Logger>) {
        self.run_with(tasks, false)
    }

    /// [`run`](Self::run) with dry-run enabled.
    pub fn dry_run(&self, tasks: &[&str]) -> (Result<()>, Arc<Logger>) {
        self.run_with(tasks, true)
    }

    /// Run `tasks` with `--root` set to `root` instead of the absolute
    /// project path.
    pub fn run_at(&self, root: &Path, tasks: &[&str]) -> (Result<()>, Arc<Logger>) {
        let global = GlobalOpts {
            root: Some(root.to_path_buf()),
            ..self.global_opts(false)
        };
        run_tasks(&global, tasks)
    }

    fn run_with(&self, tasks: &[&str], dry_run: bool) -> (Result<()>, Arc<Logger>) {
        run_tasks(&self.global_opts(dry_run), tasks)
    }
}

fn run_tasks(global: &GlobalOpts, tasks: &[&str]) -> (Result<()>, Arc<Logger>) {
    let log = Arc::new(Logger::new("run"));
    let opts = RunOpts {
        tasks: tasks.iter().map(ToString::to_string).collect(),
    };
    let result = commands::run::run(global, &opts, &log);
    (result, log)
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
    lint: String,
    bundler: String,
}

impl TestContextBuilder {
    /// Begin building a new context backed by a minimal project.
    pub fn new() -> Self {
        Self::from_context(IntegrationTestContext::new())
    }

    /// Begin building a project placed under `parent`.
    pub fn new_in(parent: &Path) -> Self {
        Self::from_context(IntegrationTestContext::new_in(parent))
    }

    fn from_context(ctx: IntegrationTestContext) -> Self {
        Self {
            ctx,
            lint: "exit 0".to_string(),
            bundler: OK_BUNDLER.to_string(),
        }
    }

    /// Write `content` to `rel` inside the project, creating parents.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        let path = self.ctx.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write project file");
        self
    }

    /// Make the linter exit with a non-zero status.
    pub fn with_failing_lint(mut self) -> Self {
        self.lint = "echo 'src/app.ts: 1 problem' >&2; exit 1".to_string();
        self
    }

    /// Make the bundler report a compilation error.
    pub fn with_failing_bundler(mut self) -> Self {
        self.bundler = FAILING_BUNDLER.to_string();
        self
    }

    /// Replace the bundler stand-in with `script`, run by `sh -c` from the
    /// project root with the config module path as `$2`.
    pub fn with_bundler(mut self, script: &str) -> Self {
        self.bundler = script.to_string();
        self
    }

    /// Finalise the builder and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        write_settings(self.ctx.root_path(), &self.lint, &self.bundler);
        self.ctx
    }
}
