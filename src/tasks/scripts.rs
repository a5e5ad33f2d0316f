//! `build:res`: bundle the script entries.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::bundle::{self, BundleOptions, SCRIPT_EXTENSIONS};
use crate::config::babelrc::TranspilerConfig;
use crate::config::browserslist::TargetList;
use crate::error::ConfigError;

/// Bundle scripts and styles with the external bundler.
#[derive(Debug)]
pub struct BuildScripts;

impl Task for BuildScripts {
    fn name(&self) -> &str {
        "build:res"
    }

    fn description(&self) -> &str {
        "Bundle scripts and styles"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let script_dir = ctx.config.script_dir();
        let (configs, entries) = rayon::join(
            || load_configs(ctx),
            || bundle::discover(&script_dir, SCRIPT_EXTENSIONS),
        );
        let (targets, transpiler) = configs?;
        let entries = entries?;
        ctx.log.debug(&format!(
            "{} entries, {} target queries, mode {}",
            entries.len(),
            targets.queries().len(),
            ctx.mode
        ));

        let options = BundleOptions::build(
            &targets,
            transpiler,
            entries,
            ctx.mode,
            &ctx.config.out_dir(),
        );

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would bundle {} entries into {}",
                options.entry.len(),
                options.output.path.display()
            ));
            let json = options.to_json().context("serialising bundle options")?;
            for line in json.lines() {
                ctx.log.debug(line);
            }
            return Ok(TaskResult::DryRun);
        }

        let stats = bundle::invoke(ctx.bundler.as_ref(), &options, ctx.log.as_ref(), ctx.color)?;
        ctx.log
            .debug(&format!("{} assets emitted", stats.assets.len()));
        Ok(TaskResult::Ok)
    }
}

fn load_configs(ctx: &Context) -> Result<(TargetList, TranspilerConfig), ConfigError> {
    let targets = ctx.config.files.targets()?;
    let transpiler = ctx.config.files.transpiler(&targets)?;
    Ok((targets, transpiler))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::bundle::stats::{BundleStats, Diagnostic};
    use crate::bundle::{BundleRun, MockBundler};
    use crate::config::Mode;
    use crate::error::BundleError;
    use crate::tasks::test_helpers::{empty_config, make_context};
    use std::path::Path;
    use std::sync::Arc;

    const BABELRC: &str = r#"{"presets": [["@babel/preset-env", {}]]}"#;

    fn project(dir: &Path) {
        std::fs::write(dir.join(".babelrc"), BABELRC).unwrap();
        std::fs::write(dir.join(".browserslistrc"), "> 1%\n").unwrap();
        std::fs::create_dir(dir.join("res")).unwrap();
        std::fs::write(dir.join("res").join("main.ts"), "").unwrap();
    }

    fn ok_run() -> BundleRun {
        BundleRun {
            stats: Some(BundleStats::default()),
            success: true,
            code: Some(0),
            ..BundleRun::default()
        }
    }

    #[test]
    fn passes_entries_and_mode_to_bundler() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path());
        let root = dir.path().to_path_buf();
        let mut bundler = MockBundler::new();
        bundler
            .expect_run()
            .withf(move |options| {
                options.entry.get("main") == Some(root.join("res").join("main.ts").as_path())
                    && options.mode == Mode::Development
                    && options.minimizers().is_empty()
            })
            .times(1)
            .returning(|_| Ok(ok_run()));
        let mut ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));
        ctx.mode = Mode::Development;

        assert_eq!(BuildScripts.run(&ctx).unwrap(), TaskResult::Ok);
    }

    #[test]
    fn production_build_has_minimizers() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path());
        let mut bundler = MockBundler::new();
        bundler
            .expect_run()
            .withf(|options| options.minimizers().len() == 2)
            .times(1)
            .returning(|_| Ok(ok_run()));
        let ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));

        assert_eq!(BuildScripts.run(&ctx).unwrap(), TaskResult::Ok);
    }

    #[test]
    fn compilation_error_fails_task() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path());
        let mut bundler = MockBundler::new();
        bundler.expect_run().returning(|_| {
            Ok(BundleRun {
                stats: Some(BundleStats {
                    errors: vec![Diagnostic::Text("Module not found".to_string())],
                    ..BundleStats::default()
                }),
                success: false,
                code: Some(2),
                ..BundleRun::default()
            })
        });
        let ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));

        let err = BuildScripts.run(&ctx).unwrap_err();
        let bundle_err = err.downcast_ref::<BundleError>().unwrap();
        assert!(matches!(bundle_err, BundleError::Compilation(m) if m == "Module not found"));
    }

    #[test]
    fn missing_babelrc_fails_before_bundling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".browserslistrc"), "> 1%\n").unwrap();
        let mut bundler = MockBundler::new();
        bundler.expect_run().never();
        let ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));

        let err = BuildScripts.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn empty_entry_directory_still_bundles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".babelrc"), BABELRC).unwrap();
        std::fs::write(dir.path().join(".browserslistrc"), "> 1%\n").unwrap();
        let mut bundler = MockBundler::new();
        bundler
            .expect_run()
            .withf(|options| options.entry.is_empty())
            .times(1)
            .returning(|_| Ok(ok_run()));
        let ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));

        assert_eq!(BuildScripts.run(&ctx).unwrap(), TaskResult::Ok);
    }

    #[test]
    fn dry_run_does_not_invoke_bundler() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path());
        let mut bundler = MockBundler::new();
        bundler.expect_run().never();
        let mut ctx = make_context(empty_config(dir.path())).with_bundler(Arc::new(bundler));
        ctx.dry_run = true;

        assert_eq!(BuildScripts.run(&ctx).unwrap(), TaskResult::DryRun);
    }
}
