//! `build:tpl`: render every template into the output directory.
//!
//! Templates are loaded by path relative to the template directory, so
//! `{% include %}` and `{% extends %}` resolve against the same tree. Each
//! template is rendered with a `mode` variable (`production` or
//! `development`).
use std::path::{Path, PathBuf};

use anyhow::Result;
use minijinja::{Environment, context};
use rayon::prelude::*;

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::TemplateError;

/// Extension of rendered output files.
pub const OUTPUT_EXT: &str = "html";

/// Render templates to markup.
#[derive(Debug)]
pub struct BuildTemplates;

impl Task for BuildTemplates {
    fn name(&self) -> &str {
        "build:tpl"
    }

    fn description(&self) -> &str {
        "Render templates to HTML"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let tpl_dir = ctx.config.template_dir();
        let out_dir = ctx.config.out_dir();
        let sources = discover(&tpl_dir, &ctx.config.settings.template_ext)?;
        ctx.log.debug(&format!(
            "{} templates in {}",
            sources.len(),
            tpl_dir.display()
        ));

        if ctx.dry_run {
            for src in &sources {
                let dest = output_path(&tpl_dir, &out_dir, src);
                ctx.log.dry_run(&format!(
                    "would render {} -> {}",
                    src.display(),
                    dest.display()
                ));
            }
            let stats = TaskStats {
                changed: u32::try_from(sources.len()).unwrap_or(u32::MAX),
                already_ok: 0,
            };
            return Ok(stats.finish(ctx));
        }

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(&tpl_dir));
        let mode = ctx.mode.as_str();
        let render = |src: &PathBuf| render_one(&env, &tpl_dir, &out_dir, src, mode);

        let written: Vec<PathBuf> = if ctx.parallel {
            sources.par_iter().map(render).collect::<Result<Vec<_>, TemplateError>>()?
        } else {
            sources.iter().map(render).collect::<Result<Vec<_>, TemplateError>>()?
        };

        for dest in &written {
            ctx.log.debug(&format!("wrote {}", dest.display()));
        }
        let stats = TaskStats {
            changed: u32::try_from(written.len()).unwrap_or(u32::MAX),
            already_ok: 0,
        };
        Ok(stats.finish(ctx))
    }
}

/// Every `*.<ext>` file under `dir`, recursively, sorted.
///
/// # Errors
///
/// Returns [`TemplateError::Glob`] if the tree cannot be walked.
pub fn discover(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, TemplateError> {
    let pattern = format!("{}/**/*.{ext}", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob::glob(&pattern).map_err(|e| TemplateError::Glob(e.to_string()))? {
        let path = entry.map_err(|e| TemplateError::Glob(e.to_string()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Where the rendering of `src` lands: same relative path under `out_dir`,
/// extension replaced by [`OUTPUT_EXT`].
#[must_use]
pub fn output_path(tpl_dir: &Path, out_dir: &Path, src: &Path) -> PathBuf {
    let rel = src.strip_prefix(tpl_dir).unwrap_or(src);
    out_dir.join(rel).with_extension(OUTPUT_EXT)
}

fn template_name(tpl_dir: &Path, src: &Path) -> String {
    let rel = src.strip_prefix(tpl_dir).unwrap_or(src);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_one(
    env: &Environment<'_>,
    tpl_dir: &Path,
    out_dir: &Path,
    src: &Path,
    mode: &str,
) -> Result<PathBuf, TemplateError> {
    let render_err = |source| TemplateError::Render {
        path: src.to_path_buf(),
        source,
    };
    let html = env
        .get_template(&template_name(tpl_dir, src))
        .and_then(|tpl| tpl.render(context! { mode }))
        .map_err(render_err)?;

    let dest = output_path(tpl_dir, out_dir, src);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TemplateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&dest, html).map_err(|source| TemplateError::Io {
        path: dest.clone(),
        source,
    })?;
    Ok(dest)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::tasks::test_helpers::{empty_config, make_context};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn output_path_swaps_extension_and_keeps_tree() {
        assert_eq!(
            output_path(
                Path::new("/site/tpl"),
                Path::new("/site/dist"),
                Path::new("/site/tpl/a/b.tmpl")
            ),
            PathBuf::from("/site/dist/a/b.html")
        );
    }

    #[test]
    fn discover_finds_nested_templates_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.tmpl", "");
        write(dir.path(), "a/b.tmpl", "");
        write(dir.path(), "a/notes.txt", "");
        let found = discover(dir.path(), "tmpl").unwrap();
        assert_eq!(
            found,
            [dir.path().join("a/b.tmpl"), dir.path().join("index.tmpl")]
        );
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&dir.path().join("tpl"), "tmpl").unwrap().is_empty());
    }

    #[test]
    fn renders_nested_template_with_include() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tpl/partials/head.tmpl", "<title>{{ mode }}</title>");
        write(
            dir.path(),
            "tpl/a/b.tmpl",
            "<html>{% include \"partials/head.tmpl\" %}</html>",
        );
        let mut ctx = make_context(empty_config(dir.path()));
        ctx.mode = Mode::Development;

        assert_eq!(BuildTemplates.run(&ctx).unwrap(), TaskResult::Ok);
        let html = std::fs::read_to_string(dir.path().join("dist/a/b.html")).unwrap();
        assert_eq!(html, "<html><title>development</title></html>");
        assert!(dir.path().join("dist/partials/head.html").exists());
    }

    #[test]
    fn parallel_rendering_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write(dir.path(), &format!("tpl/page{i}.tmpl"), "page {{ mode }}");
        }
        let mut ctx = make_context(empty_config(dir.path()));
        ctx.parallel = true;

        BuildTemplates.run(&ctx).unwrap();
        for i in 0..8 {
            let html =
                std::fs::read_to_string(dir.path().join(format!("dist/page{i}.html"))).unwrap();
            assert_eq!(html, "page production");
        }
    }

    #[test]
    fn malformed_template_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tpl/broken.tmpl", "{% if %}");
        let ctx = make_context(empty_config(dir.path()));

        let err = BuildTemplates.run(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("broken.tmpl"));
        assert!(!dir.path().join("dist/broken.html").exists());
    }

    #[test]
    fn empty_template_dir_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = make_context(empty_config(dir.path()));
        assert_eq!(BuildTemplates.run(&ctx).unwrap(), TaskResult::Ok);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tpl/index.tmpl", "hi");
        let mut ctx = make_context(empty_config(dir.path()));
        ctx.dry_run = true;

        assert_eq!(BuildTemplates.run(&ctx).unwrap(), TaskResult::DryRun);
        assert!(!dir.path().join("dist").exists());
    }
}
