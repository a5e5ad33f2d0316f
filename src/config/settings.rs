//! Project settings loaded from `sitebuild.toml`.
//!
//! Every field has a default matching the conventional project layout, so a
//! missing file (or a missing key) is not an error.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// File name looked up in the project root.
pub const SETTINGS_FILE: &str = "sitebuild.toml";

/// An external command: program name plus fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    /// Program name, looked up on `PATH`.
    pub program: String,
    /// Arguments placed before any the caller appends.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Directories, globs, and external commands for one project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Output directory, relative to the project root.
    pub out_dir: PathBuf,
    /// Template source directory.
    pub template_dir: PathBuf,
    /// Template file extension (without the dot).
    pub template_ext: String,
    /// Script and style entry directory.
    pub script_dir: PathBuf,
    /// Transpiler config file.
    pub babelrc: PathBuf,
    /// Target-environment descriptor file.
    pub browserslistrc: PathBuf,
    /// Glob patterns (relative to the root) removed by `clean:logs`.
    pub log_patterns: Vec<String>,
    /// Linter invocation.
    pub lint: CommandSpec,
    /// Bundler invocation. `--config <dir>/webpack.config.js --json` is
    /// appended, where the config module loads the generated options.
    pub bundler: CommandSpec,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
            template_dir: PathBuf::from("tpl"),
            template_ext: "tmpl".to_string(),
            script_dir: PathBuf::from("res"),
            babelrc: PathBuf::from(".babelrc"),
            browserslistrc: PathBuf::from(".browserslistrc"),
            log_patterns: vec![
                "npm-debug.log*".to_string(),
                "yarn-debug.log*".to_string(),
                "yarn-error.log*".to_string(),
            ],
            lint: CommandSpec::new("eslint", &["."]),
            bundler: CommandSpec::new("webpack", &[]),
        }
    }
}

impl Settings {
    /// Load `sitebuild.toml` from `root`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read and
    /// [`ConfigError::Parse`] if it is not valid settings TOML.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path,
            message: e.message().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.out_dir, PathBuf::from("dist"));
        assert_eq!(settings.lint.program, "eslint");
        assert_eq!(settings.lint.args, vec!["."]);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "out_dir = \"public\"\ntemplate_ext = \"jinja\"\n\n[bundler]\nprogram = \"rspack\"\n",
        )
        .unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.out_dir, PathBuf::from("public"));
        assert_eq!(settings.template_ext, "jinja");
        assert_eq!(settings.bundler.program, "rspack");
        assert!(settings.bundler.args.is_empty());
        assert_eq!(settings.template_dir, PathBuf::from("tpl"));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "outdir = \"x\"\n").unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
