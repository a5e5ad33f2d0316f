//! Project configuration: `sitebuild.toml` settings and the lazily read
//! transpiler and target files.

pub mod babelrc;
pub mod browserslist;
pub mod cache;
pub mod mode;
pub mod settings;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use cache::ConfigCache;
pub use mode::Mode;
pub use settings::Settings;

/// Everything a build needs to know about one project.
///
/// Settings are read eagerly; `.babelrc` and `.browserslistrc` are read
/// lazily through [`ConfigCache`] by the tasks that need them, so `clean`
/// and `lint` work in projects without them.
#[derive(Debug)]
pub struct Config {
    /// Absolute project root.
    pub root: PathBuf,
    /// Parsed `sitebuild.toml`, or defaults.
    pub settings: Settings,
    /// Cached `.babelrc` and `.browserslistrc` contents.
    pub files: ConfigCache,
}

impl Config {
    /// Load `sitebuild.toml` for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let settings = Settings::load(root)?;
        Ok(Self::with_settings(root, settings))
    }

    /// Build a config from already-loaded settings.
    #[must_use]
    pub fn with_settings(root: &Path, settings: Settings) -> Self {
        let files = ConfigCache::new(
            root.join(&settings.babelrc),
            root.join(&settings.browserslistrc),
        );
        Self {
            root: root.to_path_buf(),
            settings,
            files,
        }
    }

    /// Absolute output directory.
    #[must_use]
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.settings.out_dir)
    }

    /// Absolute template source directory.
    #[must_use]
    pub fn template_dir(&self) -> PathBuf {
        self.root.join(&self.settings.template_dir)
    }

    /// Absolute script entry directory.
    #[must_use]
    pub fn script_dir(&self) -> PathBuf {
        self.root.join(&self.settings.script_dir)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_rooted() {
        let config = Config::with_settings(Path::new("/site"), Settings::default());
        assert_eq!(config.out_dir(), PathBuf::from("/site/dist"));
        assert_eq!(config.template_dir(), PathBuf::from("/site/tpl"));
        assert_eq!(config.script_dir(), PathBuf::from("/site/res"));
    }

    #[test]
    fn load_without_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.root, dir.path());
    }
}
